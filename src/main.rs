//! This crate contains the source code for the binary for the tilewalk simulator.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use tilewalk::{
    config::{Cli, Command},
    logging, App,
};

fn main() -> Result<()> {
    install()?;

    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref())?;
    let settings = cli.settings()?;
    let mut app = App::new(settings)?;

    if let Some(Command::Solve { from, to }) = cli.command {
        print!("{}", app.solve(from.map(|coord| coord.0), to.0)?);
        return Ok(());
    }

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();

    result
}
