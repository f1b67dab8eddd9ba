mod cmd;

use std::process;

use anyhow::Result;
use clap::error::ErrorKind as ArgsErrorKind;
use clap::Parser;
use cmd::{App, RunCommand};
use log::error;

async fn run_cmd() -> Result<()> {
    let app = match App::try_parse() {
        Ok(app) => app,
        Err(err) => {
            let _ = err.print();
            if matches!(
                err.kind(),
                ArgsErrorKind::DisplayHelp
                    | ArgsErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ArgsErrorKind::DisplayVersion
            ) {
                return Ok(());
            }
            process::exit(2);
        }
    };

    app.run().await
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_cmd().await {
        error!("{e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
