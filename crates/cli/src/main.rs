use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::PrepareArgs;
use prepare_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "prepare",
    version,
    about = "Show where files would be written and with which metadata"
)]
pub struct Cli {
    #[command(flatten)]
    pub args: PrepareArgs,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    commands::prepare::run(cli.args)
}
