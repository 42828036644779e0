use std::process::ExitCode;

use clap::Parser;
use metaplex::command::Commands;
use metaplex::runtime::{setup_global_logger, LogLevel};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long = "log-level", global = true)]
    /// trace, debug, info, warn, error or off. RUST_LOG takes precedence
    log_level: Option<LogLevel>,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    setup_global_logger(cli.log_level);

    log::debug!("Running {:?}", cli.command);
    let result = cli.command.try_execute();

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }
    return ExitCode::SUCCESS;
}
