//! `auditrc` — Configuration front-end for a website audit runner

use clap::Parser;

use auditrc::cli::args::Cli;
use auditrc::cli::commands;
use auditrc::error::ExitCode;
use auditrc::observability::{LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(LogFormat::Human, cli.verbose, cli.color);
    }

    match commands::dispatch(cli) {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
