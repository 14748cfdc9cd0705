mod cli;
mod commands;
mod config;
mod logging;
mod session;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands, TargetArgs};
use commands::pipes::GetPipeOutcome;
use config::Config;
use session::Session;

/// Exit status for usage errors such as an out-of-range index
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format, cli.log_level);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Configure { show } => {
            let settings = commands::configure::Settings {
                symbols: cli.target.symbols,
                load_bias: cli.target.load_bias,
                max_queue_length: cli.target.max_queue_length,
            };
            commands::configure::handle(settings, show)?;
        }

        Commands::Info => {
            let session = open_session(&cli.target)?;
            commands::info::handle_info(&session.target())?;
        }

        Commands::ListPipes => {
            let session = open_session(&cli.target)?;
            commands::pipes::handle_list_pipes(&session.target(), &session.cancel)?;
        }

        Commands::GetPipe { index } => {
            let session = open_session(&cli.target)?;
            let outcome = commands::pipes::handle_get_pipe(&session.target(), index)?;
            if outcome == GetPipeOutcome::InvalidIndex {
                return Ok(ExitCode::from(EXIT_USAGE));
            }
        }

        Commands::DumpQueue { queue, field } => {
            let session = open_session(&cli.target)?;
            commands::queue::handle_dump_queue(&session.target(), &queue, &field, &session.cancel)?;
        }

        Commands::Config { preprocessed } => {
            let session = open_session(&cli.target)?;
            commands::info::handle_config(&session.target(), preprocessed)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Open the target and check it looks like syslog-ng before any query
fn open_session(args: &TargetArgs) -> Result<Session> {
    let config = Config::load()?;
    let session = Session::open(args, &config)?;
    session.install_interrupt_handler()?;

    sng_inspect::probe(&session.target()).context("Can not find syslog-ng symbols")?;
    Ok(session)
}
