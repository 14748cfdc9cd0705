//! CLI argument definitions for sng-inspect

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::{LogFormat, LogLevel};

#[derive(Parser)]
#[command(name = "sng-inspect")]
#[command(about = "Inspect the memory of a stopped or dumped syslog-ng", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to read memory and symbols from
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Memory image to read instead of a live process
    #[arg(long, global = true)]
    pub dump: Option<PathBuf>,

    /// Maps sidecar for --dump (defaults to the image path with .maps)
    #[arg(long, global = true)]
    pub maps: Option<PathBuf>,

    /// PID of the daemon (defaults to the largest running syslog-ng)
    #[arg(long, global = true)]
    pub pid: Option<u32>,

    /// `nm` listing of the syslog-ng binary
    #[arg(long, global = true, env = "SNG_INSPECT_SYMBOLS")]
    pub symbols: Option<PathBuf>,

    /// Added to every symbol address: hex value, or "auto" for the image
    /// base of a live process
    #[arg(long, global = true)]
    pub load_bias: Option<String>,

    /// TOML file with structure offset overrides
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,

    /// Refuse to walk queues longer than this
    #[arg(long, global = true)]
    pub max_queue_length: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print short info about the syslog-ng instance
    Info,

    /// List all initialized driver pipes
    #[command(visible_alias = "ls")]
    ListPipes,

    /// Print the address of the pipe object at an index
    GetPipe {
        /// Index into the initialized pipes array
        index: usize,
    },

    /// Dump the messages buffered in a destination queue
    DumpQueue {
        /// Address of the LogQueue (hex, e.g. 0x55d4c3a0e2b0)
        queue: String,

        /// Message field to print (MESSAGE, HOST, PROGRAM, ...)
        #[arg(short, long, default_value = "MESSAGE")]
        field: String,
    },

    /// Print the configuration text of the running configuration
    Config {
        /// Print the preprocessed configuration instead of the original
        #[arg(long)]
        preprocessed: bool,
    },

    /// Save --symbols, --load-bias and --max-queue-length as defaults
    Configure {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_target_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sng-inspect",
            "dump-queue",
            "0x1000",
            "--field",
            "program",
            "--dump",
            "core.img",
            "--symbols",
            "sng.nm",
        ])
        .unwrap();

        assert_eq!(cli.target.dump, Some(PathBuf::from("core.img")));
        match cli.command {
            Commands::DumpQueue { queue, field } => {
                assert_eq!(queue, "0x1000");
                assert_eq!(field, "program");
            }
            _ => panic!("expected dump-queue"),
        }
    }

    #[test]
    fn test_configure_takes_target_args() {
        let cli = Cli::try_parse_from([
            "sng-inspect",
            "configure",
            "--symbols",
            "sng.nm",
            "--max-queue-length",
            "5000",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Configure { show: false }));
        assert_eq!(cli.target.symbols, Some(PathBuf::from("sng.nm")));
        assert_eq!(cli.target.max_queue_length, Some(5000));
    }
}
