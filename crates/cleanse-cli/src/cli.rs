//! CLI argument definitions for the cleansing pipeline.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cleanse",
    version,
    about = "Cleanse tabular transaction data and report on its quality",
    long_about = "Extract a delimited file, validate it against a column contract, \
                  clean it, score its quality, flag anomalies and write Parquet, \
                  CSV and JSON artifacts.\n\n\
                  The run fails when the quality score falls below the configured gate."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the pipeline over one input file.
    Run(RunArgs),

    /// Load and validate a configuration file, then print the resolved rules.
    CheckConfig(ConfigArgs),

    /// Print the reference configuration as TOML.
    PrintConfig,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Delimited input file to cleanse.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pipeline configuration (TOML).
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: PathBuf,

    /// Skip the summary tables.
    #[arg(long = "no-summary")]
    pub no_summary: bool,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Pipeline configuration (TOML).
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_requires_a_config() {
        assert!(Cli::try_parse_from(["cleanse", "run", "data.csv"]).is_err());
        let cli = Cli::try_parse_from(["cleanse", "run", "data.csv", "--config", "p.toml"])
            .expect("parse run");
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.config, PathBuf::from("p.toml"));
        assert!(!args.no_summary);
    }

    #[test]
    fn global_log_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "cleanse",
            "print-config",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .expect("parse");
        assert!(matches!(cli.command, Command::PrintConfig));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(matches!(cli.log_level, Some(LogLevelArg::Debug)));
    }
}
