//! Data cleansing pipeline CLI.

use clap::{ColorChoice, Parser};
use cleanse_cli::commands::{
    EXIT_ERROR, check_config, exit_code, reference_config, run_pipeline,
};
use cleanse_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_ERROR);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_pipeline(&args.input, &args.config) {
            Ok(result) => {
                if !args.no_summary {
                    print_summary(&result);
                }
                exit_code(&result)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                EXIT_ERROR
            }
        },
        Command::CheckConfig(args) => print_or_fail(check_config(&args.config)),
        Command::PrintConfig => print_or_fail(reference_config()),
    };
    std::process::exit(exit_code);
}

fn print_or_fail(rendered: anyhow::Result<String>) -> i32 {
    match rendered {
        Ok(toml) => {
            print!("{toml}");
            0
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            EXIT_ERROR
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
