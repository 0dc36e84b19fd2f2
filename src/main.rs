//! Drift CLI - Command-line interface for running Drift sessions.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Drift - A deterministic asteroid-mining turn engine
#[derive(Parser, Debug)]
#[command(name = "drift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log every turn, death and storm (-v); repeat for finer detail (-vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single session with the autopilot
    Run {
        /// Random seed (default: from the clock)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON configuration file (default: built-in configuration)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured turn limit
        #[arg(short, long)]
        turns: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Suppress the preamble
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run many sessions in parallel and aggregate statistics
    Batch {
        /// Number of sessions to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        games: u64,

        /// Starting seed (increments for each session)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// JSON configuration file (default: built-in configuration)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Check a configuration file
    Validate {
        /// Configuration file to validate
        #[arg(required = true)]
        config: PathBuf,
    },

    /// Print the default configuration as JSON
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Log level for the number of `-v` flags given.
fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_max_level(log_level(args.verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = match args.command {
        Commands::Run {
            seed,
            config,
            turns,
            format,
            quiet,
        } => cli::run::execute(seed, config, turns, format, quiet),

        Commands::Batch {
            games,
            seed,
            threads,
            config,
            format,
            progress,
        } => cli::batch::execute(games, seed, threads, config, format, progress),

        Commands::Validate { config } => cli::validate::execute(config),

        Commands::Config { output } => cli::config::execute(output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(log_level(0), Level::WARN);
        assert_eq!(log_level(1), Level::DEBUG);
        assert_eq!(log_level(3), Level::TRACE);
    }

    #[test]
    fn test_repeated_verbose_flag() {
        let args = Args::try_parse_from(["drift", "-vv", "config"]).unwrap();
        assert_eq!(log_level(args.verbose), Level::TRACE);

        let args = Args::try_parse_from(["drift", "validate", "c.json", "--verbose"]).unwrap();
        assert_eq!(log_level(args.verbose), Level::DEBUG);
    }
}
