//! Run command implementation.

use super::output::format_text;
use super::{CliError, OutputFormat, load_config, resolve_seed};
use drift::session::run_game;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the game cannot be
/// set up.
pub(crate) fn execute(
    seed: Option<u64>,
    config: Option<PathBuf>,
    turns: Option<u64>,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if let Some(turns) = turns {
        config.max_turns = turns;
    }
    let seed = resolve_seed(seed);

    if !quiet && format == OutputFormat::Text {
        println!("Running game with seed {seed}...");
        println!(
            "Belt: {} asteroids, {} settlers, {} UFOs",
            config.belt.asteroids, config.settlers, config.ufos
        );
        println!();
    }

    let result = run_game(seed, &config)?;

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
