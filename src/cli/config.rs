//! Config command implementation.

use super::CliError;
use drift::GameConfig;
use std::path::PathBuf;

/// Print the default configuration, or write it to `output`.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized or written.
pub(crate) fn execute(output: Option<PathBuf>) -> Result<(), CliError> {
    let config = GameConfig::default();
    match output {
        Some(path) => {
            config.save(&path)?;
            println!("Default configuration written to {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(&config)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}
