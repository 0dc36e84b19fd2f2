//! Configuration validation command implementation.

use super::CliError;
use drift::GameConfig;
use drift::session::setup_game;
use std::path::PathBuf;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is invalid, or describes a
/// game that cannot be set up.
pub(crate) fn execute(path: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let config = match GameConfig::load(&path) {
        Ok(config) => {
            print_check("Readable and in range", true);
            config
        }
        Err(e) => {
            print_check("Readable and in range", false);
            return Err(e.into());
        }
    };

    // Crews must fit on a belt built from this configuration
    match setup_game(0, &config) {
        Ok(game) => {
            print_check("Crews fit on the belt", true);
            println!();
            println!("Summary:");
            println!("  Asteroids:    {}", game.sites().len());
            println!("  Settlers:     {}", game.players().len());
            println!("  Actors:       {}", game.queue().len());
            println!("  Max turns:    {}", config.max_turns);
        }
        Err(e) => {
            print_check("Crews fit on the belt", false);
            return Err(e.into());
        }
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
