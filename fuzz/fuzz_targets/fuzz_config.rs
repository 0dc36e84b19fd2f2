#![no_main]

//! Configuration parsing fuzzer.
//!
//! Arbitrary bytes must either be rejected with an error or produce a
//! configuration that sets up a session without panicking.

use drift::GameConfig;
use drift::session::setup_game;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<GameConfig>(data) else {
        return;
    };
    if config.validate().is_err() {
        return;
    }
    // Keep the belt small enough to run quickly
    if config.belt.asteroids > 512 || config.settlers + config.ufos > 512 {
        return;
    }
    let _ = setup_game(0, &config);
});
