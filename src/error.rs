//! Error types for configuration and session setup.
//!
//! Game rules never fail with an error: a refused move or a failed mining
//! attempt is reported as `false`. Errors only come from loading a
//! configuration or from building a session out of it.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::ActorKind;

/// Failure to load or validate a [`GameConfig`](crate::config::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file is not valid JSON for a configuration.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failure to set up a session.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The belt is too small to play on.
    #[error("belt needs at least {needed} asteroids, got {got}")]
    BeltTooSmall {
        /// Minimum number of asteroids.
        needed: u32,
        /// Number requested.
        got: u32,
    },
    /// No asteroid would accept a newly spawned actor.
    #[error("no asteroid accepted a new {kind:?} actor")]
    SpawnRejected {
        /// Kind of actor that could not be placed.
        kind: ActorKind,
    },
}
