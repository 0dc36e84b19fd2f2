// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Drift: a deterministic turn engine for an asteroid-mining contest.
//!
//! Settlers mine asteroids, dodge solar storms and explosions, and win by
//! gathering enough of every material on a single asteroid. UFOs mine
//! greedily and wander. This crate provides:
//! - Round-robin turn scheduling with mid-turn deaths
//! - Per-asteroid win evaluation and a single terminal signal
//! - An in-memory asteroid belt behind the [`game::SiteGraph`] trait
//! - Seeded sessions, a settler autopilot and parallel batches
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     Session / Batch Runner          │
//! ├─────────────────────────────────────┤
//! │   Game (scheduler + commands)       │
//! ├─────────────────────────────────────┤
//! │   Actors, Ledgers, SiteGraph (Belt) │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod session;

pub use config::GameConfig;
pub use error::{ConfigError, SetupError};

// Re-export key game types at crate root for convenience
pub use game::{
    ActorId, ActorKind, Belt, Command, Game, Material, Outcome, SiteGraph, SiteId, Verdict,
};
