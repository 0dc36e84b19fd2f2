//! Deterministic belt generation.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::{BeltConfig, MIN_ASTEROIDS};
use crate::error::SetupError;
use crate::game::{Asteroid, Belt, Material, SiteId};

/// Generate a belt: a ring of asteroids plus random shortcuts.
///
/// The same seed and configuration always produce the same belt.
///
/// # Errors
///
/// Returns an error if the configuration is out of range.
pub fn generate_belt(seed: u64, config: &BeltConfig) -> Result<Belt, SetupError> {
    if config.asteroids < MIN_ASTEROIDS {
        return Err(SetupError::BeltTooSmall {
            needed: MIN_ASTEROIDS,
            got: config.asteroids,
        });
    }
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut belt = Belt::new();

    for _ in 0..config.asteroids {
        belt.add(random_asteroid(config, &mut rng));
    }

    // Ring
    let n = config.asteroids;
    for i in 0..n {
        belt.link(SiteId(i), SiteId((i + 1) % n));
    }

    // Shortcuts; self-links and duplicates are dropped by the belt
    for _ in 0..config.extra_links {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        belt.link(SiteId(a), SiteId(b));
    }

    Ok(belt)
}

fn random_asteroid(config: &BeltConfig, rng: &mut StdRng) -> Asteroid {
    let mantle = rng.gen_range(0..=config.max_mantle);
    let core = if rng.gen_bool(config.empty_core_ratio) {
        None
    } else {
        Material::ALL.choose(rng).copied()
    };

    let mut asteroid = Asteroid::new(mantle, core);
    if rng.gen_bool(config.near_sun_ratio) {
        asteroid = asteroid.near_sun();
    }
    if let Some(capacity) = config.capacity {
        asteroid = asteroid.with_capacity(capacity);
    }
    asteroid
}
