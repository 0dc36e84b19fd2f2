//! Session runner for Drift games.
//!
//! Provides a pure function interface: `(seed, config) -> GameResult`
//!
//! A session handles:
//! - Deterministic belt generation
//! - Spawning settlers and UFOs
//! - Driving settlers with the autopilot between turns
//! - Periodic solar storms and orbit shifts
//! - Stopping at a verdict or the turn limit

mod autopilot;
mod mapgen;

pub use autopilot::{Autopilot, next_hop};
pub use mapgen::generate_belt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::error::SetupError;
use crate::game::{ActorKind, ActorState, Belt, Game, Hazard, SiteId, Verdict};

/// Mixed into the seed for the session's own random stream, so storms do
/// not mirror belt generation.
const SESSION_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// Final result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// The seed used for this session.
    pub seed: u64,
    /// How the game ended; `None` if the turn limit came first.
    pub verdict: Option<Verdict>,
    /// Total turns played.
    pub turns: u64,
    /// Settlers still alive at the end.
    pub settlers_alive: usize,
    /// Settlers killed by explosions.
    pub settlers_exploded: usize,
    /// Settlers killed by storms.
    pub settlers_stormed: usize,
    /// UFOs still in play at the end.
    pub ufos_active: usize,
    /// UFOs destroyed or swept away.
    pub ufos_lost: usize,
    /// Robots the settlers built.
    pub robots_built: usize,
    /// Solar storms that struck.
    pub storms: u32,
    /// Asteroids that moved towards or away from the sun.
    pub orbit_shifts: u32,
    /// Asteroids blown apart.
    pub asteroids_destroyed: usize,
}

impl GameResult {
    fn from_game(seed: u64, game: &Game<Belt>, storms: u32, orbit_shifts: u32) -> Self {
        let mut result = Self {
            seed,
            verdict: game.verdict(),
            turns: game.turn(),
            settlers_alive: 0,
            settlers_exploded: 0,
            settlers_stormed: 0,
            ufos_active: 0,
            ufos_lost: 0,
            robots_built: 0,
            storms,
            orbit_shifts,
            asteroids_destroyed: game
                .sites()
                .iter()
                .filter(|(_, asteroid)| asteroid.is_destroyed())
                .count(),
        };
        for actor in game.actors() {
            match (actor.kind(), actor.state()) {
                (ActorKind::Player, ActorState::Active) => result.settlers_alive += 1,
                (ActorKind::Player, ActorState::Destroyed(Hazard::Explosion)) => {
                    result.settlers_exploded += 1;
                }
                (ActorKind::Player, _) => result.settlers_stormed += 1,
                (ActorKind::Autonomous, ActorState::Active) => result.ufos_active += 1,
                (ActorKind::Autonomous, _) => result.ufos_lost += 1,
                (ActorKind::Robot, _) => result.robots_built += 1,
            }
        }
        result
    }
}

/// Build the game a session starts from: belt plus spawned crews.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or an actor cannot be
/// placed anywhere.
pub fn setup_game(seed: u64, config: &GameConfig) -> Result<Game<Belt>, SetupError> {
    config.validate()?;
    let belt = generate_belt(seed, &config.belt)?;
    let mut game = Game::new(belt, config.rules.clone(), seed);
    let mut rng = StdRng::seed_from_u64(seed ^ SESSION_STREAM);

    let crews = [
        (ActorKind::Player, config.settlers),
        (ActorKind::Autonomous, config.ufos),
    ];
    for (kind, count) in crews {
        for _ in 0..count {
            spawn_anywhere(&mut game, kind, &mut rng)?;
        }
    }
    Ok(game)
}

/// Spawn on a random asteroid, falling back to the next ones in order.
fn spawn_anywhere(
    game: &mut Game<Belt>,
    kind: ActorKind,
    rng: &mut StdRng,
) -> Result<(), SetupError> {
    #[allow(clippy::cast_possible_truncation)]
    let n = game.sites().len() as u32;
    let start = rng.gen_range(0..n);
    (0..n)
        .map(|offset| SiteId((start + offset) % n))
        .find_map(|site| game.spawn(kind, site))
        .map(|_| ())
        .ok_or(SetupError::SpawnRejected { kind })
}

/// Run a complete session with the given seed.
///
/// This is the main entry point - a pure function from inputs to result.
///
/// # Determinism
///
/// Given the same seed and configuration, this function always produces
/// the same `GameResult`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the crews cannot be
/// placed on the belt.
pub fn run_game(seed: u64, config: &GameConfig) -> Result<GameResult, SetupError> {
    let mut game = setup_game(seed, config)?;
    let mut rng = StdRng::seed_from_u64(seed.rotate_left(17) ^ SESSION_STREAM);
    let mut autopilot = Autopilot::new(config.autopilot);
    let mut storms = 0;
    let mut orbit_shifts = 0;

    #[allow(clippy::cast_possible_truncation)]
    let asteroids = game.sites().len() as u32;

    while game.turn() < config.max_turns {
        let turn = game.turn();
        if config.storm_interval > 0 && turn > 0 && turn % config.storm_interval == 0 {
            let site = SiteId(rng.gen_range(0..asteroids));
            let hit = game.storm(site);
            storms += 1;
            debug!(turn, %site, hit, "solar storm");
        }
        if config.orbit_interval > 0 && turn > 0 && turn % config.orbit_interval == 0 {
            shift_orbit(&mut game, &mut rng);
            orbit_shifts += 1;
        }

        if let Some(next) = game.next_actor()
            && game.actor(next).is_some_and(|actor| actor.is_player())
        {
            autopilot.act(&mut game, next);
        }

        if game.advance_turn().is_terminal() {
            break;
        }
    }

    let result = GameResult::from_game(seed, &game, storms, orbit_shifts);
    debug!(
        seed,
        verdict = ?result.verdict,
        turns = result.turns,
        settlers_alive = result.settlers_alive,
        "session finished"
    );
    Ok(result)
}

/// Move a random asteroid towards or away from the sun.
///
/// An asteroid arriving near the sun with its core exposed reacts at once,
/// and any explosion is settled before returning.
fn shift_orbit(game: &mut Game<Belt>, rng: &mut StdRng) -> SiteId {
    #[allow(clippy::cast_possible_truncation)]
    let site = SiteId(rng.gen_range(0..game.sites().len() as u32));
    let near_sun = game
        .sites()
        .get(site)
        .is_some_and(|asteroid| !asteroid.near_sun);
    game.sites_mut().set_near_sun(site, near_sun);
    game.settle_site_events();
    debug!(%site, near_sun, "orbit shifted");
    site
}

/// Aggregate statistics over many sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Sessions that ran to completion.
    pub games_played: u64,
    /// Sessions the settlers won.
    pub wins: u64,
    /// Sessions the settlers lost.
    pub losses: u64,
    /// Sessions stopped by the turn limit.
    pub unfinished: u64,
    /// Sum of turns over all sessions.
    pub total_turns: u64,
    /// Sum of storms over all sessions.
    pub total_storms: u64,
    /// Sessions that could not be set up, not counted in `games_played`.
    pub setup_failures: u64,
}

impl BatchSummary {
    /// Create an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one session.
    pub fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_turns += result.turns;
        self.total_storms += u64::from(result.storms);
        match result.verdict {
            Some(Verdict::DefendersWon) => self.wins += 1,
            Some(Verdict::DefendersLost) => self.losses += 1,
            None => self.unfinished += 1,
        }
    }

    /// Merge another summary into this one.
    pub fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.wins += other.wins;
        self.losses += other.losses;
        self.unfinished += other.unfinished;
        self.total_turns += other.total_turns;
        self.total_storms += other.total_storms;
        self.setup_failures += other.setup_failures;
    }

    /// Share of sessions won, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.wins as f64 / self.games_played as f64
        }
    }

    /// Average session length in turns.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean_turns(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games_played as f64
        }
    }
}

/// Run `games` sessions in parallel with seeds `base_seed`, `base_seed + 1`, ...
///
/// Uses the current rayon thread pool.
///
/// # Errors
///
/// Returns an error if the configuration is invalid. Sessions whose crews
/// cannot be placed are counted in [`BatchSummary::setup_failures`].
pub fn run_batch(
    base_seed: u64,
    games: u64,
    config: &GameConfig,
) -> Result<BatchSummary, SetupError> {
    config.validate()?;

    // Each thread accumulates its own summary, merged at the end
    let summary = (0..games)
        .into_par_iter()
        .fold(BatchSummary::new, |mut local, i| {
            let seed = base_seed.wrapping_add(i);
            match run_game(seed, config) {
                Ok(result) => local.add_result(&result),
                Err(error) => {
                    warn!(seed, %error, "session could not be set up");
                    local.setup_failures += 1;
                }
            }
            local
        })
        .reduce(BatchSummary::new, |mut a, b| {
            a.merge(&b);
            a
        });

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BeltConfig;
    use crate::game::invariants::check_invariants;

    fn small_config() -> GameConfig {
        GameConfig {
            belt: BeltConfig {
                asteroids: 8,
                extra_links: 2,
                ..BeltConfig::default()
            },
            max_turns: 300,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_setup_spawns_every_crew_member() {
        let config = small_config();
        let game = setup_game(5, &config).unwrap();

        assert_eq!(game.players().len(), config.settlers as usize);
        assert_eq!(
            game.queue().len(),
            (config.settlers + config.ufos) as usize
        );
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_setup_fails_when_belt_is_full() {
        let mut config = small_config();
        config.belt.capacity = Some(1);
        config.settlers = 9;

        assert!(matches!(
            setup_game(1, &config),
            Err(SetupError::SpawnRejected {
                kind: ActorKind::Player
            })
        ));
    }

    #[test]
    fn test_run_game_is_deterministic() {
        let config = small_config();
        let a = run_game(99, &config).unwrap();
        let b = run_game(99, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_game_respects_turn_limit() {
        let config = GameConfig {
            max_turns: 10,
            ..small_config()
        };
        let result = run_game(3, &config).unwrap();
        assert!(result.turns <= 10);
        assert_eq!(
            result.settlers_alive + result.settlers_exploded + result.settlers_stormed,
            config.settlers as usize
        );
    }

    #[test]
    fn test_trivial_goal_wins_on_first_turn() {
        let mut config = small_config();
        config.rules.goal = crate::game::GoalThresholds::uniform(0);

        let result = run_game(1, &config).unwrap();
        assert_eq!(result.verdict, Some(Verdict::DefendersWon));
        assert_eq!(result.turns, 1);
    }

    #[test]
    fn test_batch_counts_every_game() {
        let config = small_config();
        let summary = run_batch(10, 6, &config).unwrap();

        assert_eq!(summary.games_played, 6);
        assert_eq!(summary.wins + summary.losses + summary.unfinished, 6);
    }

    #[test]
    fn test_summary_merge() {
        let mut a = BatchSummary::new();
        let mut b = BatchSummary::new();
        let result = GameResult {
            seed: 0,
            verdict: Some(Verdict::DefendersWon),
            turns: 10,
            settlers_alive: 1,
            settlers_exploded: 0,
            settlers_stormed: 0,
            ufos_active: 0,
            ufos_lost: 0,
            robots_built: 0,
            storms: 2,
            orbit_shifts: 0,
            asteroids_destroyed: 0,
        };
        a.add_result(&result);
        b.add_result(&GameResult {
            verdict: None,
            turns: 30,
            ..result.clone()
        });

        a.merge(&b);
        assert_eq!(a.games_played, 2);
        assert_eq!(a.wins, 1);
        assert_eq!(a.unfinished, 1);
        assert!((a.mean_turns() - 20.0).abs() < f64::EPSILON);
        assert!((a.win_rate() - 0.5).abs() < f64::EPSILON);
        assert_eq!(a.total_storms, 4);

        b.setup_failures = 3;
        a.merge(&b);
        assert_eq!(a.setup_failures, 3);
    }

    #[test]
    fn test_batch_counts_setup_failures() {
        // Two asteroids that hold one actor each cannot take three settlers
        let mut config = small_config();
        config.belt.asteroids = 2;
        config.belt.capacity = Some(1);
        config.settlers = 3;
        config.ufos = 0;

        let summary = run_batch(0, 5, &config).unwrap();
        assert_eq!(summary.games_played, 0);
        assert_eq!(summary.setup_failures, 5);
    }

    #[test]
    fn test_orbit_shift_toggles_one_asteroid() {
        let mut game = setup_game(4, &small_config()).unwrap();
        let before: Vec<bool> = game.sites().iter().map(|(_, a)| a.near_sun).collect();
        let mut rng = StdRng::seed_from_u64(4);

        let site = shift_orbit(&mut game, &mut rng);

        for (id, asteroid) in game.sites().iter() {
            let was = before[id.0 as usize];
            if id == site {
                assert_ne!(asteroid.near_sun, was);
            } else {
                assert_eq!(asteroid.near_sun, was);
            }
        }
        assert!(check_invariants(&game).is_empty());
    }

    #[test]
    fn test_orbit_shifts_are_counted() {
        let config = GameConfig {
            orbit_interval: 5,
            storm_interval: 0,
            max_turns: 23,
            ..small_config()
        };
        let result = run_game(8, &config).unwrap();
        if result.turns == 23 {
            assert_eq!(result.orbit_shifts, 4);
        }
        assert!(u64::from(result.orbit_shifts) <= result.turns / 5);
    }
}
