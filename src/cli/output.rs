//! Output formatting utilities for CLI.

use std::fmt::Write;

use drift::Verdict;
use drift::session::{BatchSummary, GameResult};
use serde::Serialize;

fn verdict_text(verdict: Option<Verdict>) -> &'static str {
    match verdict {
        Some(Verdict::DefendersWon) => "settlers won",
        Some(Verdict::DefendersLost) => "settlers lost",
        None => "undecided (turn limit)",
    }
}

/// Format a game result as human-readable text.
pub(super) fn format_text(result: &GameResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Game Result (seed: {})", result.seed);
    let _ = writeln!(output, "  Outcome: {}", verdict_text(result.verdict));
    let _ = writeln!(output, "  Turns: {}", result.turns);
    let _ = writeln!(output, "  Storms: {}", result.storms);
    let _ = writeln!(output, "  Orbit shifts: {}\n", result.orbit_shifts);

    let _ = writeln!(
        output,
        "  Settlers: {} alive, {} lost to explosions, {} lost to storms",
        result.settlers_alive, result.settlers_exploded, result.settlers_stormed
    );
    let _ = writeln!(
        output,
        "  UFOs: {} active, {} lost",
        result.ufos_active, result.ufos_lost
    );
    let _ = writeln!(output, "  Robots built: {}", result.robots_built);
    let _ = writeln!(output, "  Asteroids destroyed: {}", result.asteroids_destroyed);

    output
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult<'a> {
    /// Raw counters.
    #[serde(flatten)]
    summary: &'a BatchSummary,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average game length in turns.
    avg_turns: f64,
    /// First seed of the batch.
    base_seed: u64,
}

impl<'a> JsonBatchResult<'a> {
    /// Create from a summary.
    pub(super) fn from_summary(summary: &'a BatchSummary, base_seed: u64) -> Self {
        Self {
            summary,
            win_rate: summary.win_rate(),
            avg_turns: summary.mean_turns(),
            base_seed,
        }
    }
}

/// Share of `part` in the batch, as a percentage.
#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, summary: &BatchSummary) -> f64 {
    if summary.games_played == 0 {
        0.0
    } else {
        part as f64 / summary.games_played as f64 * 100.0
    }
}

/// Format batch statistics as human-readable text.
pub(super) fn format_batch_text(summary: &BatchSummary) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Batch Results ({} games)", summary.games_played);
    output.push_str("========================================\n\n");

    for (label, count) in [
        ("Settlers won", summary.wins),
        ("Settlers lost", summary.losses),
        ("Undecided", summary.unfinished),
    ] {
        let _ = writeln!(
            output,
            "  {label}: {count} ({:.1}%)",
            percent(count, summary)
        );
    }

    let _ = writeln!(
        output,
        "\nAverage Game Length: {:.0} turns",
        summary.mean_turns()
    );
    let _ = writeln!(output, "Total Storms: {}", summary.total_storms);
    if summary.setup_failures > 0 {
        let _ = writeln!(
            output,
            "Sessions that could not be set up: {}",
            summary.setup_failures
        );
    }

    output
}

/// Format batch statistics as CSV.
pub(super) fn format_batch_csv(summary: &BatchSummary) -> String {
    let mut output = String::new();

    output.push_str("games,wins,losses,unfinished,win_rate,avg_turns,storms,setup_failures\n");
    let _ = writeln!(
        output,
        "{},{},{},{},{:.4},{:.2},{},{}",
        summary.games_played,
        summary.wins,
        summary.losses,
        summary.unfinished,
        summary.win_rate(),
        summary.mean_turns(),
        summary.total_storms,
        summary.setup_failures
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> BatchSummary {
        BatchSummary {
            games_played: 4,
            wins: 1,
            losses: 2,
            unfinished: 1,
            total_turns: 400,
            total_storms: 9,
            setup_failures: 0,
        }
    }

    #[test]
    fn test_batch_text_shows_rates() {
        let text = format_batch_text(&sample_summary());
        assert!(text.contains("Batch Results (4 games)"));
        assert!(text.contains("Settlers won: 1 (25.0%)"));
        assert!(text.contains("Average Game Length: 100 turns"));
        assert!(!text.contains("could not be set up"));
    }

    #[test]
    fn test_batch_text_reports_setup_failures() {
        let summary = BatchSummary {
            setup_failures: 2,
            ..sample_summary()
        };
        assert!(format_batch_text(&summary).contains("Sessions that could not be set up: 2"));
    }

    #[test]
    fn test_batch_csv_has_header_and_row() {
        let csv = format_batch_csv(&sample_summary());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "4,1,2,1,0.2500,100.00,9,0");
    }

    #[test]
    fn test_batch_json_is_flat() {
        let summary = sample_summary();
        let json = serde_json::to_value(JsonBatchResult::from_summary(&summary, 7)).unwrap();
        assert_eq!(json["wins"], 1);
        assert_eq!(json["base_seed"], 7);
    }
}
