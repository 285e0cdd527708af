//! Statistics calculation engine.
//!
//! Computes derived metrics from head-to-head match records:
//! - Per-deck win rates, meta share and performance scores
//! - Percentile tier rankings
//! - Matchup lists and per-deck insights
//! - Matchup charts for presentation layers

mod aggregator;
mod chart;

pub use aggregator::*;
pub use chart::*;

use thiserror::Error;

use crate::config::{ConfigError, ScoreWeights};

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed record at line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

/// Calculate win rate (0 to 100) from wins/losses. Ties are excluded.
pub fn calculate_win_rate(wins: u64, losses: u64) -> f64 {
    let decided = wins + losses;
    if decided == 0 {
        0.0
    } else {
        wins as f64 * 100.0 / decided as f64
    }
}

/// Calculate meta share (0 to 100) of a deck's games within all games.
pub fn calculate_meta_share(deck_games: u64, total_games: u64) -> f64 {
    if total_games == 0 {
        0.0
    } else {
        deck_games as f64 * 100.0 / total_games as f64
    }
}

/// Blend win rate, meta share and favorable matchups into one ranking score.
pub fn calculate_performance_score(
    win_rate: f64,
    meta_share: f64,
    favorable_matchups: u32,
    weights: &ScoreWeights,
) -> f64 {
    win_rate * weights.win_rate
        + meta_share * weights.meta_share
        + favorable_matchups as f64 * weights.favorable_matchup
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_win_rate() {
        assert!((calculate_win_rate(60, 40) - 60.0).abs() < 1e-9);
        assert_eq!(calculate_win_rate(0, 0), 0.0);
        assert_eq!(calculate_win_rate(3, 3), 50.0);
        assert_eq!(calculate_win_rate(0, 7), 0.0);
    }

    #[test]
    fn test_calculate_meta_share() {
        assert!((calculate_meta_share(50, 200) - 25.0).abs() < 1e-9);
        assert_eq!(calculate_meta_share(10, 0), 0.0);
    }

    #[test]
    fn test_calculate_performance_score() {
        let weights = ScoreWeights::default();
        // 60 * 0.5 + 50 * 0.3 + 1 * 2
        let score = calculate_performance_score(60.0, 50.0, 1, &weights);
        assert!((score - 47.0).abs() < 1e-9);
    }

    #[test]
    fn test_calculate_performance_score_custom_weights() {
        let weights = ScoreWeights {
            win_rate: 0.4,
            meta_share: 0.4,
            favorable_matchup: 2.0,
        };
        let score = calculate_performance_score(50.0, 10.0, 3, &weights);
        assert!((score - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregate_error_display() {
        let err = AggregateError::MalformedRecord {
            line: 4,
            reason: "wins is not a number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed record at line 4: wins is not a number"
        );
    }
}
