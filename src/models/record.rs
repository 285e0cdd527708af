//! Match record model: one head-to-head sample between two decks.

use serde::{Deserialize, Serialize};

/// A pairwise matchup sample, counted from `deck_a`'s perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Deck whose perspective the counts are recorded from
    pub deck_a: String,

    /// Opposing deck (equal to `deck_a` for a mirror match)
    pub deck_b: String,

    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    /// Total games in the sample. Trusted for share math even when it
    /// disagrees with `wins + losses + ties`.
    pub total: u32,

    /// Precomputed win percentage for `deck_a` (0 to 100)
    pub win_rate: f64,
}

impl MatchRecord {
    /// Create a record, deriving `total` and `win_rate` from the counts.
    pub fn new(deck_a: &str, deck_b: &str, wins: u32, losses: u32, ties: u32) -> Self {
        let total = wins.saturating_add(losses).saturating_add(ties);
        let decided = wins as u64 + losses as u64;
        let win_rate = if decided > 0 {
            wins as f64 * 100.0 / decided as f64
        } else {
            0.0
        };

        Self {
            deck_a: deck_a.to_string(),
            deck_b: deck_b.to_string(),
            wins,
            losses,
            ties,
            total,
            win_rate,
        }
    }

    /// Override the precomputed win rate.
    pub fn with_win_rate(mut self, win_rate: f64) -> Self {
        self.win_rate = win_rate;
        self
    }

    /// Override the total game count.
    pub fn with_total(mut self, total: u32) -> Self {
        self.total = total;
        self
    }

    /// True when both sides are the same deck.
    pub fn is_mirror(&self) -> bool {
        self.deck_a == self.deck_b
    }

    /// Check the fields a typed record can still get wrong.
    pub fn validate(&self) -> Result<(), String> {
        if self.deck_a.trim().is_empty() || self.deck_b.trim().is_empty() {
            return Err("deck name is blank".to_string());
        }
        if !self.win_rate.is_finite() || !(0.0..=100.0).contains(&self.win_rate) {
            return Err(format!("win_rate {} is outside 0-100", self.win_rate));
        }
        Ok(())
    }
}

/// Parsed match records plus the number of rows dropped on the way in.
#[derive(Debug, Clone, Default)]
pub struct MatchDataset {
    pub records: Vec<MatchRecord>,
    pub skipped_records: usize,
}

impl MatchDataset {
    pub fn new(records: Vec<MatchRecord>, skipped_records: usize) -> Self {
        Self {
            records,
            skipped_records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
