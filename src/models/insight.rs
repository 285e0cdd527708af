//! Matchup and per-deck insight models.

use serde::{Deserialize, Serialize};

use super::Tier;

/// One deck's record against a single opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupData {
    pub opponent: String,

    /// Win rate against `opponent` (0 to 100)
    pub win_rate: f64,

    /// Games in the sample
    pub games: u64,

    /// True when derived from the opponent's record because no direct
    /// record exists for this direction
    #[serde(default)]
    pub synthesized: bool,
}

/// Rank within one ordering of the ranked decks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankPosition {
    /// 1-indexed rank
    pub rank: u32,

    /// `index / count * 100` formatted to one decimal
    pub percentile: String,
}

impl RankPosition {
    /// Build from a 0-indexed position within `count` decks.
    pub fn from_index(index: usize, count: usize) -> Self {
        let percentile = if count > 0 {
            index as f64 / count as f64 * 100.0
        } else {
            0.0
        };
        Self {
            rank: index as u32 + 1,
            percentile: format!("{:.1}", percentile),
        }
    }
}

/// Insights for a single ranked deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckInsights {
    /// Highest win-rate matchups, best first
    pub best_matchups: Vec<MatchupData>,

    /// Lowest win-rate matchups, worst first
    pub worst_matchups: Vec<MatchupData>,

    /// 1-indexed position in the performance ranking
    pub meta_position: u32,

    pub total_decks: u32,

    pub tier: Tier,

    /// Position by meta share
    pub popularity: RankPosition,

    /// Position by performance score
    pub performance: RankPosition,
}
