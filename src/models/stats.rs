//! Derived statistics models.

use serde::{Deserialize, Serialize};

/// Tier classification based on percentile position in the performance ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Tier {
    /// Every tier, best first.
    pub const ALL: [Tier; 6] = [Tier::S, Tier::A, Tier::B, Tier::C, Tier::D, Tier::F];

    /// Calculate tier from a 0-indexed position in a ranking of `count` decks.
    pub fn from_position(index: usize, count: usize) -> Self {
        if count == 0 {
            return Tier::F;
        }
        Self::from_percentile(index as f64 / count as f64)
    }

    /// Calculate tier from a percentile fraction (0.0 is the top of the ranking).
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile <= 0.10 {
            Tier::S
        } else if percentile <= 0.25 {
            Tier::A
        } else if percentile <= 0.50 {
            Tier::B
        } else if percentile <= 0.75 {
            Tier::C
        } else if percentile <= 0.90 {
            Tier::D
        } else {
            Tier::F
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::S => write!(f, "S"),
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
            Tier::D => write!(f, "D"),
            Tier::F => write!(f, "F"),
        }
    }
}

/// Per-deck aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckAggregate {
    /// Deck name (case-sensitive key)
    pub name: String,

    /// Tier classification
    pub tier: Tier,

    /// Games attributed to this deck across all qualifying records
    pub total_games: u64,

    pub wins: u64,
    pub losses: u64,
    pub ties: u64,

    /// Distinct opponents this deck is favored against
    pub favorable_matchup_count: u32,

    /// Win rate (0 to 100), ties excluded
    pub win_rate: f64,

    /// Share of all attributed games (0 to 100)
    pub meta_share: f64,

    /// Weighted composite used for ranking
    pub performance_score: f64,
}

/// Ranked decks grouped by tier, each bucket in ranking order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    #[serde(rename = "S")]
    pub s: Vec<DeckAggregate>,
    #[serde(rename = "A")]
    pub a: Vec<DeckAggregate>,
    #[serde(rename = "B")]
    pub b: Vec<DeckAggregate>,
    #[serde(rename = "C")]
    pub c: Vec<DeckAggregate>,
    #[serde(rename = "D")]
    pub d: Vec<DeckAggregate>,
    #[serde(rename = "F")]
    pub f: Vec<DeckAggregate>,
}

impl TierTable {
    /// Decks in a specific tier.
    pub fn get(&self, tier: Tier) -> &[DeckAggregate] {
        match tier {
            Tier::S => &self.s,
            Tier::A => &self.a,
            Tier::B => &self.b,
            Tier::C => &self.c,
            Tier::D => &self.d,
            Tier::F => &self.f,
        }
    }

    /// Append a deck to its own tier's bucket.
    pub fn push(&mut self, deck: DeckAggregate) {
        let bucket = match deck.tier {
            Tier::S => &mut self.s,
            Tier::A => &mut self.a,
            Tier::B => &mut self.b,
            Tier::C => &mut self.c,
            Tier::D => &mut self.d,
            Tier::F => &mut self.f,
        };
        bucket.push(deck);
    }

    /// Total number of decks across all tiers.
    pub fn len(&self) -> usize {
        Tier::ALL.iter().map(|t| self.get(*t).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
