//! The aggregation result handed to presentation layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{deck_slug, DeckAggregate, DeckInsights, MatchupData, TierTable};

/// Ranked, tiered meta statistics for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Ranked decks grouped by tier
    pub tiers: TierTable,

    /// Every ranked deck by name
    pub deck_details: BTreeMap<String, DeckAggregate>,

    /// Ordered matchup list per ranked deck, best win rate first
    pub matchups: BTreeMap<String, Vec<MatchupData>>,

    /// Insights per ranked deck
    pub insights: BTreeMap<String, DeckInsights>,

    /// Deck names in performance order
    pub ranking: Vec<String>,

    /// Decks seen in the input that fell below the minimum sample size
    pub unranked_decks: Vec<String>,

    /// Games attributed across all ranked decks
    pub total_games: u64,

    /// Records dropped as malformed
    pub skipped_records: usize,
}

impl AggregationResult {
    /// Look up a ranked deck by exact name, falling back to its slug.
    pub fn find_deck(&self, key: &str) -> Option<&DeckAggregate> {
        if let Some(deck) = self.deck_details.get(key) {
            return Some(deck);
        }
        let wanted = deck_slug(key);
        if wanted.is_empty() {
            return None;
        }
        self.ranking
            .iter()
            .find(|name| deck_slug(name) == wanted)
            .and_then(|name| self.deck_details.get(name))
    }

    /// Ranked decks in performance order.
    pub fn ranked_decks(&self) -> Vec<&DeckAggregate> {
        self.ranking
            .iter()
            .filter_map(|name| self.deck_details.get(name))
            .collect()
    }

    /// Number of ranked decks.
    pub fn deck_count(&self) -> usize {
        self.ranking.len()
    }
}
