//! Matchup charts derived from an aggregation result.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{AggregationResult, DeckAggregate};

/// Square win-rate grid for the most played ranked decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupMatrix {
    /// Row and column labels, most played first
    pub decks: Vec<String>,

    /// `cells[row][col]` is the row deck's win rate against the column deck
    pub cells: Vec<Vec<Option<f64>>>,
}

/// A single directed matchup, flattened for listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupHighlight {
    pub deck: String,
    pub opponent: String,
    pub win_rate: f64,
    pub games: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupHighlights {
    pub best_performing: Vec<MatchupHighlight>,
    pub most_played: Vec<MatchupHighlight>,
}

/// Build the matchup grid for the `top_n` ranked decks by games played.
pub fn matchup_matrix(result: &AggregationResult, top_n: usize) -> MatchupMatrix {
    let mut by_games: Vec<&DeckAggregate> = result.deck_details.values().collect();
    by_games.sort_by(|a, b| {
        b.total_games
            .cmp(&a.total_games)
            .then_with(|| a.name.cmp(&b.name))
    });
    by_games.truncate(top_n);

    let decks: Vec<String> = by_games.iter().map(|d| d.name.clone()).collect();

    let cells = decks
        .iter()
        .map(|row| {
            let list = result.matchups.get(row);
            decks
                .iter()
                .map(|col| {
                    list.and_then(|l| l.iter().find(|m| &m.opponent == col))
                        .map(|m| m.win_rate)
                })
                .collect()
        })
        .collect();

    MatchupMatrix { decks, cells }
}

/// Best and most played recorded matchups across ranked decks.
///
/// Mirrors and synthesized reverse entries are left out so each observed
/// record shows up once.
pub fn matchup_highlights(result: &AggregationResult, limit: usize) -> MatchupHighlights {
    let observed: Vec<MatchupHighlight> = result
        .matchups
        .iter()
        .flat_map(|(deck, list)| {
            list.iter()
                .filter(move |m| !m.synthesized && &m.opponent != deck)
                .map(move |m| MatchupHighlight {
                    deck: deck.clone(),
                    opponent: m.opponent.clone(),
                    win_rate: m.win_rate,
                    games: m.games,
                })
        })
        .collect();

    let mut best_performing = observed.clone();
    best_performing.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.games.cmp(&a.games))
            .then_with(|| a.deck.cmp(&b.deck))
            .then_with(|| a.opponent.cmp(&b.opponent))
    });
    best_performing.truncate(limit);

    let mut most_played = observed;
    most_played.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| b.win_rate.total_cmp(&a.win_rate))
            .then_with(|| a.deck.cmp(&b.deck))
            .then_with(|| a.opponent.cmp(&b.opponent))
    });
    most_played.truncate(limit);

    MatchupHighlights {
        best_performing,
        most_played,
    }
}

/// Ranked decks ordered three ways, for leaderboard listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckLeaderboards {
    pub most_played: Vec<DeckAggregate>,
    pub highest_win_rate: Vec<DeckAggregate>,
    pub most_favorable: Vec<DeckAggregate>,
}

/// Top `limit` ranked decks by games, by win rate and by favorable matchups.
///
/// Ties fall back to games descending, then name ascending.
pub fn deck_leaderboards(result: &AggregationResult, limit: usize) -> DeckLeaderboards {
    let decks: Vec<&DeckAggregate> = result.deck_details.values().collect();

    DeckLeaderboards {
        most_played: top_decks(&decks, limit, |_, _| Ordering::Equal),
        highest_win_rate: top_decks(&decks, limit, |a, b| b.win_rate.total_cmp(&a.win_rate)),
        most_favorable: top_decks(&decks, limit, |a, b| {
            b.favorable_matchup_count.cmp(&a.favorable_matchup_count)
        }),
    }
}

fn top_decks<F>(decks: &[&DeckAggregate], limit: usize, primary: F) -> Vec<DeckAggregate>
where
    F: Fn(&DeckAggregate, &DeckAggregate) -> Ordering,
{
    let mut sorted = decks.to_vec();
    sorted.sort_by(|a, b| {
        primary(*a, *b)
            .then_with(|| b.total_games.cmp(&a.total_games))
            .then_with(|| a.name.cmp(&b.name))
    });
    sorted.into_iter().take(limit).cloned().collect()
}
