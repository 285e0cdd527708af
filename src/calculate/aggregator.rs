//! The meta aggregator: raw matchup records in, ranked and tiered decks out.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::AggregationConfig;
use crate::models::{
    AggregationResult, DeckAggregate, DeckInsights, MatchDataset, MatchRecord, MatchupData,
    RankPosition, Tier, TierTable,
};

use super::{
    calculate_meta_share, calculate_performance_score, calculate_win_rate, AggregateError,
};

/// Running totals for a single deck.
#[derive(Debug, Default)]
struct DeckTally<'a> {
    total_games: u64,
    wins: u64,
    losses: u64,
    ties: u64,
    favorable_against: BTreeSet<&'a str>,
}

/// Running totals for one (deck, opponent) direction.
#[derive(Debug, Default)]
struct PairTally {
    weighted_rate: f64,
    rate_sum: f64,
    samples: u32,
    games: u64,
}

impl PairTally {
    fn add(&mut self, record: &MatchRecord) {
        self.weighted_rate += record.win_rate * record.total as f64;
        self.rate_sum += record.win_rate;
        self.samples += 1;
        self.games += record.total as u64;
    }

    /// Games-weighted win rate, or the plain mean when every sample is empty.
    fn win_rate(&self) -> f64 {
        if self.games > 0 {
            self.weighted_rate / self.games as f64
        } else if self.samples > 0 {
            self.rate_sum / self.samples as f64
        } else {
            0.0
        }
    }
}

/// Turns matchup records into ranked deck statistics.
///
/// The configuration is validated once at construction; every call to
/// [`MetaAggregator::aggregate`] is a pure function of its input.
#[derive(Debug, Clone)]
pub struct MetaAggregator {
    config: AggregationConfig,
}

impl MetaAggregator {
    /// Create an aggregator, rejecting invalid thresholds or weights.
    pub fn new(config: AggregationConfig) -> Result<Self, AggregateError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Aggregate already-typed records.
    pub fn aggregate(&self, records: &[MatchRecord]) -> Result<AggregationResult, AggregateError> {
        self.run(records, 0)
    }

    /// Aggregate a parsed dataset, carrying its skipped-row count into the result.
    pub fn aggregate_dataset(
        &self,
        dataset: &MatchDataset,
    ) -> Result<AggregationResult, AggregateError> {
        self.run(&dataset.records, dataset.skipped_records)
    }

    fn run(
        &self,
        records: &[MatchRecord],
        already_skipped: usize,
    ) -> Result<AggregationResult, AggregateError> {
        if records.is_empty() {
            return Err(AggregateError::InvalidInput(
                "no match records to aggregate".to_string(),
            ));
        }

        let mut skipped_records = already_skipped;
        let mut tallies: BTreeMap<&str, DeckTally> = BTreeMap::new();
        let mut qualifying: Vec<&MatchRecord> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            if let Err(reason) = record.validate() {
                if self.config.strict {
                    return Err(AggregateError::MalformedRecord {
                        line: index + 1,
                        reason,
                    });
                }
                skipped_records += 1;
                continue;
            }

            // Every valid record registers both decks, even when its sample
            // is too small to count.
            tallies.entry(record.deck_a.as_str()).or_default();
            tallies.entry(record.deck_b.as_str()).or_default();

            if record.total < self.config.min_matchup_games {
                continue;
            }

            self.attribute(&mut tallies, record);
            qualifying.push(record);
        }

        let mut ranked_names: Vec<&str> = Vec::new();
        let mut unranked_decks: Vec<String> = Vec::new();
        for (name, tally) in &tallies {
            if tally.total_games >= self.config.min_deck_games {
                ranked_names.push(*name);
            } else {
                unranked_decks.push(name.to_string());
            }
        }

        if ranked_names.is_empty() {
            return Err(AggregateError::InvalidInput(format!(
                "no deck reached the minimum of {} games",
                self.config.min_deck_games
            )));
        }

        let total_games: u64 = ranked_names
            .iter()
            .filter_map(|name| tallies.get(name))
            .map(|t| t.total_games)
            .sum();

        let mut decks: Vec<DeckAggregate> = ranked_names
            .iter()
            .filter_map(|name| tallies.get(name).map(|t| self.derive(name, t, total_games)))
            .collect();

        sort_by_performance(&mut decks);

        let count = decks.len();
        for (index, deck) in decks.iter_mut().enumerate() {
            deck.tier = Tier::from_position(index, count);
        }

        let popularity = popularity_positions(&decks);
        let matchups = build_matchups(&qualifying, &decks);

        let mut insights = BTreeMap::new();
        for (index, deck) in decks.iter().enumerate() {
            let list = matchups.get(&deck.name).map(Vec::as_slice).unwrap_or(&[]);
            let popularity_index = popularity.get(deck.name.as_str()).copied().unwrap_or(index);
            insights.insert(
                deck.name.clone(),
                self.insights_for(deck, list, index, popularity_index, count),
            );
        }

        let mut tiers = TierTable::default();
        for deck in &decks {
            tiers.push(deck.clone());
        }

        let ranking = decks.iter().map(|d| d.name.clone()).collect();
        let deck_details = decks.into_iter().map(|d| (d.name.clone(), d)).collect();

        Ok(AggregationResult {
            tiers,
            deck_details,
            matchups,
            insights,
            ranking,
            unranked_decks,
            total_games,
            skipped_records,
        })
    }

    /// Credit a qualifying record's games to the decks on each side.
    fn attribute<'a>(
        &self,
        tallies: &mut BTreeMap<&'a str, DeckTally<'a>>,
        record: &'a MatchRecord,
    ) {
        if record.is_mirror() {
            let tally = tallies.entry(record.deck_a.as_str()).or_default();
            tally.total_games += record.total as u64;
            tally.wins += record.wins as u64;
            tally.losses += record.losses as u64;
            tally.ties += record.ties as u64;
            return;
        }

        let half_total = (record.total / 2) as u64;
        let half_wins = (record.wins / 2) as u64;
        let half_losses = (record.losses / 2) as u64;
        let half_ties = (record.ties / 2) as u64;

        let a = tallies.entry(record.deck_a.as_str()).or_default();
        a.total_games += half_total;
        a.wins += half_wins;
        a.losses += half_losses;
        a.ties += half_ties;
        if record.win_rate > self.config.favorable_above {
            a.favorable_against.insert(record.deck_b.as_str());
        }

        let b = tallies.entry(record.deck_b.as_str()).or_default();
        b.total_games += half_total;
        b.wins += half_losses;
        b.losses += half_wins;
        b.ties += half_ties;
        if record.win_rate < self.config.favorable_below {
            b.favorable_against.insert(record.deck_a.as_str());
        }
    }

    fn derive(&self, name: &str, tally: &DeckTally, total_games: u64) -> DeckAggregate {
        let win_rate = calculate_win_rate(tally.wins, tally.losses);
        let meta_share = calculate_meta_share(tally.total_games, total_games);
        let favorable_matchup_count = tally.favorable_against.len() as u32;

        DeckAggregate {
            name: name.to_string(),
            tier: Tier::F,
            total_games: tally.total_games,
            wins: tally.wins,
            losses: tally.losses,
            ties: tally.ties,
            favorable_matchup_count,
            win_rate,
            meta_share,
            performance_score: calculate_performance_score(
                win_rate,
                meta_share,
                favorable_matchup_count,
                &self.config.weights,
            ),
        }
    }

    fn insights_for(
        &self,
        deck: &DeckAggregate,
        matchups: &[MatchupData],
        index: usize,
        popularity_index: usize,
        count: usize,
    ) -> DeckInsights {
        let limit = self.config.matchup_list_len;
        let opponents: Vec<&MatchupData> =
            matchups.iter().filter(|m| m.opponent != deck.name).collect();

        DeckInsights {
            best_matchups: opponents.iter().take(limit).map(|m| (*m).clone()).collect(),
            worst_matchups: opponents.iter().rev().take(limit).map(|m| (*m).clone()).collect(),
            meta_position: index as u32 + 1,
            total_decks: count as u32,
            tier: deck.tier,
            popularity: RankPosition::from_index(popularity_index, count),
            performance: RankPosition::from_index(index, count),
        }
    }
}

/// Aggregate records with the given configuration.
pub fn aggregate(
    records: &[MatchRecord],
    config: &AggregationConfig,
) -> Result<AggregationResult, AggregateError> {
    MetaAggregator::new(config.clone())?.aggregate(records)
}

/// Score descending, then games descending, then name ascending.
fn sort_by_performance(decks: &mut [DeckAggregate]) {
    decks.sort_by(|a, b| {
        b.performance_score
            .total_cmp(&a.performance_score)
            .then_with(|| b.total_games.cmp(&a.total_games))
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Position of each deck when ordered by meta share.
fn popularity_positions(decks: &[DeckAggregate]) -> HashMap<&str, usize> {
    let mut order: Vec<&DeckAggregate> = decks.iter().collect();
    order.sort_by(|a, b| {
        b.meta_share
            .total_cmp(&a.meta_share)
            .then_with(|| b.total_games.cmp(&a.total_games))
            .then_with(|| a.name.cmp(&b.name))
    });

    order
        .into_iter()
        .enumerate()
        .map(|(index, deck)| (deck.name.as_str(), index))
        .collect()
}

/// Per-deck matchup lists for ranked decks, best win rate first.
///
/// Duplicate records for one direction merge into a games-weighted entry.
/// When only one direction of a pair was recorded, the other is synthesized
/// with the complemented win rate.
fn build_matchups(
    qualifying: &[&MatchRecord],
    decks: &[DeckAggregate],
) -> BTreeMap<String, Vec<MatchupData>> {
    let mut direct: BTreeMap<(&str, &str), PairTally> = BTreeMap::new();
    for record in qualifying {
        direct
            .entry((record.deck_a.as_str(), record.deck_b.as_str()))
            .or_default()
            .add(record);
    }

    let mut lists: BTreeMap<String, Vec<MatchupData>> = decks
        .iter()
        .map(|d| (d.name.clone(), Vec::new()))
        .collect();

    for ((deck, opponent), tally) in &direct {
        if let Some(list) = lists.get_mut(*deck) {
            list.push(MatchupData {
                opponent: opponent.to_string(),
                win_rate: tally.win_rate(),
                games: tally.games,
                synthesized: false,
            });
        }

        if deck != opponent && !direct.contains_key(&(*opponent, *deck)) {
            if let Some(list) = lists.get_mut(*opponent) {
                list.push(MatchupData {
                    opponent: deck.to_string(),
                    win_rate: 100.0 - tally.win_rate(),
                    games: tally.games,
                    synthesized: true,
                });
            }
        }
    }

    for list in lists.values_mut() {
        list.sort_by(|a, b| {
            b.win_rate
                .total_cmp(&a.win_rate)
                .then_with(|| b.games.cmp(&a.games))
                .then_with(|| a.opponent.cmp(&b.opponent))
        });
    }

    lists
}
