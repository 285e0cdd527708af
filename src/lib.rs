//! # Meta Tiers
//!
//! Turns pairwise deck matchup exports into a ranked, tiered view of a
//! trading-card-game meta.
//!
//! ## Architecture
//!
//! - **models**: Match records, deck aggregates, tiers and insights
//! - **calculate**: The aggregation pipeline and matchup charts
//! - **storage**: Matchup export parsing and derived report snapshots
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string ("6h", "30m", "90s").
///
/// A bare number is read as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (digits, unit_secs) = match s.char_indices().last() {
        None => return None,
        Some((i, 'h')) => (&s[..i], 3600),
        Some((i, 'm')) => (&s[..i], 60),
        Some((i, 's')) => (&s[..i], 1),
        Some(_) => (s, 1),
    };

    let count: u64 = digits.parse().ok()?;
    count.checked_mul(unit_secs).map(Duration::from_secs)
}
