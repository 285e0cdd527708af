//! Core data models for meta statistics.

mod ids;
mod insight;
mod record;
mod report;
mod slug;
mod stats;

pub use ids::*;
pub use insight::*;
pub use record::*;
pub use report::*;
pub use slug::*;
pub use stats::*;
