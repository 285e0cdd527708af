//! Content fingerprints for matchup datasets.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A deterministic dataset ID derived from the raw export bytes.
///
/// Two exports with identical bytes share an ID, which is what the report
/// cache keys on when deciding whether a reload needs a fresh aggregation.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    /// Create a new DatasetId from a hash string.
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    /// Fingerprint raw dataset bytes.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DatasetId({})", self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
