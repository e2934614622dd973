//! Page identity.
use std::hash::Hasher;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

/// Stable identifier of a page, derived from its title.
///
/// Titles are lower-cased, underscores become spaces and whitespace runs are
/// collapsed before hashing, so `New_York`, `new york` and `New York` share the
/// same hash. Collisions are not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageHash(i64);

impl PageHash {
    pub fn of(title: &str) -> Self {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(normalize_title(title).as_bytes());
        // stored as a signed integer by sqlite
        Self(hasher.finish() as i64)
    }

    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PageHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Title normalization used for hashing.
pub fn normalize_title(title: &str) -> String {
    title
        .replace('_', " ")
        .split_whitespace()
        .join(" ")
        .to_lowercase()
}
