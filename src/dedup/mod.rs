//! Dedup filters for the frontier
//!
//! URLs are compared by their [`dedup_key`], so scheme and fragment variants
//! of the same page collapse into one entry.

mod bloom;

pub use bloom::BloomFilter;

use crate::config::{DedupConfig, DedupKind};
use crate::url::dedup_key;
use std::collections::HashSet;
use std::fmt;
use url::Url;

/// Tracks which URLs have already been enqueued in a run
#[derive(Debug, Clone)]
pub enum DedupFilter {
    /// Exact set of keys, no false positives
    Exact(HashSet<String>),
    /// Bounded memory, may report unseen URLs as seen
    Bloom(BloomFilter),
}

impl DedupFilter {
    pub fn exact() -> Self {
        DedupFilter::Exact(HashSet::new())
    }

    pub fn bloom(expected_items: usize, false_positive_rate: f64) -> Self {
        DedupFilter::Bloom(BloomFilter::with_rate(expected_items, false_positive_rate))
    }

    /// Builds the filter selected by the configuration
    ///
    /// Returns None when dedup is disabled.
    pub fn from_config(config: &DedupConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let filter = match config.kind {
            DedupKind::Exact => Self::exact(),
            DedupKind::Bloom => Self::bloom(config.expected_items, config.false_positive_rate),
        };
        tracing::debug!("Using dedup filter {}", filter);
        Some(filter)
    }

    pub fn seen(&self, url: &Url) -> bool {
        self.contains_key(&dedup_key(url))
    }

    pub fn mark(&mut self, url: &Url) {
        let key = dedup_key(url);
        match self {
            DedupFilter::Exact(keys) => {
                keys.insert(key);
            }
            DedupFilter::Bloom(filter) => filter.add(&key),
        }
    }

    fn contains_key(&self, key: &str) -> bool {
        match self {
            DedupFilter::Exact(keys) => keys.contains(key),
            DedupFilter::Bloom(filter) => filter.check(key),
        }
    }
}

impl fmt::Display for DedupFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupFilter::Exact(keys) => write!(f, "Exact(len={})", keys.len()),
            DedupFilter::Bloom(filter) => filter.fmt(f),
        }
    }
}
