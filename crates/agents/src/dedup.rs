//! Near-duplicate suppression for retrieved sources.
//!
//! The default key is the first 200 characters of a source's content. Two
//! distinct passages sharing that prefix (boilerplate headers, for example)
//! collapse into whichever was seen first. This is a known approximation;
//! swap the [`DedupKey`] if exact matching matters.

use researchbot_common::Source;
use std::collections::HashSet;
use std::sync::Arc;

/// Default prefix length for [`PrefixKey`].
pub const DEFAULT_PREFIX_CHARS: usize = 200;

/// Derives the key two sources must share to be treated as duplicates.
pub trait DedupKey: Send + Sync {
    fn key(&self, source: &Source) -> String;
}

/// Keys on a fixed-length character prefix of the content.
#[derive(Debug, Clone, Copy)]
pub struct PrefixKey {
    pub chars: usize,
}

impl Default for PrefixKey {
    fn default() -> Self {
        Self {
            chars: DEFAULT_PREFIX_CHARS,
        }
    }
}

impl DedupKey for PrefixKey {
    fn key(&self, source: &Source) -> String {
        source.content.chars().take(self.chars).collect()
    }
}

#[derive(Clone)]
pub struct Deduplicator {
    key: Arc<dyn DedupKey>,
}

impl Deduplicator {
    pub fn new(key: Arc<dyn DedupKey>) -> Self {
        Self { key }
    }

    pub fn with_prefix(chars: usize) -> Self {
        Self::new(Arc::new(PrefixKey { chars }))
    }

    /// Keep the first source for each key, preserving input order.
    pub fn dedupe(&self, sources: Vec<Source>) -> Vec<Source> {
        let mut seen = HashSet::new();
        sources
            .into_iter()
            .filter(|s| seen.insert(self.key.key(s)))
            .collect()
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(Arc::new(PrefixKey::default()))
    }
}
