//! Retrieved passages and their provenance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw hit returned by the retrieval capability, ranked by relevance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.into());
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A retrieved passage tagged with the query that produced it.
///
/// Sources are value objects: two sources are equal when their content,
/// metadata and originating query are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
    pub originating_query: String,
}

impl Source {
    pub fn from_hit(hit: SearchHit, query: impl Into<String>) -> Self {
        Self {
            content: hit.content,
            metadata: hit.metadata,
            originating_query: query.into(),
        }
    }

    /// The `source` identifier from metadata, or `Unknown`.
    pub fn source_name(&self) -> &str {
        self.metadata
            .get("source")
            .map(String::as_str)
            .unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_keeps_hit_metadata_and_query() {
        let hit = SearchHit::new("VaporWare launched in 2019.", "docs/vaporware.txt");
        let source = Source::from_hit(hit, "What was VaporWare?");

        assert_eq!(source.source_name(), "docs/vaporware.txt");
        assert_eq!(source.originating_query, "What was VaporWare?");
    }

    #[test]
    fn missing_source_key_is_unknown() {
        let source = Source {
            content: "text".into(),
            metadata: BTreeMap::new(),
            originating_query: "q".into(),
        };
        assert_eq!(source.source_name(), "Unknown");
    }
}
