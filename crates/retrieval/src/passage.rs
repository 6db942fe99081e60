//! Retrieved passages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source-specific provenance fields attached to a passage.
///
/// Each source exposes different keys (`uid`, `Title`, `source`, `url`, ...);
/// [`crate::attribution::Provenance`] classifies them.
pub type Metadata = BTreeMap<String, String>;

/// A unit of retrieved text plus the metadata describing where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Retrieved text
    pub content: String,

    /// Provenance fields
    #[serde(default)]
    pub metadata: Metadata,
}

impl Passage {
    /// Create a passage without metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Attach a metadata field.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata field.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_meta() {
        let passage = Passage::new("Aspirin overdose causes tinnitus.")
            .with_meta("uid", "12345")
            .with_meta("Title", "Salicylate toxicity");

        assert_eq!(passage.meta("uid"), Some("12345"));
        assert_eq!(passage.meta("Title"), Some("Salicylate toxicity"));
        assert_eq!(passage.meta("url"), None);
    }

    #[test]
    fn test_deserialize_without_metadata() {
        let passage: Passage = serde_json::from_str(r#"{"content": "text"}"#).unwrap();
        assert!(passage.metadata.is_empty());
    }
}
