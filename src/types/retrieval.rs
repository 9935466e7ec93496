//! Public retrieval request/response types.

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;

fn default_true() -> bool {
    true
}

/// Engine that satisfied a retrieval call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalEngineKind {
    /// Nearest-neighbour lookup over the embedding index.
    Semantic,
    /// Word-overlap scoring over the catalog, used when the index is empty,
    /// unavailable, or the embedding call failed.
    KeywordFallback,
}

/// Request for the single most relevant pattern given conversation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Free-text conversation context to match against.
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Restrict hits to domains containing this substring.
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Restrict hits to sections containing this substring.
    pub section: Option<String>,
    #[serde(default = "default_true")]
    /// Prefer the semantic path when the index is usable.
    pub use_semantic: bool,
    #[serde(default = "default_true")]
    /// Stable-sort candidates by priority tier before similarity. Safety
    /// content must never be outranked by a merely-more-similar match.
    pub prioritize_safety: bool,
}

impl RetrievalRequest {
    #[must_use]
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            domain: None,
            section: None,
            use_semantic: true,
            prioritize_safety: true,
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn semantic(mut self, enabled: bool) -> Self {
        self.use_semantic = enabled;
        self
    }

    #[must_use]
    pub fn prioritize_safety(mut self, enabled: bool) -> Self {
        self.prioritize_safety = enabled;
        self
    }
}

/// A resolved pattern plus scoring metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPattern {
    pub pattern: Pattern,
    /// Distance reported by the index; lower is closer. Absent on the
    /// keyword path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    /// Word-overlap score from the keyword path; 0 on the semantic path.
    #[serde(default)]
    pub keyword_score: usize,
    pub engine: RetrievalEngineKind,
}
