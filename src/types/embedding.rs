//! Persisted embedding records and the index manifest.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pattern::{ContentType, PatternId, Priority};

/// Compact metadata persisted with each embedding record.
///
/// Enough to reconstruct a lightweight catalog entry without re-running
/// extraction, and to evaluate domain/section predicates during queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub id: PatternId,
    /// Catalog ordinal at embed time. Kept as an ordering key; identity is
    /// carried by `id`.
    pub position: usize,
    pub medical_domain: String,
    pub section: String,
    pub content_type: ContentType,
    pub priority: Priority,
    pub tree_path: String,
    pub source: String,
    /// Tags flattened to a comma-separated string.
    pub tags: String,
    /// Stored directly so lightweight reloads never have to parse it back out
    /// of the rendered document text.
    #[serde(default)]
    pub bot_question: String,
}

/// One persisted embedding: vector, rendered text, and compact metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub vector: Vec<f32>,
    /// Deterministic textual rendering of the pattern; the sole input to the
    /// embedding call.
    pub document_text: String,
    pub metadata: RecordMetadata,
}

/// Descriptive header persisted alongside the records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Embedding model the vectors were produced with.
    #[serde(default)]
    pub model: String,
    /// Vector dimension observed on the first successful batch; 0 until then.
    #[serde(default)]
    pub dimension: usize,
    #[serde(default)]
    pub built_at: Option<DateTime<Utc>>,
    /// BLAKE3 stamp per source document, keyed by document name. A stamp
    /// mismatch with unchanged counts marks the index stale.
    #[serde(default)]
    pub document_stamps: BTreeMap<String, String>,
}

impl IndexManifest {
    /// True when every known document stamp matches the freshly computed set.
    /// Documents never seen before do not count as mismatches; they are the
    /// incremental-growth case.
    #[must_use]
    pub fn stamps_clean(&self, current: &BTreeMap<String, String>) -> bool {
        self.document_stamps
            .iter()
            .all(|(name, stamp)| current.get(name).is_none_or(|s| s == stamp))
    }
}
