//! The embedding index: vector storage keyed by pattern identity.

pub mod builder;
pub mod doc_text;
mod flat;

pub use builder::{BuildPlan, BuildReport};
pub use doc_text::{recover_bot_question, render_document_text};
pub use flat::FlatVectorIndex;

use crate::Result;
use crate::types::{EmbeddingRecord, IndexManifest, PatternId, RecordMetadata};

/// Metadata predicate applied during nearest-neighbour queries.
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    /// Case-insensitive substring match on the medical domain.
    pub domain_contains: Option<String>,
    /// Case-insensitive substring match on the section.
    pub section_contains: Option<String>,
}

impl MetadataFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain_contains.is_none() && self.section_contains.is_none()
    }

    #[must_use]
    pub fn matches(&self, metadata: &RecordMetadata) -> bool {
        if let Some(domain) = &self.domain_contains {
            if !metadata
                .medical_domain
                .to_lowercase()
                .contains(&domain.to_lowercase())
            {
                return false;
            }
        }
        if let Some(section) = &self.section_contains {
            if !metadata
                .section
                .to_lowercase()
                .contains(&section.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// One nearest-neighbour hit.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub metadata: RecordMetadata,
    pub document_text: String,
    /// Cosine distance; lower is closer.
    pub distance: f32,
}

/// Trait implemented by vector-index backends.
///
/// The serve phase only calls `&self` methods; mutation happens exclusively
/// during the explicit build phase.
pub trait VectorIndex: Send + Sync {
    /// Number of records currently persisted.
    fn count(&self) -> usize;

    /// True when the given pattern id is already indexed.
    fn contains(&self, id: &PatternId) -> bool;

    /// Append records to the index.
    fn add(&mut self, records: Vec<EmbeddingRecord>) -> Result<()>;

    /// Nearest neighbours for a query vector, optionally restricted by a
    /// metadata predicate.
    fn query(
        &self,
        vector: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<QueryHit>>;

    /// Drop all records and reset the manifest.
    fn drop_and_recreate(&mut self) -> Result<()>;

    /// Metadata of every record, for lightweight catalog reconstruction.
    fn all_metadata(&self) -> Vec<RecordMetadata>;

    fn manifest(&self) -> &IndexManifest;

    fn manifest_mut(&mut self) -> &mut IndexManifest;

    /// Flush the index to durable storage.
    fn persist(&self) -> Result<()>;
}
