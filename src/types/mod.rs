//! Public types exposed by the `medkb-core` crate.

pub mod embedding;
pub mod options;
pub mod pattern;
pub mod retrieval;

pub use embedding::{EmbeddingRecord, IndexManifest, RecordMetadata};
pub use options::OpenOptions;
pub use pattern::{ContentType, Pattern, PatternId, Priority};
pub use retrieval::{RetrievalEngineKind, RetrievalRequest, RetrievedPattern};
