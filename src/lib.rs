#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::float_cmp,
        clippy::cast_precision_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Strategic lint exceptions - these are allowed project-wide for pragmatic reasons:
//
// Documentation lints: Many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Cast safety: casts here are bounded by real-world constraints (document
// sizes, catalog counts) and reviewed at the call site.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
//
// Pattern matching: these pedantic lints often suggest changes that reduce clarity.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
//
// Performance/ergonomics trade-offs that are acceptable for this codebase:
#![allow(clippy::needless_pass_by_value)] // Many builders take owned values intentionally
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't need must_use on every method
#![allow(clippy::must_use_candidate)]
//
// Return value wrapping: some functions use Result for consistency even when they
// currently can't fail, allowing future error conditions without breaking API.
#![allow(clippy::unnecessary_wraps)]

/// The medkb-core crate version (matches `Cargo.toml`).
pub const MEDKB_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod catalog;
pub mod constants;
pub mod embed;
pub mod error;
pub mod extract;
pub mod index;
pub mod medkb;
pub mod types;

pub use catalog::{CatalogMode, IntakePhase, PatternCatalog};
pub use constants::*;
#[cfg(feature = "api_embed")]
pub use embed::HttpEmbeddingProvider;
pub use embed::{EmbeddingProvider, HashedEmbedder};
pub use error::{MedkbError, Result};
pub use extract::{
    DocumentExtractor, DocumentInput, ExtractionReport, ExtractorRegistry, SectionContext,
    SectionExtractor,
};
pub use index::{
    BuildPlan, BuildReport, FlatVectorIndex, MetadataFilter, QueryHit, VectorIndex,
    recover_bot_question, render_document_text,
};
pub use medkb::Medkb;
pub use types::{
    ContentType, EmbeddingRecord, IndexManifest, OpenOptions, Pattern, PatternId, Priority,
    RecordMetadata, RetrievalEngineKind, RetrievalRequest, RetrievedPattern,
};
