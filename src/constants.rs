//! Crate-wide constants for extraction, embedding, and retrieval defaults.

/// The number of pattern texts sent to the embedding service per request.
pub const EMBED_BATCH_SIZE: usize = 100;

/// Field separator used when rendering a pattern into embedding text.
///
/// The retrieval-time parser splits on this exact separator; see
/// `index::doc_text`.
pub const DOC_TEXT_SEPARATOR: &str = " | ";

/// Label prefixing the question field inside rendered embedding text.
pub const DOC_TEXT_QUESTION_LABEL: &str = "Question: ";

/// Nearest neighbours fetched per semantic query before priority reordering.
pub const SEMANTIC_CANDIDATES: usize = 20;

/// Words at or below this length are ignored by the keyword fallback scorer.
pub const KEYWORD_MIN_WORD_LEN: usize = 3;

/// Minimum paragraph length considered by the generic extractor.
pub const GENERIC_MIN_PARAGRAPH_LEN: usize = 50;

/// Clinical context captured from a generic paragraph is capped at this length.
pub const GENERIC_CONTEXT_CAP: usize = 500;

/// Expected patient responses sampled into embedding text.
pub const DOC_TEXT_RESPONSE_SAMPLE: usize = 3;

/// Red flags sampled into embedding text.
pub const DOC_TEXT_RED_FLAG_SAMPLE: usize = 3;

/// Differentials sampled into embedding text.
pub const DOC_TEXT_DIFFERENTIAL_SAMPLE: usize = 5;

/// Environment variable consulted by [`crate::types::OpenOptions::from_env`].
pub const REBUILD_ENV_VAR: &str = "MEDKB_REBUILD";

/// Default embedding model requested from API providers.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
