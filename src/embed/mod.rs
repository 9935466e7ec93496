//! Embedding providers: turn rendered pattern text into fixed-dimension
//! vectors.

mod hashed;
#[cfg(feature = "api_embed")]
mod http;

pub use hashed::HashedEmbedder;
#[cfg(feature = "api_embed")]
pub use http::HttpEmbeddingProvider;

use crate::Result;

/// Trait implemented by embedding backends.
///
/// Implementations must be deterministic per (model, text) pair within a
/// process lifetime; the index stores which model produced its vectors.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier recorded in the index manifest.
    fn model(&self) -> &str;

    /// Expected vector dimension, when known ahead of the first call.
    fn dimension_hint(&self) -> Option<usize> {
        None
    }

    /// Embed a batch of texts, one vector per input in order.
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| crate::MedkbError::EmbeddingService {
                reason: "provider returned no vector for query".to_string(),
            })
    }
}
