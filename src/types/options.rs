//! Builder-style options controlling the open/build lifecycle.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EMBEDDING_MODEL, EMBED_BATCH_SIZE, REBUILD_ENV_VAR};

/// Options accepted by [`crate::Medkb::open`].
///
/// The rebuild flag and the embedding-model override are the control surface
/// supplied by the surrounding service at build-phase invocation time; the
/// rest select paths and backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenOptions {
    /// Directory of domain documents; each file becomes one medical domain.
    pub docs_dir: Option<PathBuf>,
    /// Optional legacy structured handbook; yields interview questions only.
    pub legacy_path: Option<PathBuf>,
    /// Location of the persistent embedding index.
    pub index_path: PathBuf,
    /// Run extraction + embedding even when the index already has data.
    #[serde(default)]
    pub rebuild: bool,
    /// Embedding model override; falls back to the provider default.
    #[serde(default)]
    pub embedding_model: Option<String>,
    /// Base URL of an OpenAI-compatible embeddings endpoint.
    #[serde(default)]
    pub embedding_endpoint: Option<String>,
    /// Bearer token for the embeddings endpoint.
    #[serde(default, skip_serializing)]
    pub embedding_api_key: Option<String>,
    /// Texts per embedding request.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    EMBED_BATCH_SIZE
}

impl OpenOptions {
    #[must_use]
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: None,
            legacy_path: None,
            index_path: index_path.into(),
            rebuild: false,
            embedding_model: None,
            embedding_endpoint: None,
            embedding_api_key: None,
            batch_size: EMBED_BATCH_SIZE,
        }
    }

    /// Same as [`OpenOptions::new`], but reads the rebuild trigger from the
    /// `MEDKB_REBUILD` environment variable the way the surrounding service
    /// sets it.
    #[must_use]
    pub fn from_env(index_path: impl Into<PathBuf>) -> Self {
        let rebuild = std::env::var(REBUILD_ENV_VAR)
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        Self::new(index_path).rebuild(rebuild)
    }

    #[must_use]
    pub fn docs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.docs_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn legacy_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn rebuild(mut self, rebuild: bool) -> Self {
        self.rebuild = rebuild;
        self
    }

    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn embedding_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.embedding_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn embedding_api_key(mut self, key: impl Into<String>) -> Self {
        self.embedding_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Model requested from the embedding provider.
    #[must_use]
    pub fn resolved_model(&self) -> &str {
        self.embedding_model
            .as_deref()
            .unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }
}
