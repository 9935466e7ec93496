//! Lifecycle coordination for opening a MedKB knowledge base.
//!
//! Responsibilities:
//! - Decide, once at open time, between full extraction + embedding,
//!   incremental embedding, and a lightweight metadata-only reload.
//! - Wire up the vector index and embedding provider without making either
//!   mandatory: a missing backend demotes the engine to keyword-only
//!   retrieval, never to a startup failure.
//! - Freeze all state before serving; retrieval is `&self` only.

use std::collections::BTreeMap;

use crate::catalog::{CatalogMode, PatternCatalog};
use crate::embed::EmbeddingProvider;
use crate::extract::{DocumentExtractor, DocumentInput, ExtractionReport};
use crate::index::builder::{self, BuildReport, document_stamp, plan_build};
use crate::index::{FlatVectorIndex, VectorIndex};
use crate::types::{OpenOptions, Pattern};
use crate::Result;

/// Primary handle for a MedKB knowledge base.
///
/// Construction runs the build phase to completion (or decides to skip it);
/// afterwards the handle is immutable and safe to share across threads.
pub struct Medkb {
    pub(crate) catalog: PatternCatalog,
    pub(crate) index: Option<Box<dyn VectorIndex>>,
    pub(crate) embedder: Option<Box<dyn EmbeddingProvider>>,
    pub(crate) report: BuildReport,
}

impl Medkb {
    /// Open with the default backends: a flat-file index at
    /// `options.index_path` and, when configured and compiled in, an
    /// OpenAI-compatible HTTP embedding provider.
    pub fn open(options: OpenOptions) -> Result<Self> {
        let index: Option<Box<dyn VectorIndex>> = match FlatVectorIndex::open(&options.index_path)
        {
            Ok(index) => Some(Box::new(index)),
            Err(err) => {
                // Logged once; every retrieval call from here on takes the
                // keyword path.
                tracing::error!(
                    path = %options.index_path.display(),
                    error = %err,
                    "vector index unavailable; keyword-only retrieval for this process"
                );
                None
            }
        };
        let embedder = default_embedder(&options);
        Self::open_with(options, index, embedder)
    }

    /// Open with injected backends. `index: None` or `embedder: None` are
    /// both legal degraded states served by the keyword path.
    pub fn open_with(
        options: OpenOptions,
        mut index: Option<Box<dyn VectorIndex>>,
        embedder: Option<Box<dyn EmbeddingProvider>>,
    ) -> Result<Self> {
        let existing = index.as_ref().map_or(0, |i| i.count());

        if !options.rebuild && existing > 0 {
            // Serve from the persisted index as-is; skip extraction entirely.
            let metadatas = index
                .as_ref()
                .map(|i| i.all_metadata())
                .unwrap_or_default();
            let catalog = PatternCatalog::from_index_metadata(&metadatas);
            log_available_patterns(&catalog, existing);
            return Ok(Self {
                catalog,
                index,
                embedder,
                report: BuildReport {
                    total_indexed: existing,
                    ..BuildReport::default()
                },
            });
        }

        if options.rebuild {
            tracing::info!(existing, "rebuild requested; extracting documents");
        } else {
            tracing::info!("empty index; extracting documents and building embeddings");
        }

        let (patterns, extraction, stamps) = extract_sources(&options);
        let catalog = PatternCatalog::from_patterns(patterns);
        let mut report = BuildReport {
            extraction,
            ..BuildReport::default()
        };

        match (&mut index, &embedder) {
            (Some(index), Some(embedder)) => {
                let stamps_clean = index.manifest().stamps_clean(&stamps);
                let plan = plan_build(options.rebuild, existing, catalog.len(), stamps_clean);
                match builder::execute(
                    index.as_mut(),
                    embedder.as_ref(),
                    &catalog,
                    plan,
                    &stamps,
                    options.batch_size,
                ) {
                    Ok(build) => {
                        report.plan = build.plan;
                        report.embedded = build.embedded;
                        report.failed_batches = build.failed_batches;
                        report.total_indexed = build.total_indexed;
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            "embedding build failed; serving keyword-only from extracted catalog"
                        );
                    }
                }
            }
            _ => {
                tracing::warn!(
                    "no embedding backend configured; keyword retrieval only"
                );
            }
        }

        Ok(Self {
            catalog,
            index,
            embedder,
            report,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// How the catalog was constructed this run.
    #[must_use]
    pub fn catalog_mode(&self) -> CatalogMode {
        self.catalog.mode()
    }

    /// Records currently persisted in the vector index.
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.index.as_ref().map_or(0, |i| i.count())
    }

    /// Statistics from the open-time build pass.
    #[must_use]
    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    /// Export the full catalog as pretty JSON for offline inspection.
    pub fn export_catalog(&self, path: &std::path::Path) -> Result<usize> {
        self.catalog.export_json(path)
    }
}

fn default_embedder(options: &OpenOptions) -> Option<Box<dyn EmbeddingProvider>> {
    #[cfg(feature = "api_embed")]
    if let Some(endpoint) = &options.embedding_endpoint {
        match crate::embed::HttpEmbeddingProvider::new(
            endpoint.clone(),
            options.embedding_api_key.clone(),
            options.resolved_model(),
        ) {
            Ok(provider) => return Some(Box::new(provider)),
            Err(err) => {
                tracing::warn!(error = %err, "embedding provider init failed");
                return None;
            }
        }
    }
    #[cfg(not(feature = "api_embed"))]
    let _ = options;
    None
}

/// Extract every configured source: the legacy handbook first (when present),
/// then the domain documents directory. Returns the patterns, the merged
/// extraction report, and a content stamp per source document.
fn extract_sources(
    options: &OpenOptions,
) -> (Vec<Pattern>, ExtractionReport, BTreeMap<String, String>) {
    let extractor = DocumentExtractor::new();
    let mut patterns = Vec::new();
    let mut report = ExtractionReport::default();
    let mut stamps = BTreeMap::new();

    if let Some(legacy_path) = &options.legacy_path {
        match DocumentInput::read(legacy_path) {
            Ok(input) => {
                stamps.insert(input.name.clone(), document_stamp(&input.text));
                let (found, legacy_report) = extractor.extract_legacy_document(&input);
                tracing::info!(
                    document = %input.name,
                    patterns = found.len(),
                    "legacy handbook extracted"
                );
                patterns.extend(found);
                report.absorb(&legacy_report);
            }
            Err(err) => {
                tracing::warn!(path = %legacy_path.display(), error = %err, "legacy handbook unreadable; skipping");
                report.skipped_documents += 1;
            }
        }
    }

    if let Some(docs_dir) = &options.docs_dir {
        let (inputs, skipped) = crate::extract::read_directory(docs_dir);
        report.skipped_documents += skipped;
        for input in inputs {
            stamps.insert(input.name.clone(), document_stamp(&input.text));
            let (found, doc_report) = extractor.extract_document(&input);
            patterns.extend(found);
            report.absorb(&doc_report);
        }
    }

    tracing::info!(
        patterns = patterns.len(),
        red_flags = report.red_flags,
        differentials = report.differentials,
        questions = report.questions,
        clinical_clues = report.clinical_clues,
        "extraction complete"
    );
    (patterns, report, stamps)
}

fn log_available_patterns(catalog: &PatternCatalog, existing: usize) {
    let domains = catalog.domain_summary();
    tracing::info!(
        embeddings = existing,
        patterns = catalog.len(),
        domains = domains.len(),
        "serving from existing index; extraction skipped"
    );
}
