//! Build planning and execution for the embedding index.
//!
//! The planner compares persisted state against the freshly extracted
//! catalog; the executor embeds in fixed-size batches, tolerating per-batch
//! failures. A failed batch leaves a gap in the index rather than aborting
//! the build.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::catalog::PatternCatalog;
use crate::embed::EmbeddingProvider;
use crate::extract::ExtractionReport;
use crate::types::{EmbeddingRecord, Pattern, RecordMetadata};

use super::doc_text::render_document_text;
use super::VectorIndex;

/// Startup build decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPlan {
    /// Embed every catalog pattern.
    Full,
    /// Embed only patterns appended after the persisted count.
    Incremental { start: usize },
    /// Persisted state is inconsistent with the catalog; drop and rebuild.
    Recreate,
    /// Nothing to do.
    UpToDate,
}

/// Counters describing one build pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub plan: BuildPlan,
    /// Vectors successfully written this pass.
    pub embedded: usize,
    /// Batches lost to embedding-service failures; the index has gaps.
    pub failed_batches: usize,
    /// Records in the index after the pass.
    pub total_indexed: usize,
    /// Statistics from the extraction that fed this build.
    #[serde(default)]
    pub extraction: ExtractionReport,
}

impl Default for BuildReport {
    fn default() -> Self {
        Self {
            plan: BuildPlan::UpToDate,
            embedded: 0,
            failed_batches: 0,
            total_indexed: 0,
            extraction: ExtractionReport::default(),
        }
    }
}

/// BLAKE3 content stamp for one source document.
#[must_use]
pub fn document_stamp(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Decide what the build pass should do.
///
/// `stamps_clean` reports whether every document stamp recorded in the
/// manifest still matches the source; an in-place edit that preserves counts
/// flips it false and forces a recreate.
#[must_use]
pub fn plan_build(
    rebuild_requested: bool,
    current_count: usize,
    catalog_count: usize,
    stamps_clean: bool,
) -> BuildPlan {
    if current_count == 0 {
        return BuildPlan::Full;
    }
    if !rebuild_requested {
        return BuildPlan::UpToDate;
    }
    if !stamps_clean || catalog_count < current_count {
        return BuildPlan::Recreate;
    }
    if catalog_count > current_count {
        BuildPlan::Incremental {
            start: current_count,
        }
    } else {
        BuildPlan::UpToDate
    }
}

/// Run the plan against the index. Batch failures are logged and counted;
/// only storage-level errors propagate.
pub fn execute(
    index: &mut dyn VectorIndex,
    provider: &dyn EmbeddingProvider,
    catalog: &PatternCatalog,
    plan: BuildPlan,
    stamps: &BTreeMap<String, String>,
    batch_size: usize,
) -> Result<BuildReport> {
    let mut report = BuildReport {
        plan,
        total_indexed: index.count(),
        ..BuildReport::default()
    };

    let pending: Vec<(usize, &Pattern)> = match plan {
        BuildPlan::UpToDate => {
            tracing::info!(count = index.count(), "embedding index up to date");
            return Ok(report);
        }
        BuildPlan::Full => catalog.patterns().iter().enumerate().collect(),
        BuildPlan::Recreate => {
            tracing::warn!(
                indexed = index.count(),
                extracted = catalog.len(),
                "index inconsistent with catalog; dropping and rebuilding"
            );
            index.drop_and_recreate()?;
            catalog.patterns().iter().enumerate().collect()
        }
        // Selection is id-driven, not positional: patterns skipped by an
        // earlier failed batch are picked up again here.
        BuildPlan::Incremental { .. } => catalog
            .patterns()
            .iter()
            .enumerate()
            .filter(|(_, p)| !index.contains(&p.id))
            .collect(),
    };

    tracing::info!(
        pending = pending.len(),
        plan = ?plan,
        model = provider.model(),
        "embedding build started"
    );

    let batch_size = batch_size.max(1);
    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch
            .iter()
            .map(|(_, p)| render_document_text(p))
            .collect();
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

        let vectors = match provider.embed(&text_refs) {
            Ok(vectors) if vectors.len() == batch.len() => vectors,
            Ok(vectors) => {
                tracing::error!(
                    sent = batch.len(),
                    received = vectors.len(),
                    "embedding batch returned wrong vector count; skipping batch"
                );
                report.failed_batches += 1;
                continue;
            }
            Err(err) => {
                tracing::error!(error = %err, "embedding batch failed; skipping batch");
                report.failed_batches += 1;
                continue;
            }
        };

        let records: Vec<EmbeddingRecord> = batch
            .iter()
            .zip(vectors)
            .zip(texts)
            .map(|(((position, pattern), vector), document_text)| EmbeddingRecord {
                vector,
                document_text,
                metadata: RecordMetadata {
                    id: pattern.id.clone(),
                    position: *position,
                    medical_domain: pattern.medical_domain.clone(),
                    section: pattern.section.clone(),
                    content_type: pattern.content_type,
                    priority: pattern.priority,
                    tree_path: pattern.tree_path.clone(),
                    source: pattern.source.clone(),
                    tags: pattern.tags.join(","),
                    bot_question: pattern.bot_question.clone(),
                },
            })
            .collect();

        let added = records.len();
        if let Err(err) = index.add(records) {
            tracing::error!(error = %err, "index rejected batch; skipping batch");
            report.failed_batches += 1;
            continue;
        }
        report.embedded += added;
    }

    let manifest = index.manifest_mut();
    manifest.model = provider.model().to_string();
    manifest.built_at = Some(Utc::now());
    manifest.document_stamps = stamps.clone();

    index.persist()?;
    report.total_indexed = index.count();
    tracing::info!(
        embedded = report.embedded,
        failed_batches = report.failed_batches,
        total = report.total_indexed,
        "embedding build finished"
    );
    Ok(report)
}
