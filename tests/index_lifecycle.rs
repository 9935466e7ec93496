//! Integration tests for the build/rebuild lifecycle.
//! Tests: full build, rebuild idempotence, append-only incremental growth,
//! recreate on inconsistency, content-stamp staleness, lightweight reload.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use medkb_core::{
    BuildPlan, CatalogMode, DocumentExtractor, DocumentInput, EmbeddingProvider, FlatVectorIndex,
    HashedEmbedder, Medkb, OpenOptions, PatternCatalog, Result,
};
use tempfile::TempDir;

const CARDIAC_DOC: &str = "\
===
Chest Pain
RED FLAGS:
- sudden onset severe pain
- syncope
COMMON CAUSES:
- Angina
- Myocarditis
===
";

const RESPIRATORY_DOC: &str = "\
===
Cough
RED FLAGS:
- coughing up blood
Q: How long have you had the cough?
A:
- days
- weeks
===
";

/// Embedding provider that counts how many texts it was asked to embed.
struct CountingEmbedder {
    inner: HashedEmbedder,
    embedded: Arc<AtomicUsize>,
}

impl CountingEmbedder {
    fn new(counter: Arc<AtomicUsize>) -> Self {
        Self {
            inner: HashedEmbedder::default(),
            embedded: counter,
        }
    }
}

impl EmbeddingProvider for CountingEmbedder {
    fn model(&self) -> &str {
        self.inner.model()
    }

    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed(texts)
    }
}

fn write_doc(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

fn open_kb(docs: &Path, index_path: &Path, rebuild: bool) -> Medkb {
    let options = OpenOptions::new(index_path).docs_dir(docs).rebuild(rebuild);
    let index = FlatVectorIndex::open(index_path).unwrap();
    Medkb::open_with(options, Some(Box::new(index)), Some(Box::new(HashedEmbedder::default())))
        .unwrap()
}

#[test]
fn cold_start_runs_a_full_build() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);

    let kb = open_kb(&docs, &dir.path().join("index.bin"), false);
    assert_eq!(kb.catalog_mode(), CatalogMode::Full);
    assert_eq!(kb.build_report().plan, BuildPlan::Full);
    assert!(kb.catalog().len() > 0);
    assert_eq!(kb.index_count(), kb.catalog().len());
}

#[test]
fn rebuild_with_unchanged_sources_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    let index_path = dir.path().join("index.bin");

    let first = open_kb(&docs, &index_path, false);
    let count_after_first = first.index_count();
    drop(first);

    let second = open_kb(&docs, &index_path, true);
    assert_eq!(second.build_report().plan, BuildPlan::UpToDate);
    assert_eq!(second.build_report().embedded, 0);
    assert_eq!(second.index_count(), count_after_first);
}

#[test]
fn new_document_grows_the_index_incrementally() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    let index_path = dir.path().join("index.bin");

    let first = open_kb(&docs, &index_path, false);
    let initial = first.index_count();
    drop(first);

    // How many patterns does the new document carry on its own?
    let (new_patterns, _) = DocumentExtractor::new()
        .extract_document(&DocumentInput::from_text("Respiratory.txt", RESPIRATORY_DOC));
    let added = new_patterns.len();
    assert!(added > 0);

    write_doc(&docs, "Respiratory.txt", RESPIRATORY_DOC);

    let counter = Arc::new(AtomicUsize::new(0));
    let options = OpenOptions::new(&index_path).docs_dir(&docs).rebuild(true);
    let index = FlatVectorIndex::open(&index_path).unwrap();
    let kb = Medkb::open_with(
        options,
        Some(Box::new(index)),
        Some(Box::new(CountingEmbedder::new(Arc::clone(&counter)))),
    )
    .unwrap();

    assert_eq!(
        kb.build_report().plan,
        BuildPlan::Incremental { start: initial }
    );
    assert_eq!(kb.index_count(), initial + added);
    // Only the new document's patterns went to the embedding service.
    assert_eq!(counter.load(Ordering::SeqCst), added);
}

#[test]
fn shrunken_catalog_forces_recreate() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    write_doc(&docs, "Respiratory.txt", RESPIRATORY_DOC);
    let index_path = dir.path().join("index.bin");

    let first = open_kb(&docs, &index_path, false);
    let initial = first.index_count();
    drop(first);

    std::fs::remove_file(docs.join("Respiratory.txt")).unwrap();

    let kb = open_kb(&docs, &index_path, true);
    assert_eq!(kb.build_report().plan, BuildPlan::Recreate);
    assert!(kb.index_count() < initial);
    assert_eq!(kb.index_count(), kb.catalog().len());
}

#[test]
fn in_place_edit_with_same_count_is_detected_by_stamps() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    let index_path = dir.path().join("index.bin");

    let first = open_kb(&docs, &index_path, false);
    let initial = first.index_count();
    drop(first);

    // Same pattern count, different content.
    write_doc(&docs, "Cardiac.txt", &CARDIAC_DOC.replace("syncope", "fainting spells"));

    let kb = open_kb(&docs, &index_path, true);
    assert_eq!(kb.build_report().plan, BuildPlan::Recreate);
    assert_eq!(kb.index_count(), initial);

    // The re-embedded content is the edited one.
    let hit = kb
        .get_next_question(&medkb_core::RetrievalRequest::new("fainting spells episode"))
        .unwrap();
    assert!(hit.pattern.bot_question.contains("fainting"));
}

#[test]
fn reopen_without_rebuild_is_metadata_only() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    let index_path = dir.path().join("index.bin");

    let first = open_kb(&docs, &index_path, false);
    let count = first.index_count();
    drop(first);

    let kb = open_kb(&docs, &index_path, false);
    assert_eq!(kb.catalog_mode(), CatalogMode::Lightweight);
    assert_eq!(kb.catalog().len(), count);
    // No extraction ran.
    assert_eq!(kb.build_report().extraction.documents, 0);
    // Metadata fields survive; text fields are deliberately empty.
    let p = kb.catalog().get(0).unwrap();
    assert!(!p.medical_domain.is_empty());
    assert!(p.bot_question.is_empty());
}

#[test]
fn catalog_export_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);

    let kb = open_kb(&docs, &dir.path().join("index.bin"), false);
    let export = dir.path().join("catalog.json");
    let written = kb.export_catalog(&export).unwrap();
    assert_eq!(written, kb.catalog().len());

    let reloaded = PatternCatalog::import_json(&export).unwrap();
    assert_eq!(reloaded.len(), kb.catalog().len());
    for (a, b) in kb.catalog().patterns().iter().zip(reloaded.patterns()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.bot_question, b.bot_question);
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.tree_path, b.tree_path);
    }
}
