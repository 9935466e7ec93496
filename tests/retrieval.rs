//! Integration tests for retrieval.
//! Tests: priority precedence, keyword fallback, domain scoping, and
//! question recovery in lightweight mode.

use std::path::Path;

use medkb_core::{
    CatalogMode, ContentType, EmbeddingProvider, EmbeddingRecord, FlatVectorIndex, HashedEmbedder,
    Medkb, OpenOptions, Pattern, PatternId, Priority, RecordMetadata, RetrievalEngineKind,
    RetrievalRequest, VectorIndex, render_document_text,
};
use tempfile::TempDir;

const CARDIAC_DOC: &str = "\
===
Chest Pain
RED FLAGS:
- tearing sensation radiating to the back
Q: Does the discomfort spread anywhere?
A:
- to the jaw
- to the left arm
===
";

const DERM_DOC: &str = "\
===
Rash
Q: Is the rash itchy between the toes?
A:
- yes
- no
===
";

fn write_doc(dir: &Path, name: &str, body: &str) {
    std::fs::write(dir.join(name), body).unwrap();
}

fn open_kb(docs: &Path, index_path: &Path, rebuild: bool) -> Medkb {
    let options = OpenOptions::new(index_path).docs_dir(docs).rebuild(rebuild);
    let index = FlatVectorIndex::open(index_path).unwrap();
    Medkb::open_with(options, Some(Box::new(index)), Some(Box::new(HashedEmbedder::default())))
        .unwrap()
}

fn build_kb(dir: &TempDir) -> Medkb {
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    write_doc(&docs, "Dermatologic.txt", DERM_DOC);
    open_kb(&docs, &dir.path().join("index.bin"), false)
}

#[test]
fn safety_critical_content_outranks_similarity() {
    let dir = TempDir::new().unwrap();
    let kb = build_kb(&dir);

    // The context matches the dermatology question almost word for word and
    // shares nothing with the cardiac red flag.
    let request = RetrievalRequest::new("the rash is itchy between the toes");
    let hit = kb.get_next_question(&request).unwrap();
    assert_eq!(hit.engine, RetrievalEngineKind::Semantic);
    assert_eq!(hit.pattern.priority, Priority::Critical);
    assert_eq!(hit.pattern.content_type, ContentType::RedFlag);

    // With safety reordering off, similarity wins.
    let hit = kb
        .get_next_question(&request.clone().prioritize_safety(false))
        .unwrap();
    assert_eq!(hit.pattern.content_type, ContentType::InterviewQuestion);
    assert!(hit.pattern.bot_question.contains("rash"));
}

#[test]
fn equal_distance_ties_break_by_priority() {
    let dir = TempDir::new().unwrap();
    let kb = build_kb(&dir);

    // A context sharing no vocabulary with any pattern puts every candidate
    // at the same maximal cosine distance; priority alone must decide.
    let hit = kb
        .get_next_question(&RetrievalRequest::new("zzz qqq xxx"))
        .unwrap();
    assert_eq!(hit.pattern.priority, Priority::Critical);
}

#[test]
fn keyword_fallback_when_semantic_disabled() {
    let dir = TempDir::new().unwrap();
    let kb = build_kb(&dir);

    let request = RetrievalRequest::new("patient reports rash today").semantic(false);
    let hit = kb.get_next_question(&request).unwrap();
    assert_eq!(hit.engine, RetrievalEngineKind::KeywordFallback);
    assert!(hit.keyword_score > 0);
    assert_eq!(hit.pattern.medical_domain, "Dermatologic");
}

#[test]
fn keyword_fallback_when_index_is_empty() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);

    // No embedder: the index stays empty and every call takes the keyword path.
    let options = OpenOptions::new(dir.path().join("index.bin")).docs_dir(&docs);
    let index = FlatVectorIndex::open(dir.path().join("index.bin")).unwrap();
    let kb = Medkb::open_with(options, Some(Box::new(index)), None).unwrap();
    assert_eq!(kb.index_count(), 0);

    let hit = kb
        .get_next_question(&RetrievalRequest::new("sharp chest discomfort"))
        .unwrap();
    assert_eq!(hit.engine, RetrievalEngineKind::KeywordFallback);
    assert_eq!(hit.pattern.medical_domain, "Cardiac");
}

#[test]
fn off_domain_context_with_domain_filter_returns_no_match() {
    let dir = TempDir::new().unwrap();
    let kb = build_kb(&dir);

    // Keyword path, domain scoped to Cardiac, context about something else
    // entirely: no score, no arbitrary off-domain result.
    let request = RetrievalRequest::new("itchy rash between the toes")
        .with_domain("Cardiac")
        .semantic(false);
    assert!(kb.get_next_question(&request).is_none());

    // Semantic path with a filter that matches no indexed domain.
    let request = RetrievalRequest::new("anything at all").with_domain("Nephrology");
    assert!(kb.get_next_question(&request).is_none());
}

#[test]
fn section_filter_scopes_candidates() {
    let dir = TempDir::new().unwrap();
    let kb = build_kb(&dir);

    let request = RetrievalRequest::new("does it spread anywhere").with_section("Chest Pain");
    let hit = kb.get_next_question(&request).unwrap();
    assert_eq!(hit.pattern.section, "Chest Pain");
}

#[test]
fn lightweight_mode_recovers_question_from_metadata() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);
    let index_path = dir.path().join("index.bin");

    drop(open_kb(&docs, &index_path, false));

    let kb = open_kb(&docs, &index_path, false);
    assert_eq!(kb.catalog_mode(), CatalogMode::Lightweight);

    let hit = kb
        .get_next_question(&RetrievalRequest::new("does the discomfort spread to the arm"))
        .unwrap();
    assert_eq!(hit.engine, RetrievalEngineKind::Semantic);
    assert!(!hit.pattern.bot_question.is_empty());
}

#[test]
fn lightweight_mode_recovers_question_from_document_text() {
    // Records persisted before bot_question landed in metadata: the parser
    // recovers it from the rendered document text.
    let dir = TempDir::new().unwrap();
    let index_path = dir.path().join("index.bin");
    let embedder = HashedEmbedder::default();

    let pattern = Pattern {
        id: PatternId::derive("Cardiac > Chest Pain > Interview Questions > 1", "q", "c"),
        medical_domain: "Cardiac".to_string(),
        section: "Chest Pain".to_string(),
        content_type: ContentType::InterviewQuestion,
        bot_question: "Does the pain move to your jaw?".to_string(),
        clinical_context: "Interview question for Chest Pain in Cardiac".to_string(),
        expected_patient_responses: vec!["yes".to_string(), "no".to_string()],
        red_flags: Vec::new(),
        differentials: Vec::new(),
        priority: Priority::Normal,
        tags: Vec::new(),
        tree_path: "Cardiac > Chest Pain > Interview Questions > 1".to_string(),
        source: "clinical_text".to_string(),
    };
    let document_text = render_document_text(&pattern);
    let vector = embedder.embed_one(&document_text).unwrap();

    let mut index = FlatVectorIndex::open(&index_path).unwrap();
    index
        .add(vec![EmbeddingRecord {
            vector,
            document_text,
            metadata: RecordMetadata {
                id: pattern.id.clone(),
                position: 0,
                medical_domain: pattern.medical_domain.clone(),
                section: pattern.section.clone(),
                content_type: pattern.content_type,
                priority: pattern.priority,
                tree_path: pattern.tree_path.clone(),
                source: pattern.source.clone(),
                tags: String::new(),
                bot_question: String::new(), // pre-metadata record
            },
        }])
        .unwrap();
    index.persist().unwrap();

    let options = OpenOptions::new(&index_path);
    let index = FlatVectorIndex::open(&index_path).unwrap();
    let kb = Medkb::open_with(
        options,
        Some(Box::new(index)),
        Some(Box::new(HashedEmbedder::default())),
    )
    .unwrap();
    assert_eq!(kb.catalog_mode(), CatalogMode::Lightweight);

    let hit = kb
        .get_next_question(&RetrievalRequest::new("pain moving to the jaw"))
        .unwrap();
    assert_eq!(hit.pattern.bot_question, "Does the pain move to your jaw?");
}

#[test]
fn no_context_overlap_and_no_filter_still_returns_none_on_keyword_path() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    std::fs::create_dir(&docs).unwrap();
    write_doc(&docs, "Cardiac.txt", CARDIAC_DOC);

    let options = OpenOptions::new(dir.path().join("index.bin")).docs_dir(&docs);
    let index = FlatVectorIndex::open(dir.path().join("index.bin")).unwrap();
    let kb = Medkb::open_with(options, Some(Box::new(index)), None).unwrap();

    // Every context word is unknown or too short to score.
    assert!(
        kb.get_next_question(&RetrievalRequest::new("zzz qqq aa"))
            .is_none()
    );
}
