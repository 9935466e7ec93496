//! Document extraction: typed clinical patterns out of semi-structured text.
//!
//! A document is split into sections; four specialized extractors run over
//! each section independently, every emitted pattern inheriting the section's
//! red flags. Documents that produce nothing through the specialized layout
//! fall back to paragraph-level generic extraction. Extraction never fails a
//! batch: malformed regions are logged and skipped, and statistics are
//! returned by value with each call.

mod clues;
mod differentials;
mod generic;
mod legacy;
mod questions;
mod red_flags;
mod sections;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use clues::ClueExtractor;
pub use differentials::DifferentialExtractor;
pub use questions::QuestionExtractor;
pub use red_flags::RedFlagExtractor;
pub use sections::{DocumentSection, domain_from_filename, split_sections};

use crate::Result;
use crate::types::{ContentType, Pattern};

use red_flags::collect_red_flags;

/// Provenance tag for patterns produced by the specialized clinical pipeline.
pub(crate) const CLINICAL_SOURCE: &str = "clinical_text";

/// Raw document text plus the minimal file metadata used for domain naming
/// and provenance.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub name: String,
    pub path: Option<PathBuf>,
    pub size: u64,
    pub text: String,
}

impl DocumentInput {
    #[must_use]
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            name: name.into(),
            path: None,
            size: text.len() as u64,
            text,
        }
    }

    /// Read a document from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs_err::read_to_string(path).map_err(|err| crate::MedkbError::Extraction {
            uri: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let size = fs_err::metadata(path).map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            size,
            text,
        })
    }
}

/// Per-section extraction context handed to each [`SectionExtractor`].
#[derive(Debug)]
pub struct SectionContext<'a> {
    pub medical_domain: &'a str,
    pub section: &'a str,
    pub lines: &'a [&'a str],
    /// Red flags collected from this section before the extractors run;
    /// cross-linked into every emitted pattern.
    pub red_flags: &'a [String],
    pub source: &'a str,
}

/// Trait implemented by the per-section pattern extractors.
pub trait SectionExtractor: Send + Sync {
    /// Name used for diagnostics.
    fn name(&self) -> &'static str;

    /// Emit zero or more patterns from the section. Must not fail: regions
    /// that do not match the extractor's layout yield nothing.
    fn extract(&self, ctx: &SectionContext<'_>) -> Vec<Pattern>;
}

/// Registry of section extractors run over every content section.
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn SectionExtractor>>,
}

impl ExtractorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    pub fn register<E>(&mut self, extractor: E)
    where
        E: SectionExtractor + 'static,
    {
        self.extractors.push(Box::new(extractor));
    }

    #[must_use]
    pub fn extractors(&self) -> &[Box<dyn SectionExtractor>] {
        &self.extractors
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(RedFlagExtractor);
        registry.register(DifferentialExtractor);
        registry.register(QuestionExtractor);
        registry.register(ClueExtractor);
        registry
    }
}

/// Counters describing one extraction pass, returned by value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub documents: usize,
    pub patterns: usize,
    pub red_flags: usize,
    pub differentials: usize,
    pub questions: usize,
    pub clinical_clues: usize,
    pub general_information: usize,
    pub skipped_documents: usize,
}

impl ExtractionReport {
    pub(crate) fn record(&mut self, pattern: &Pattern) {
        self.patterns += 1;
        match pattern.content_type {
            ContentType::RedFlag => self.red_flags += 1,
            ContentType::Differential => self.differentials += 1,
            ContentType::InterviewQuestion => self.questions += 1,
            ContentType::ClinicalClue => self.clinical_clues += 1,
            ContentType::GeneralInformation => self.general_information += 1,
        }
    }

    pub(crate) fn absorb(&mut self, other: &ExtractionReport) {
        self.documents += other.documents;
        self.patterns += other.patterns;
        self.red_flags += other.red_flags;
        self.differentials += other.differentials;
        self.questions += other.questions;
        self.clinical_clues += other.clinical_clues;
        self.general_information += other.general_information;
        self.skipped_documents += other.skipped_documents;
    }
}

/// Converts raw documents into pattern lists.
pub struct DocumentExtractor {
    registry: ExtractorRegistry,
}

impl DocumentExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ExtractorRegistry::default(),
        }
    }

    #[must_use]
    pub fn with_registry(registry: ExtractorRegistry) -> Self {
        Self { registry }
    }

    /// Extract one document. Falls back to generic paragraph extraction when
    /// the specialized layout yields nothing.
    #[must_use]
    pub fn extract_document(&self, input: &DocumentInput) -> (Vec<Pattern>, ExtractionReport) {
        let domain = domain_from_filename(&input.name);
        let mut patterns = Vec::new();

        for section in split_sections(&input.text) {
            if section.content.trim().is_empty() {
                continue;
            }
            let lines: Vec<&str> = section.content.lines().collect();
            let red_flags = collect_red_flags(&lines);
            let ctx = SectionContext {
                medical_domain: &domain,
                section: &section.title,
                lines: &lines,
                red_flags: &red_flags,
                source: CLINICAL_SOURCE,
            };
            for extractor in self.registry.extractors() {
                let found = extractor.extract(&ctx);
                if !found.is_empty() {
                    tracing::debug!(
                        extractor = extractor.name(),
                        section = %section.title,
                        count = found.len(),
                        "extracted section patterns"
                    );
                    patterns.extend(found);
                }
            }
        }

        if patterns.is_empty() {
            patterns = generic::extract_generic(input);
        }

        let mut report = ExtractionReport {
            documents: 1,
            ..ExtractionReport::default()
        };
        for pattern in &mut patterns {
            pattern.id = pattern.compute_id();
            report.record(pattern);
        }
        tracing::info!(
            document = %input.name,
            domain = %domain,
            patterns = patterns.len(),
            "document extracted"
        );
        (patterns, report)
    }

    /// Extract a legacy structured handbook; yields interview questions only.
    #[must_use]
    pub fn extract_legacy_document(
        &self,
        input: &DocumentInput,
    ) -> (Vec<Pattern>, ExtractionReport) {
        let mut patterns = legacy::extract_legacy(input);
        let mut report = ExtractionReport {
            documents: 1,
            ..ExtractionReport::default()
        };
        for pattern in &mut patterns {
            pattern.id = pattern.compute_id();
            report.record(pattern);
        }
        (patterns, report)
    }

    /// Extract every `*.txt`, `*.md`, `*.rst` file in a directory, in sorted
    /// order. One unreadable document never aborts the batch.
    #[must_use]
    pub fn extract_directory(&self, dir: &Path) -> (Vec<Pattern>, ExtractionReport) {
        let mut patterns = Vec::new();
        let mut report = ExtractionReport::default();

        let (inputs, skipped) = read_directory(dir);
        report.skipped_documents += skipped;
        for input in inputs {
            let (found, doc_report) = self.extract_document(&input);
            patterns.extend(found);
            report.absorb(&doc_report);
        }
        (patterns, report)
    }
}

/// Read every `*.txt`, `*.md`, `*.rst` file in a directory, sorted by path.
/// Returns the readable inputs plus the count of skipped documents.
#[must_use]
pub fn read_directory(dir: &Path) -> (Vec<DocumentInput>, usize) {
    let entries = match fs_err::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), error = %err, "documents directory unreadable");
            return (Vec::new(), 0);
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("txt" | "md" | "rst")
            )
        })
        .collect();
    paths.sort();

    let mut inputs = Vec::new();
    let mut skipped = 0;
    for path in paths {
        match DocumentInput::read(&path) {
            Ok(input) => inputs.push(input),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                skipped += 1;
            }
        }
    }
    (inputs, skipped)
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
