//! The ordered, in-memory pattern catalog.
//!
//! The catalog is append-only across rebuild cycles; ordinal positions are
//! never reassigned once embedded. All read operations are pure scans and
//! never mutate patterns.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::types::{ContentType, Pattern, PatternId, Priority, RecordMetadata};

/// How the catalog was constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogMode {
    /// Populated directly by the extractor; all fields present.
    Full,
    /// Reconstructed from persisted index metadata; question/context/response
    /// fields are empty and are recovered at query time from the index.
    Lightweight,
}

/// Intake phases consumed by the orchestration layer; each maps to a priority
/// set plus a content-type set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakePhase {
    Greeting,
    SymptomDiscovery,
    RedFlags,
    Differentials,
    Context,
}

impl IntakePhase {
    fn filters(self) -> (&'static [Priority], &'static [ContentType]) {
        match self {
            Self::Greeting => (&[Priority::Normal], &[ContentType::InterviewQuestion]),
            Self::SymptomDiscovery => (
                &[Priority::High, Priority::Normal],
                &[ContentType::InterviewQuestion, ContentType::ClinicalClue],
            ),
            Self::RedFlags => (&[Priority::Critical], &[ContentType::RedFlag]),
            Self::Differentials => (&[Priority::High], &[ContentType::Differential]),
            Self::Context => (
                &[Priority::Normal, Priority::Low],
                &[ContentType::InterviewQuestion],
            ),
        }
    }
}

/// Ordered collection of all extracted patterns.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<Pattern>,
    mode: CatalogMode,
}

impl PatternCatalog {
    #[must_use]
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        Self {
            patterns,
            mode: CatalogMode::Full,
        }
    }

    /// Reconstruct a lightweight catalog from persisted index metadata,
    /// ordered by embed-time position. Text fields stay empty; they are
    /// recoverable on demand from the index's stored document text.
    #[must_use]
    pub fn from_index_metadata(metadatas: &[RecordMetadata]) -> Self {
        let mut sorted: Vec<&RecordMetadata> = metadatas.iter().collect();
        sorted.sort_by_key(|m| m.position);
        let patterns = sorted
            .into_iter()
            .map(|meta| Pattern {
                id: meta.id.clone(),
                medical_domain: meta.medical_domain.clone(),
                section: meta.section.clone(),
                content_type: meta.content_type,
                bot_question: String::new(),
                clinical_context: String::new(),
                expected_patient_responses: Vec::new(),
                red_flags: Vec::new(),
                differentials: Vec::new(),
                priority: meta.priority,
                tags: if meta.tags.is_empty() {
                    Vec::new()
                } else {
                    meta.tags.split(',').map(str::to_string).collect()
                },
                tree_path: meta.tree_path.clone(),
                source: meta.source.clone(),
            })
            .collect();
        Self {
            patterns,
            mode: CatalogMode::Lightweight,
        }
    }

    #[must_use]
    pub fn mode(&self) -> CatalogMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Pattern> {
        self.patterns.get(position)
    }

    #[must_use]
    pub fn by_id(&self, id: &PatternId) -> Option<&Pattern> {
        self.patterns.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Append newly extracted patterns; positions of existing entries are
    /// preserved.
    pub fn append(&mut self, patterns: Vec<Pattern>) {
        self.patterns.extend(patterns);
    }

    /// Patterns whose domain contains the given substring (case-insensitive).
    #[must_use]
    pub fn filter_by_domain(&self, domain: &str) -> Vec<&Pattern> {
        let needle = domain.to_lowercase();
        self.patterns
            .iter()
            .filter(|p| p.medical_domain.to_lowercase().contains(&needle))
            .collect()
    }

    /// Patterns whose section contains the given substring (case-insensitive).
    #[must_use]
    pub fn filter_by_section(&self, section: &str) -> Vec<&Pattern> {
        let needle = section.to_lowercase();
        self.patterns
            .iter()
            .filter(|p| p.section.to_lowercase().contains(&needle))
            .collect()
    }

    #[must_use]
    pub fn filter_by_content_type(&self, content_type: ContentType) -> Vec<&Pattern> {
        self.patterns
            .iter()
            .filter(|p| p.content_type == content_type)
            .collect()
    }

    #[must_use]
    pub fn filter_by_priority(&self, priority: Priority) -> Vec<&Pattern> {
        self.patterns
            .iter()
            .filter(|p| p.priority == priority)
            .collect()
    }

    /// Keyword-substring search across question, context, and expected
    /// responses, optionally scoped to a domain.
    #[must_use]
    pub fn search_keywords(&self, keywords: &[&str], domain: Option<&str>) -> Vec<&Pattern> {
        let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
        let domain_needle = domain.map(str::to_lowercase);
        self.patterns
            .iter()
            .filter(|p| {
                if let Some(ref d) = domain_needle {
                    if !p.medical_domain.to_lowercase().contains(d) {
                        return false;
                    }
                }
                let haystack = p.searchable_text();
                needles.iter().any(|k| haystack.contains(k))
            })
            .collect()
    }

    /// Patterns appropriate for an intake phase.
    #[must_use]
    pub fn patterns_for_phase(&self, phase: IntakePhase) -> Vec<&Pattern> {
        let (priorities, content_types) = phase.filters();
        self.patterns
            .iter()
            .filter(|p| priorities.contains(&p.priority) && content_types.contains(&p.content_type))
            .collect()
    }

    /// Pattern counts per medical domain, for availability logging.
    #[must_use]
    pub fn domain_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for p in &self.patterns {
            *summary.entry(p.medical_domain.clone()).or_insert(0) += 1;
        }
        summary
    }

    /// Serialize the full catalog to pretty JSON for offline inspection.
    /// Returns the number of patterns written.
    pub fn export_json(&self, path: &Path) -> Result<usize> {
        let json = serde_json::to_string_pretty(&self.patterns)?;
        fs_err::write(path, json)?;
        tracing::info!(path = %path.display(), patterns = self.patterns.len(), "catalog exported");
        Ok(self.patterns.len())
    }

    /// Reload a catalog previously written by [`PatternCatalog::export_json`].
    pub fn import_json(path: &Path) -> Result<Self> {
        let bytes = fs_err::read(path)?;
        let patterns: Vec<Pattern> = serde_json::from_slice(&bytes)?;
        Ok(Self::from_patterns(patterns))
    }
}
