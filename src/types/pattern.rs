//! The core pattern record extracted from clinical reference documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad classification of an extracted pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    RedFlag,
    Differential,
    InterviewQuestion,
    ClinicalClue,
    GeneralInformation,
}

impl ContentType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RedFlag => "red_flag",
            Self::Differential => "differential",
            Self::InterviewQuestion => "interview_question",
            Self::ClinicalClue => "clinical_clue",
            Self::GeneralInformation => "general_information",
        }
    }

    /// Parse the wire label back into a content type.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "red_flag" => Some(Self::RedFlag),
            "differential" => Some(Self::Differential),
            "interview_question" => Some(Self::InterviewQuestion),
            "clinical_clue" => Some(Self::ClinicalClue),
            "general_information" => Some(Self::GeneralInformation),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Urgency tier controlling retrieval ordering independent of textual
/// similarity. `RedFlag` content is always `Critical`, `Differential` always
/// `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Normal,
    Low,
}

impl Priority {
    /// Ordering key: lower ranks sort ahead during retrieval.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Normal => 2,
            Self::Low => 3,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Normal => "NORMAL",
            Self::Low => "LOW",
        }
    }

    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "NORMAL" => Some(Self::Normal),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content-derived identifier, stable across rebuild cycles.
///
/// Derived from the tree path plus the primary text fields, so two runs over
/// unchanged source documents produce identical ids. Stored in both the
/// catalog and the index metadata; index membership is decided by id lookup
/// rather than by positional count alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(String);

impl PatternId {
    /// Hex length kept from the BLAKE3 digest. Collisions across a catalog of
    /// a few thousand patterns are not a practical concern at 64 bits.
    const HEX_LEN: usize = 16;

    #[must_use]
    pub fn derive(tree_path: &str, question: &str, context: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tree_path.as_bytes());
        hasher.update(&[0]);
        hasher.update(question.as_bytes());
        hasher.update(&[0]);
        hasher.update(context.as_bytes());
        let hex = hasher.finalize().to_hex();
        Self(hex.as_str()[..Self::HEX_LEN].to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One structured clinical record (question, red flag, differential, or clue)
/// extracted from source text.
///
/// Patterns are immutable after extraction. The catalog appends, never
/// reorders; `tree_path` locates the record within
/// `Domain > Section > Category > ordinal` for logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    #[serde(default)]
    pub id: PatternId,
    pub medical_domain: String,
    pub section: String,
    pub content_type: ContentType,
    pub bot_question: String,
    pub clinical_context: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected_patient_responses: Vec<String>,
    /// Red flags extracted from the owning section. Populated even on
    /// non-red-flag records so safety context travels with every pattern.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub red_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differentials: Vec<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub tree_path: String,
    pub source: String,
}

impl Pattern {
    /// Structured `key:value` tags used for filterable search.
    #[must_use]
    pub fn standard_tags(
        domain: &str,
        section: &str,
        content_type: ContentType,
        priority: Priority,
        source: &str,
    ) -> Vec<String> {
        vec![
            format!("clinical_domain:{domain}"),
            format!("section:{section}"),
            format!("content_type:{}", content_type.label()),
            format!("priority:{}", priority.label()),
            format!("source:{source}"),
        ]
    }

    /// Compute the content-derived id for this record.
    #[must_use]
    pub fn compute_id(&self) -> PatternId {
        PatternId::derive(&self.tree_path, &self.bot_question, &self.clinical_context)
    }

    /// Text scanned by the catalog's keyword search.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.bot_question);
        text.push(' ');
        text.push_str(&self.clinical_context);
        for response in &self.expected_patient_responses {
            text.push(' ');
            text.push_str(response);
        }
        text.to_lowercase()
    }
}
