//! Deterministic rendering of a pattern into embedding text, and the
//! retrieval-time parse that recovers the question from it.
//!
//! The renderer and the parser live together on purpose: the rendered string
//! is the sole input to the embedding call, and lightweight reloads recover
//! `bot_question` by splitting it back apart. Field order and separator are
//! fixed; any change here is a format change for persisted indexes.

use crate::constants::{
    DOC_TEXT_DIFFERENTIAL_SAMPLE, DOC_TEXT_QUESTION_LABEL, DOC_TEXT_RED_FLAG_SAMPLE,
    DOC_TEXT_RESPONSE_SAMPLE, DOC_TEXT_SEPARATOR,
};
use crate::types::Pattern;

/// Render a pattern into its embedding text: labeled, non-empty fields in a
/// fixed order, joined with a fixed separator.
#[must_use]
pub fn render_document_text(pattern: &Pattern) -> String {
    let mut parts: Vec<String> = Vec::new();

    if !pattern.bot_question.is_empty() {
        parts.push(format!("{DOC_TEXT_QUESTION_LABEL}{}", pattern.bot_question));
    }
    if !pattern.clinical_context.is_empty() {
        parts.push(format!("Context: {}", pattern.clinical_context));
    }
    if !pattern.medical_domain.is_empty() {
        parts.push(format!("Domain: {}", pattern.medical_domain));
    }
    if !pattern.section.is_empty() {
        parts.push(format!("Section: {}", pattern.section));
    }
    parts.push(format!("Type: {}", pattern.content_type.label()));
    if !pattern.expected_patient_responses.is_empty() {
        let sample = pattern
            .expected_patient_responses
            .iter()
            .take(DOC_TEXT_RESPONSE_SAMPLE)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Expected: {sample}"));
    }
    if !pattern.red_flags.is_empty() {
        let sample = pattern
            .red_flags
            .iter()
            .take(DOC_TEXT_RED_FLAG_SAMPLE)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Red Flags: {sample}"));
    }
    if !pattern.differentials.is_empty() {
        let sample = pattern
            .differentials
            .iter()
            .take(DOC_TEXT_DIFFERENTIAL_SAMPLE)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        parts.push(format!("Differentials: {sample}"));
    }

    parts.join(DOC_TEXT_SEPARATOR)
}

/// Recover the question from rendered document text: first field, known
/// label stripped. Returns `None` when the record was rendered without a
/// question.
#[must_use]
pub fn recover_bot_question(document_text: &str) -> Option<String> {
    let first = document_text.split(DOC_TEXT_SEPARATOR).next()?;
    first
        .strip_prefix(DOC_TEXT_QUESTION_LABEL)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}
