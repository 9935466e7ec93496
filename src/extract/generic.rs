//! Generic fallback: paragraph-level extraction for documents that do not
//! match the specialized clinical layout.

use crate::constants::{GENERIC_CONTEXT_CAP, GENERIC_MIN_PARAGRAPH_LEN};
use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::DocumentInput;

pub(crate) const GENERIC_SOURCE: &str = "generic_text";

/// Emit one LOW-priority `general_information` pattern per blank-line
/// delimited paragraph over the minimum length.
pub(crate) fn extract_generic(input: &DocumentInput) -> Vec<Pattern> {
    let section = title_from_filename(&input.name);
    input
        .text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| p.len() > GENERIC_MIN_PARAGRAPH_LEN)
        .enumerate()
        .map(|(i, paragraph)| {
            let mut context = paragraph.to_string();
            if context.len() > GENERIC_CONTEXT_CAP {
                let mut cut = GENERIC_CONTEXT_CAP;
                while !context.is_char_boundary(cut) {
                    cut -= 1;
                }
                context.truncate(cut);
                context.push_str("...");
            }
            Pattern {
                id: PatternId::default(),
                medical_domain: "General".to_string(),
                section: section.clone(),
                content_type: ContentType::GeneralInformation,
                bot_question: format!("What information is available about {}?", input.name),
                clinical_context: context,
                expected_patient_responses: Vec::new(),
                red_flags: Vec::new(),
                differentials: Vec::new(),
                priority: Priority::Low,
                tags: Pattern::standard_tags(
                    "General",
                    &section,
                    ContentType::GeneralInformation,
                    Priority::Low,
                    GENERIC_SOURCE,
                ),
                tree_path: format!("Text Files > {} > Section {}", input.name, i + 1),
                source: GENERIC_SOURCE.to_string(),
            }
        })
        .collect()
}

fn title_from_filename(name: &str) -> String {
    let stem = name
        .trim_end_matches(".txt")
        .trim_end_matches(".md")
        .trim_end_matches(".rst");
    stem.split(['_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_pattern_per_long_paragraph() {
        let input = DocumentInput::from_text(
            "general_advice.txt",
            "Short.\n\n\
             This paragraph is comfortably longer than fifty characters and should be kept.\n\n\
             Another paragraph that also clears the minimum length threshold for retention.",
        );
        let patterns = extract_generic(&input);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].content_type, ContentType::GeneralInformation);
        assert_eq!(patterns[0].priority, Priority::Low);
        assert_eq!(patterns[0].section, "General Advice");
        assert!(patterns[0].tree_path.ends_with("Section 1"));
        assert!(patterns[1].tree_path.ends_with("Section 2"));
    }

    #[test]
    fn long_paragraphs_are_capped() {
        let body = "x".repeat(700);
        let input = DocumentInput::from_text("notes.txt", &body);
        let patterns = extract_generic(&input);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].clinical_context.ends_with("..."));
        assert!(patterns[0].clinical_context.len() <= GENERIC_CONTEXT_CAP + 3);
    }
}
