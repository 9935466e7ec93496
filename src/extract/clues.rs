//! Clinical-clue extraction: symptom patterns grouped per condition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::questions::Q_ALONE;
use super::red_flags::RED_FLAGS_HEADER;
use super::sections::{bullet_text, is_caps_header};
use super::{SectionContext, SectionExtractor};

#[allow(clippy::unwrap_used)] // hardcoded pattern
pub(crate) static CLUES_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^CLUES?:").unwrap());

/// Clue bullets longer than this read as narrative, not clues.
const MAX_CLUE_LEN: usize = 150;
const MIN_CLUE_LEN: usize = 3;

/// Group clue bullets under a `CLUES:` header (as "General") or under
/// ALL-CAPS condition headers, stopping at the red-flag or Q/A boundary.
pub(crate) fn collect_clue_groups(lines: &[&str]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut collecting = false;
    for line in lines {
        let t = line.trim();
        if RED_FLAGS_HEADER.is_match(t) || Q_ALONE.is_match(t) || t.starts_with("Q:") || t.starts_with("Q.") {
            break;
        }
        if CLUES_HEADER.is_match(t) {
            groups.push(("General".to_string(), Vec::new()));
            collecting = true;
            continue;
        }
        if is_caps_header(t) && !t.to_uppercase().contains("RED FLAG") {
            groups.push((t.trim_end_matches(':').trim().to_string(), Vec::new()));
            collecting = true;
            continue;
        }
        if collecting {
            if let Some((_, clues)) = groups.last_mut() {
                if let Some(body) = bullet_text(t) {
                    if is_clue(&body) {
                        clues.push(body);
                    }
                }
            }
        }
    }
    groups.retain(|(_, clues)| !clues.is_empty());
    groups
}

fn is_clue(text: &str) -> bool {
    text.len() > MIN_CLUE_LEN && text.len() < MAX_CLUE_LEN && !text.contains('?')
}

/// Emits one `clinical_clue` pattern per condition group.
pub struct ClueExtractor;

impl SectionExtractor for ClueExtractor {
    fn name(&self) -> &'static str {
        "clinical_clues"
    }

    fn extract(&self, ctx: &SectionContext<'_>) -> Vec<Pattern> {
        collect_clue_groups(ctx.lines)
            .into_iter()
            .map(|(condition, clues)| Pattern {
                id: PatternId::default(),
                medical_domain: ctx.medical_domain.to_string(),
                section: ctx.section.to_string(),
                content_type: ContentType::ClinicalClue,
                bot_question: format!("What clinical clues suggest {condition}?"),
                clinical_context: format!(
                    "Clinical clues for {condition}: {}",
                    clues.join(", ")
                ),
                expected_patient_responses: clues,
                red_flags: ctx.red_flags.to_vec(),
                differentials: Vec::new(),
                priority: Priority::Normal,
                tags: Pattern::standard_tags(
                    ctx.medical_domain,
                    ctx.section,
                    ContentType::ClinicalClue,
                    Priority::Normal,
                    ctx.source,
                ),
                tree_path: format!(
                    "{} > {} > Clinical Clues > {condition}",
                    ctx.medical_domain, ctx.section
                ),
                source: ctx.source.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clues_header_opens_general_group() {
        let lines = vec!["CLUES:", "- worse on exertion", "- relieved by rest"];
        let groups = collect_clue_groups(&lines);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "General");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn condition_headers_open_named_groups_and_stop_at_red_flags() {
        let lines = vec![
            "ANGINA:",
            "- pressure with exertion",
            "PERICARDITIS:",
            "- sharp, better leaning forward",
            "RED FLAGS:",
            "- tearing pain",
        ];
        let groups = collect_clue_groups(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "ANGINA");
        assert_eq!(groups[1].0, "PERICARDITIS");
    }

    #[test]
    fn question_bullets_are_excluded() {
        let lines = vec!["CLUES:", "- does it radiate?", "- radiates to jaw"];
        let groups = collect_clue_groups(&lines);
        assert_eq!(groups[0].1, vec!["radiates to jaw"]);
    }
}
