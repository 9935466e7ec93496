//! Differential extraction: condition names grouped under ALL-CAPS headers.

use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::sections::{bullet_text, is_caps_header};
use super::{SectionContext, SectionExtractor};

/// Bullets longer than this read as descriptions, not condition names.
const MAX_CONDITION_LEN: usize = 100;
const MIN_CONDITION_LEN: usize = 3;

/// Words marking a bullet as a question rather than a condition name.
const QUESTION_WORDS: &[&str] = &["how", "what", "when", "where", "why", "do you", "have you"];

/// Words marking a bullet as a symptom description rather than a condition.
const SYMPTOM_WORDS: &[&str] = &["pain", "fever", "severe", "sudden", "worse"];

/// Group condition bullets under their ALL-CAPS subsection headers, skipping
/// the red-flag header and anything that does not read as a condition name.
pub(crate) fn collect_differential_groups(lines: &[&str]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for line in lines {
        let t = line.trim();
        if is_caps_header(t) && !t.to_uppercase().contains("RED FLAG") {
            let name = t.trim_end_matches(':').trim().to_string();
            groups.push((name, Vec::new()));
        } else if let Some((_, items)) = groups.last_mut() {
            if let Some(body) = bullet_text(t) {
                if is_condition_name(&body) {
                    items.push(body);
                }
            }
        }
    }
    groups.retain(|(_, items)| !items.is_empty());
    groups
}

fn is_condition_name(text: &str) -> bool {
    if text.len() <= MIN_CONDITION_LEN || text.len() > MAX_CONDITION_LEN {
        return false;
    }
    if text.contains('?') {
        return false;
    }
    let lower = text.to_lowercase();
    if QUESTION_WORDS.iter().any(|w| lower.contains(w)) {
        return false;
    }
    !SYMPTOM_WORDS.iter().any(|w| lower.contains(w))
}

/// Emits one `HIGH` pattern per named differential group.
pub struct DifferentialExtractor;

impl SectionExtractor for DifferentialExtractor {
    fn name(&self) -> &'static str {
        "differentials"
    }

    fn extract(&self, ctx: &SectionContext<'_>) -> Vec<Pattern> {
        collect_differential_groups(ctx.lines)
            .into_iter()
            .map(|(group, conditions)| Pattern {
                id: PatternId::default(),
                medical_domain: ctx.medical_domain.to_string(),
                section: ctx.section.to_string(),
                content_type: ContentType::Differential,
                bot_question: format!("What conditions should be considered for {group}?"),
                clinical_context: format!(
                    "Clinical differentials for {group}: {}",
                    conditions.join(", ")
                ),
                expected_patient_responses: Vec::new(),
                red_flags: ctx.red_flags.to_vec(),
                differentials: conditions,
                priority: Priority::High,
                tags: Pattern::standard_tags(
                    ctx.medical_domain,
                    ctx.section,
                    ContentType::Differential,
                    Priority::High,
                    ctx.source,
                ),
                tree_path: format!(
                    "{} > {} > Differentials > {group}",
                    ctx.medical_domain, ctx.section
                ),
                source: ctx.source.to_string(),
            })
            .collect()
    }
}
