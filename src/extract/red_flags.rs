//! Red-flag extraction: the safety-critical bullets under a `RED FLAGS:`
//! header.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::sections::bullet_text;
use super::{SectionContext, SectionExtractor};

#[allow(clippy::unwrap_used)] // hardcoded pattern
pub(crate) static RED_FLAGS_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^RED FLAGS?:").unwrap());

/// Minimum length for a bullet to count as a red flag.
const MIN_FLAG_LEN: usize = 3;

/// Collect the bullet lines under a `RED FLAGS:` header, stopping at the next
/// top-level header or section boundary.
pub(crate) fn collect_red_flags(lines: &[&str]) -> Vec<String> {
    let mut flags = Vec::new();
    let mut in_flags = false;
    for line in lines {
        let t = line.trim();
        if RED_FLAGS_HEADER.is_match(t) {
            in_flags = true;
            continue;
        }
        if !in_flags {
            continue;
        }
        if t.starts_with('=')
            || (t.chars().next().is_some_and(char::is_uppercase)
                && t.contains(':')
                && !t.starts_with('-'))
        {
            break;
        }
        if let Some(flag) = bullet_text(t) {
            if flag.len() > MIN_FLAG_LEN {
                flags.push(flag);
            }
        }
    }
    flags
}

/// Emits one `CRITICAL` pattern per red flag found in the section.
pub struct RedFlagExtractor;

impl SectionExtractor for RedFlagExtractor {
    fn name(&self) -> &'static str {
        "red_flags"
    }

    fn extract(&self, ctx: &SectionContext<'_>) -> Vec<Pattern> {
        ctx.red_flags
            .iter()
            .enumerate()
            .map(|(i, flag)| Pattern {
                id: PatternId::default(),
                medical_domain: ctx.medical_domain.to_string(),
                section: ctx.section.to_string(),
                content_type: ContentType::RedFlag,
                bot_question: format!("URGENT: Check for {}", flag.to_lowercase()),
                clinical_context: format!("RED FLAG for {}: {flag}", ctx.section),
                expected_patient_responses: Vec::new(),
                red_flags: vec![flag.clone()],
                differentials: Vec::new(),
                priority: Priority::Critical,
                tags: Pattern::standard_tags(
                    ctx.medical_domain,
                    ctx.section,
                    ContentType::RedFlag,
                    Priority::Critical,
                    ctx.source,
                ),
                tree_path: format!(
                    "{} > {} > Red Flags > {}",
                    ctx.medical_domain,
                    ctx.section,
                    i + 1
                ),
                source: ctx.source.to_string(),
            })
            .collect()
    }
}
