//! Q/A extraction: paired interview questions and expected patient responses.
//!
//! Markers come in two layouts: `Q:` alone on a line with the question text
//! on following (possibly bulleted) lines, or inline (`Q: onset?`). Answers
//! mirror the same layouts under `A:`/`A.` markers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::clues::CLUES_HEADER;
use super::red_flags::RED_FLAGS_HEADER;
use super::sections::{bullet_text, is_caps_header, strip_quotes};
use super::{SectionContext, SectionExtractor};

#[allow(clippy::unwrap_used)] // hardcoded pattern
pub(crate) static Q_ALONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q\d*[:.]?\s*$").unwrap());
#[allow(clippy::unwrap_used)] // hardcoded pattern
static A_ALONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^A\d*[:.]?\s*$").unwrap());
#[allow(clippy::unwrap_used)] // hardcoded pattern
static Q_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q\d*[:.]\s*").unwrap());
#[allow(clippy::unwrap_used)] // hardcoded pattern
static A_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^A\d*[:.]\s*").unwrap());

fn is_q_inline(line: &str) -> bool {
    (line.starts_with("Q:") || line.starts_with("Q.")) && !Q_ALONE.is_match(line)
}

fn is_a_inline(line: &str) -> bool {
    (line.starts_with("A:") || line.starts_with("A.")) && !A_ALONE.is_match(line)
}

fn is_marker_or_header(line: &str) -> bool {
    Q_ALONE.is_match(line)
        || A_ALONE.is_match(line)
        || is_q_inline(line)
        || is_a_inline(line)
        || is_caps_header(line)
}

/// Walk the section collecting `(question, answers)` pairs. Pairs without
/// answers are dropped.
pub(crate) fn collect_qa_pairs(lines: &[&str]) -> Vec<(String, Vec<String>)> {
    let mut pairs = Vec::new();
    let mut question: Option<String> = None;
    let mut answers: Vec<String> = Vec::new();
    // Bullets under labeled blocks (RED FLAGS:, CLUES:, COMMON:, ...) are not
    // answer continuations.
    let mut suppress_continuation = false;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();

        if Q_ALONE.is_match(line) {
            flush(&mut pairs, &mut question, &mut answers);
            let mut parts: Vec<String> = Vec::new();
            while i + 1 < lines.len() {
                let next = lines[i + 1].trim();
                if next.is_empty() || is_marker_or_header(next) {
                    break;
                }
                if let Some(body) = bullet_text(next) {
                    parts.push(body);
                    i += 1;
                } else if parts.is_empty() {
                    // Unbulleted question text on the line right after the marker.
                    parts.push(strip_quotes(next).to_string());
                    i += 1;
                    break;
                } else {
                    break;
                }
            }
            question = (!parts.is_empty()).then(|| parts.join(" "));
            suppress_continuation = false;
        } else if is_q_inline(line) {
            flush(&mut pairs, &mut question, &mut answers);
            let text = strip_quotes(Q_PREFIX.replace(line, "").trim()).to_string();
            question = (!text.is_empty()).then_some(text);
            suppress_continuation = false;
        } else if A_ALONE.is_match(line) {
            while i + 1 < lines.len() {
                let Some(body) = bullet_text(lines[i + 1].trim()) else {
                    break;
                };
                if !body.is_empty() {
                    answers.push(body);
                }
                i += 1;
            }
            suppress_continuation = false;
        } else if is_a_inline(line) {
            let text = strip_quotes(A_PREFIX.replace(line, "").trim()).to_string();
            if !text.is_empty() {
                answers.push(text);
            }
            suppress_continuation = false;
        } else if RED_FLAGS_HEADER.is_match(line)
            || CLUES_HEADER.is_match(line)
            || is_caps_header(line)
        {
            suppress_continuation = true;
        } else if let Some(body) = bullet_text(line) {
            if question.is_some() && !suppress_continuation && !body.is_empty() && !body.contains('?')
            {
                answers.push(body);
            }
        }
        i += 1;
    }

    flush(&mut pairs, &mut question, &mut answers);
    pairs
}

fn flush(
    pairs: &mut Vec<(String, Vec<String>)>,
    question: &mut Option<String>,
    answers: &mut Vec<String>,
) {
    if let Some(q) = question.take() {
        if !answers.is_empty() {
            pairs.push((q, std::mem::take(answers)));
        }
    }
    answers.clear();
}

/// Emits one `interview_question` pattern per Q/A pair.
pub struct QuestionExtractor;

impl SectionExtractor for QuestionExtractor {
    fn name(&self) -> &'static str {
        "questions"
    }

    fn extract(&self, ctx: &SectionContext<'_>) -> Vec<Pattern> {
        collect_qa_pairs(ctx.lines)
            .into_iter()
            .enumerate()
            .map(|(i, (question, responses))| Pattern {
                id: PatternId::default(),
                medical_domain: ctx.medical_domain.to_string(),
                section: ctx.section.to_string(),
                content_type: ContentType::InterviewQuestion,
                bot_question: question,
                clinical_context: format!(
                    "Interview question for {} in {}",
                    ctx.section, ctx.medical_domain
                ),
                expected_patient_responses: responses,
                red_flags: ctx.red_flags.to_vec(),
                differentials: Vec::new(),
                priority: Priority::Normal,
                tags: Pattern::standard_tags(
                    ctx.medical_domain,
                    ctx.section,
                    ContentType::InterviewQuestion,
                    Priority::Normal,
                    ctx.source,
                ),
                tree_path: format!(
                    "{} > {} > Interview Questions > {}",
                    ctx.medical_domain,
                    ctx.section,
                    i + 1
                ),
                source: ctx.source.to_string(),
            })
            .collect()
    }
}
