//! Legacy structured-handbook parser.
//!
//! The older handbook format is a flat paragraph stream: framework headers
//! name the clinical system, symptom and category headers scope what follows,
//! and `Q:`/`Possible Answers:` blocks carry the content. Only
//! `interview_question` patterns come out of this format.

use crate::types::{ContentType, Pattern, PatternId, Priority};

use super::DocumentInput;

pub(crate) const LEGACY_SOURCE: &str = "legacy_handbook";

/// Category headers recognized inside a symptom block.
const CATEGORIES: &[&str] = &[
    "Chief Complaint",
    "Onset/Duration",
    "Quality/Severity",
    "Aggravating/Relieving",
    "Associated Symptoms",
    "Red Flags",
    "ROS",
    "Context",
];

/// Lines containing any of these are boilerplate, not content.
const EXCLUDE_MARKERS: &[&str] = &["Table of Contents", "Handbook", "comprehensive", "[page]"];

const FRAMEWORK_MARKER: &str = "History Framework";

struct LegacyState {
    system: Option<String>,
    symptom: Option<String>,
    category: Option<String>,
    question: Option<String>,
    answers: Vec<String>,
    patterns: Vec<Pattern>,
}

impl LegacyState {
    fn flush(&mut self) {
        let Some(question) = self.question.take() else {
            self.answers.clear();
            return;
        };
        let Some(system) = self.system.clone() else {
            self.answers.clear();
            return;
        };
        let symptom = self.symptom.clone().unwrap_or_else(|| "General".to_string());
        let category = self.category.clone().unwrap_or_else(|| "General".to_string());
        let priority = if category == "Red Flags" {
            Priority::High
        } else {
            Priority::Normal
        };
        let tree_path: Vec<&str> = [
            Some(system.as_str()),
            self.symptom.as_deref(),
            self.category.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        self.patterns.push(Pattern {
            id: PatternId::default(),
            medical_domain: system.clone(),
            section: symptom.clone(),
            content_type: ContentType::InterviewQuestion,
            bot_question: question,
            clinical_context: format!("{system} - {symptom} - {category}"),
            expected_patient_responses: std::mem::take(&mut self.answers),
            red_flags: Vec::new(),
            differentials: Vec::new(),
            priority,
            tags: Pattern::standard_tags(
                &system,
                &symptom,
                ContentType::InterviewQuestion,
                priority,
                LEGACY_SOURCE,
            ),
            tree_path: tree_path.join(" > "),
            source: LEGACY_SOURCE.to_string(),
        });
    }
}

/// Parse a legacy handbook document into interview-question patterns.
pub(crate) fn extract_legacy(input: &DocumentInput) -> Vec<Pattern> {
    let mut state = LegacyState {
        system: None,
        symptom: None,
        category: None,
        question: None,
        answers: Vec::new(),
        patterns: Vec::new(),
    };

    for raw in input.text.lines() {
        let line = raw.trim();
        if line.is_empty() || EXCLUDE_MARKERS.iter().any(|m| line.contains(m)) {
            continue;
        }

        if line.contains(FRAMEWORK_MARKER) {
            state.flush();
            let name = line
                .replace(FRAMEWORK_MARKER, "")
                .trim_matches(|c: char| c.is_whitespace() || c == '—' || c == '-' || c == ':')
                .to_string();
            if !name.is_empty() {
                state.system = Some(name);
                state.symptom = None;
                state.category = None;
            }
        } else if CATEGORIES.contains(&line) {
            state.flush();
            state.category = Some(line.to_string());
        } else if line.starts_with("Q:") || line.starts_with("Q.") {
            state.flush();
            let question = line[2..].trim().to_string();
            state.question = (!question.is_empty()).then_some(question);
        } else if line.starts_with("Possible Answers:") || line.starts_with("Possible answers:") {
            state.answers.clear();
        } else if let Some(answer) = line.strip_prefix('-') {
            if state.question.is_some() {
                let answer = answer.trim();
                if !answer.is_empty() {
                    state.answers.push(answer.to_string());
                }
            }
        } else if state.system.is_some()
            && line.len() < 100
            && !line.starts_with("Possible")
            && !line.contains("System")
            && line != "Wrap-up"
        {
            // Anything else short under a framework is a symptom header.
            state.flush();
            state.symptom = Some(line.to_string());
            state.category = None;
        }
    }
    state.flush();
    state.patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_framework_symptom_category_question_blocks() {
        let input = DocumentInput::from_text(
            "handbook.txt",
            "Cardiac History Framework\n\
             Chest Pain\n\
             Onset/Duration\n\
             Q: When did the pain start?\n\
             Possible Answers:\n\
             - today\n\
             - last week\n\
             Red Flags\n\
             Q: Any fainting?\n\
             - yes\n\
             - no\n",
        );
        let patterns = extract_legacy(&input);
        assert_eq!(patterns.len(), 2);

        assert_eq!(patterns[0].medical_domain, "Cardiac");
        assert_eq!(patterns[0].section, "Chest Pain");
        assert_eq!(patterns[0].bot_question, "When did the pain start?");
        assert_eq!(patterns[0].expected_patient_responses, vec!["today", "last week"]);
        assert_eq!(patterns[0].priority, Priority::Normal);
        assert_eq!(patterns[0].tree_path, "Cardiac > Chest Pain > Onset/Duration");

        assert_eq!(patterns[1].priority, Priority::High);
        assert_eq!(patterns[1].content_type, ContentType::InterviewQuestion);
    }

    #[test]
    fn questions_outside_a_framework_are_dropped() {
        let input = DocumentInput::from_text("handbook.txt", "Q: Orphan question?\n- yes\n");
        assert!(extract_legacy(&input).is_empty());
    }
}
