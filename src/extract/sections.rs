//! Section splitting and shared line heuristics for clinical documents.
//!
//! Documents are divided by `===` delimiter lines into titled sections.
//! Front-matter sections (table of contents, overview) are discarded before
//! any pattern extraction runs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Substring markers identifying front-matter sections to discard.
const FRONT_MATTER_MARKERS: &[&str] =
    &["TABLE OF CONTENTS", "OVERVIEW", "CLUSTERS", "FULL VERSION"];

/// Blocks shorter than this are noise, not sections.
const MIN_SECTION_LEN: usize = 20;

/// Decorations stripped from file names when deriving the medical domain.
const DOMAIN_SUFFIXES: &[&str] = &["_Master", "_FULL", "_DeepDive", "_Handbook", "_Reference"];

#[allow(clippy::unwrap_used)] // hardcoded pattern
static SECTION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^SECTION\s+\d+\s*[—-]\s*").unwrap());

#[allow(clippy::unwrap_used)] // hardcoded pattern
static CAPS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s()/&-]+:").unwrap());

/// One titled section carved out of a document.
#[derive(Debug, Clone)]
pub struct DocumentSection {
    pub title: String,
    pub content: String,
}

/// Split raw document text into sections on `===` delimiter lines,
/// discarding front matter and undersized blocks.
#[must_use]
pub fn split_sections(text: &str) -> Vec<DocumentSection> {
    let mut blocks: Vec<Vec<&str>> = vec![Vec::new()];
    for line in text.lines() {
        if is_delimiter(line) {
            blocks.push(Vec::new());
        } else if let Some(block) = blocks.last_mut() {
            block.push(line);
        }
    }

    let mut sections = Vec::new();
    for block in blocks {
        let trimmed: Vec<&str> = block
            .iter()
            .skip_while(|l| l.trim().is_empty())
            .copied()
            .collect();
        let Some((first, rest)) = trimmed.split_first() else {
            continue;
        };
        if trimmed.iter().map(|l| l.len()).sum::<usize>() < MIN_SECTION_LEN {
            continue;
        }

        let raw_title = first.trim();
        let upper = raw_title.to_uppercase();
        if FRONT_MATTER_MARKERS.iter().any(|m| upper.contains(m)) {
            continue;
        }
        let title = SECTION_PREFIX.replace(raw_title, "").trim().to_string();

        sections.push(DocumentSection {
            title,
            content: rest.join("\n"),
        });
    }
    sections
}

/// Derive the medical domain from a document file name: strip the extension,
/// then peel known decorations off the end.
#[must_use]
pub fn domain_from_filename(name: &str) -> String {
    let stem = name
        .rsplit('/')
        .next()
        .unwrap_or(name)
        .trim_end_matches(".txt")
        .trim_end_matches(".md")
        .trim_end_matches(".rst");
    let mut domain = stem;
    loop {
        let before = domain;
        for suffix in DOMAIN_SUFFIXES {
            domain = domain.trim_end_matches(suffix);
        }
        if domain == before {
            break;
        }
    }
    if domain.is_empty() {
        stem.to_string()
    } else {
        domain.to_string()
    }
}

fn is_delimiter(line: &str) -> bool {
    let t = line.trim();
    t.len() >= 3 && t.bytes().all(|b| b == b'=')
}

/// True for ALL-CAPS header lines ending in `:` (e.g. `COMMON CAUSES:`).
pub(crate) fn is_caps_header(line: &str) -> bool {
    CAPS_HEADER.is_match(line)
}

/// Strip a leading bullet marker, returning the bullet body.
pub(crate) fn bullet_text(line: &str) -> Option<String> {
    line.strip_prefix('-')
        .map(|rest| rest.trim().trim_matches('"').to_string())
}

pub(crate) fn strip_quotes(text: &str) -> &str {
    text.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_delimiter_lines_and_drops_front_matter() {
        let text = "TABLE OF CONTENTS\nchest pain ... page 2\n\
                    ===\n\
                    SECTION 1 — Chest Pain\nSome content about chest pain here.\n\
                    ===\n\
                    Palpitations\nContent about palpitations, long enough to keep.";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Chest Pain");
        assert_eq!(sections[1].title, "Palpitations");
    }

    #[test]
    fn drops_undersized_blocks() {
        let sections = split_sections("===\nhi\n===\n");
        assert!(sections.is_empty());
    }

    #[test]
    fn domain_strips_known_decorations() {
        assert_eq!(domain_from_filename("Cardiac_Master.txt"), "Cardiac");
        assert_eq!(domain_from_filename("AbdominalPain_DeepDive_FULL.txt"), "AbdominalPain");
        assert_eq!(domain_from_filename("Respiratory.md"), "Respiratory");
    }

    #[test]
    fn caps_header_detection() {
        assert!(is_caps_header("COMMON CAUSES:"));
        assert!(is_caps_header("RED FLAGS:"));
        assert!(!is_caps_header("Onset and duration:"));
        assert!(!is_caps_header("- bullet"));
        // single-letter markers are Q/A territory, not group headers
        assert!(!is_caps_header("Q:"));
        assert!(!is_caps_header("A:"));
    }
}
