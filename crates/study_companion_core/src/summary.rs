//! crates/study_companion_core/src/summary.rs
//!
//! Best-effort splitting of a markdown summary into titled sections for display.

use crate::domain::SummarySection;
use regex::Regex;
use std::sync::OnceLock;

fn heading_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"(?m)^##[ \t]+").expect("heading regex is valid"))
}

/// Splits `text` at `## ` headings. Each chunk's first line is the title and the
/// rest is the body; chunks missing either are dropped.
///
/// When the text has no headings, or no chunk survives, the whole text is
/// returned as one section with an empty title. Blank text yields no sections.
pub fn parse_sections(text: &str) -> Vec<SummarySection> {
    let sections: Vec<SummarySection> = heading_marker()
        .split(text)
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(|chunk| {
            let (title, content) = chunk.split_once('\n').unwrap_or((chunk, ""));
            let title = title.trim();
            let content = content.trim();
            (!title.is_empty() && !content.is_empty()).then(|| SummarySection {
                title: title.to_string(),
                content: content.to_string(),
            })
        })
        .collect();

    if !sections.is_empty() && heading_marker().is_match(text) {
        return sections;
    }

    let whole = text.trim();
    if whole.is_empty() {
        Vec::new()
    } else {
        vec![SummarySection {
            title: String::new(),
            content: whole.to_string(),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, content: &str) -> SummarySection {
        SummarySection {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn splits_on_second_level_headings() {
        let parsed = parse_sections("## Intro\nFoo\n## Methods\nBar");
        assert_eq!(parsed, vec![section("Intro", "Foo"), section("Methods", "Bar")]);
    }

    #[test]
    fn drops_sections_without_body() {
        let parsed = parse_sections("## Empty\n\n## Results\n- **up** 3%\n- down\n");
        assert_eq!(parsed, vec![section("Results", "- **up** 3%\n- down")]);
    }

    #[test]
    fn deeper_headings_stay_inside_the_body() {
        let parsed = parse_sections("## Intro\n### Detail\ntext");
        assert_eq!(parsed, vec![section("Intro", "### Detail\ntext")]);
    }

    #[test]
    fn text_without_headings_falls_back_to_one_block() {
        let parsed = parse_sections("Just a paragraph.\nAnd another line.");
        assert_eq!(
            parsed,
            vec![section("", "Just a paragraph.\nAnd another line.")]
        );
    }

    #[test]
    fn headings_with_nothing_usable_fall_back_to_one_block() {
        let parsed = parse_sections("## Only a title");
        assert_eq!(parsed, vec![section("", "## Only a title")]);
    }

    #[test]
    fn blank_text_has_no_sections() {
        assert!(parse_sections("  \n ").is_empty());
    }
}
