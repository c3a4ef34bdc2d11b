pub mod blocks;
pub mod extract;
pub mod sections;

use chrono::{DateTime, Utc};

use crate::model::AnalysisDocument;
use extract::DocumentBuilder;

/// Three-pass pipeline: raw text → blocks → tagged section lines → document.
///
/// Pure: the same inputs always yield an equal document.
pub fn parse_analysis(
    idea_summary: &str,
    raw: &str,
    timestamp: DateTime<Utc>,
) -> AnalysisDocument {
    let blocks = blocks::classify_lines(raw);
    let mut builder = DocumentBuilder::default();
    for line in sections::segment(&blocks) {
        builder.push(&line);
    }
    builder.finish(idea_summary, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, SectionKind, Severity};

    fn at() -> DateTime<Utc> {
        "2026-10-19T12:00:00Z".parse().unwrap()
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.md", name)).unwrap()
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = fixture("smart_fridge");
        assert_eq!(
            parse_analysis("Smart fridge", &raw, at()),
            parse_analysis("Smart fridge", &raw, at())
        );
    }

    #[test]
    fn smart_fridge_document() {
        let doc = parse_analysis("Smart fridge", &fixture("smart_fridge"), at());
        assert!(doc.defaulted.is_empty());
        assert_eq!(doc.pros[0], Item::new("Saves Time", "automates shopping"));
        assert_eq!(doc.flaws.len(), 1);
        assert_eq!(doc.flaws[0].name, None);
        let spoilage = &doc.flaws[0].items[0];
        assert_eq!(spoilage.title, "Spoilage Risk");
        assert_eq!(spoilage.description, "food may rot");
        assert_eq!(spoilage.severity, Severity::High);
        assert_eq!(doc.flaws[0].items[1].severity, Severity::Medium);
        assert_eq!(doc.mitigations.len(), 1);
        assert!(doc.rating.starts_with("Rating: 6/10"));
        assert_eq!(doc.exploration.lines().len(), 1);
    }

    #[test]
    fn unknown_header_lines_never_reach_the_document() {
        let raw = "## Pros:\n- **Kept** - yes\n## Secret Section\n- **Hidden** - no\nRating: 1/10\n";
        let doc = parse_analysis("x", raw, at());
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("Hidden"));
        assert!(doc.is_defaulted(SectionKind::Rating));
        assert_eq!(doc.pros.len(), 1);
    }

    #[test]
    fn whitespace_only_input_degrades_to_placeholders() {
        let doc = parse_analysis("x", "  \n\t\n", at());
        assert_eq!(doc.defaulted.len(), 5);
    }

    #[test]
    fn document_serializes_with_iso_timestamp() {
        let doc = parse_analysis("x", "", at());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["timestamp"], "2026-10-19T12:00:00Z");
        assert_eq!(value["flaws"][0]["items"][0]["severity"], "medium");
    }
}
