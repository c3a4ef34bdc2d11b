pub mod detail;
pub mod items;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::blocks::Block;
use super::sections::SectionLine;
use crate::model::{
    AnalysisDocument, Exploration, FlawCategory, FlawItem, Item, SectionKind, Severity,
};

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+/10").unwrap());

pub const NO_EXPLORATION: &str = "No exploration data provided.";
pub const NO_PROS: &str = "No pros identified.";
pub const NO_FLAWS: &str = "No flaws identified.";
pub const NO_MITIGATIONS: &str = "No specific mitigation strategies provided.";
pub const NO_RATING: &str = "No rating provided.";

/// Accumulates tagged lines into an [`AnalysisDocument`] in one pass.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    exploration: Exploration,
    pros: Vec<Item>,
    uncategorized: Vec<FlawItem>,
    categories: Vec<FlawCategory>,
    mitigations: Vec<Item>,
    rating: Vec<String>,
}

impl DocumentBuilder {
    pub fn push(&mut self, line: &SectionLine) {
        match line.section {
            SectionKind::Exploration => self.push_exploration(&line.block),
            SectionKind::Pros => {
                if let Some(text) = bullet_text(&line.block) {
                    self.pros.push(items::parse_item(text));
                }
            }
            SectionKind::Mitigations => {
                if let Some(text) = bullet_text(&line.block) {
                    self.mitigations.push(items::parse_item(text));
                }
            }
            SectionKind::Flaws => self.push_flaw(line.category.as_deref(), &line.block),
            SectionKind::Rating => {
                if let Block::Text(text) = &line.block {
                    if is_rating_statement(text) {
                        self.rating.push(text.clone());
                    }
                }
            }
        }
    }

    fn push_exploration(&mut self, block: &Block) {
        let text = match block {
            Block::Empty => return,
            Block::Text(t) => t.clone(),
            other => other.source(),
        };
        if self.exploration.is_empty() && text.contains(" - ") {
            let (title, description) = items::split_title(&text);
            self.exploration = Exploration::Titled {
                title,
                description,
                lines: Vec::new(),
            };
            return;
        }
        match &mut self.exploration {
            Exploration::Titled { lines, .. } | Exploration::Raw { lines } => lines.push(text),
        }
    }

    fn push_flaw(&mut self, category: Option<&str>, block: &Block) {
        match block {
            Block::Category { .. } => {
                if let Some(name) = category {
                    self.category_mut(name);
                }
            }
            Block::Bullet { text, .. } if !text.is_empty() => {
                let item = items::parse_flaw(text);
                match category {
                    Some(name) => self.category_mut(name).items.push(item),
                    None => self.uncategorized.push(item),
                }
            }
            _ => {}
        }
    }

    /// Open a named category, or reopen it if the name was seen before.
    fn category_mut(&mut self, name: &str) -> &mut FlawCategory {
        let idx = match self.categories.iter().position(|c| c.name.as_deref() == Some(name)) {
            Some(idx) => idx,
            None => {
                self.categories.push(FlawCategory {
                    name: Some(name.to_string()),
                    items: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        &mut self.categories[idx]
    }

    /// Close the document, filling empty sections with placeholders.
    pub fn finish(self, idea_summary: &str, timestamp: DateTime<Utc>) -> AnalysisDocument {
        let mut defaulted = Vec::new();

        let exploration = if self.exploration.is_empty() {
            defaulted.push(SectionKind::Exploration);
            Exploration::Titled {
                title: "Exploration".into(),
                description: NO_EXPLORATION.into(),
                lines: Vec::new(),
            }
        } else {
            self.exploration
        };

        let pros = if self.pros.is_empty() {
            defaulted.push(SectionKind::Pros);
            vec![Item::new("Pros", NO_PROS)]
        } else {
            self.pros
        };

        let flaw_count =
            self.uncategorized.len() + self.categories.iter().map(|c| c.items.len()).sum::<usize>();
        let flaws = if flaw_count == 0 {
            defaulted.push(SectionKind::Flaws);
            vec![FlawCategory {
                name: None,
                items: vec![FlawItem {
                    title: "Flaws".into(),
                    description: NO_FLAWS.into(),
                    severity: Severity::Medium,
                }],
            }]
        } else {
            // Uncategorized flaws render ahead of the named groups.
            let mut flaws = Vec::with_capacity(self.categories.len() + 1);
            if !self.uncategorized.is_empty() {
                flaws.push(FlawCategory {
                    name: None,
                    items: self.uncategorized,
                });
            }
            flaws.extend(self.categories);
            flaws
        };

        let mitigations = if self.mitigations.is_empty() {
            defaulted.push(SectionKind::Mitigations);
            vec![Item::new("Mitigations", NO_MITIGATIONS)]
        } else {
            self.mitigations
        };

        let rating = if self.rating.is_empty() {
            defaulted.push(SectionKind::Rating);
            NO_RATING.to_string()
        } else {
            self.rating.join(" ")
        };

        AnalysisDocument {
            idea_summary: idea_summary.to_string(),
            exploration,
            pros,
            flaws,
            mitigations,
            rating,
            timestamp,
            defaulted,
        }
    }
}

fn bullet_text(block: &Block) -> Option<&str> {
    match block {
        Block::Bullet { text, .. } if !text.is_empty() => Some(text),
        _ => None,
    }
}

pub fn is_rating_statement(line: &str) -> bool {
    line.to_lowercase().contains("rating:") || SCORE_RE.is_match(line)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::classify_lines;
    use crate::parser::sections::segment;

    fn build(md: &str) -> AnalysisDocument {
        let mut builder = DocumentBuilder::default();
        for line in segment(&classify_lines(md)) {
            builder.push(&line);
        }
        builder.finish("idea", DateTime::<Utc>::UNIX_EPOCH)
    }

    #[test]
    fn empty_input_is_all_placeholders() {
        let doc = build("");
        assert_eq!(doc.defaulted, SectionKind::ALL.to_vec());
        assert_eq!(doc.pros, vec![Item::new("Pros", NO_PROS)]);
        assert_eq!(doc.rating, NO_RATING);
        assert_eq!(doc.flaws.len(), 1);
        assert_eq!(doc.flaws[0].items[0].description, NO_FLAWS);
    }

    #[test]
    fn pros_header_without_bullets_gets_one_placeholder() {
        let doc = build("## Pros:\n");
        assert_eq!(doc.pros.len(), 1);
        assert_eq!(doc.pros[0].description, NO_PROS);
        assert!(doc.is_defaulted(SectionKind::Pros));
    }

    #[test]
    fn stray_prose_in_pros_is_ignored() {
        let doc = build("## Pros:\nSome intro.\n- **A** - a\n");
        assert_eq!(doc.pros, vec![Item::new("A", "a")]);
    }

    #[test]
    fn exploration_titled_then_extra_lines() {
        let doc = build("## Idea Exploration:\n**Core** - It does things.\n\nMore context here.\n");
        match &doc.exploration {
            Exploration::Titled { title, description, lines } => {
                assert_eq!(title, "Core");
                assert_eq!(description, "It does things.");
                assert_eq!(lines, &vec!["More context here.".to_string()]);
            }
            other => panic!("expected titled exploration, got {:?}", other),
        }
    }

    #[test]
    fn exploration_without_delimiter_stays_raw() {
        let doc = build("## Idea Exploration:\nFirst line.\nSecond - with dash.\n");
        assert_eq!(
            doc.exploration,
            Exploration::Raw {
                lines: vec!["First line.".into(), "Second - with dash.".into()]
            }
        );
    }

    #[test]
    fn exploration_bullets_keep_their_spacing() {
        let doc = build("## Idea Exploration:\nIntro line.\n-   indented   item\n");
        assert_eq!(
            doc.exploration.lines(),
            &["Intro line.".to_string(), "-   indented   item".to_string()]
        );
    }

    #[test]
    fn rating_lines_are_space_joined() {
        let doc = build("## Overall Rating (out of 10):\nJustification intro\nRating: 7/10 - Solid.\n8/10 on reflection\n");
        assert_eq!(doc.rating, "Rating: 7/10 - Solid. 8/10 on reflection");
    }

    #[test]
    fn uncategorized_flaws_come_first() {
        let md = "## Objective Flaws:\n- **Loose** - l\n### Category: Technical\n- **T** - t (Severity: Low)\n";
        let doc = build(md);
        assert_eq!(doc.flaws.len(), 2);
        assert_eq!(doc.flaws[0].name, None);
        assert_eq!(doc.flaws[1].name.as_deref(), Some("Technical"));
    }

    #[test]
    fn reopened_category_appends() {
        let md = "## Objective Flaws:\n### Category: A\n- x\n### Category: B\n- y\n### Category: A\n- z\n";
        let doc = build(md);
        assert_eq!(doc.flaws.len(), 2);
        assert_eq!(doc.flaws[0].items.len(), 2);
        assert_eq!(doc.flaws[1].items.len(), 1);
    }

    #[test]
    fn category_fixture_groups_in_order() {
        let md = std::fs::read_to_string("tests/fixtures/categorized_flaws.md").unwrap();
        let doc = build(&md);
        let shape: Vec<(Option<&str>, usize)> = doc
            .flaws
            .iter()
            .map(|c| (c.name.as_deref(), c.items.len()))
            .collect();
        assert_eq!(shape, vec![(Some("Technical"), 2), (Some("Market"), 1)]);
        assert_eq!(doc.flaws[0].items[1].severity, Severity::High);
    }

    #[test]
    fn rating_checker() {
        assert!(is_rating_statement("**Rating:** 6/10"));
        assert!(is_rating_statement("9/10 would build"));
        assert!(!is_rating_statement("Out of 10, a 9"));
    }
}
