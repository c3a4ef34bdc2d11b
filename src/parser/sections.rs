use tracing::debug;

use super::blocks::Block;
use crate::model::SectionKind;

// Case-sensitive prefixes of the `## ` headers the analysis prompt asks for.
const SECTION_HEADERS: &[(&str, SectionKind)] = &[
    ("Idea Exploration", SectionKind::Exploration),
    ("Pros", SectionKind::Pros),
    ("Objective Flaws", SectionKind::Flaws),
    ("Mitigation Strategies", SectionKind::Mitigations),
    ("Overall Rating", SectionKind::Rating),
];

/// A block tagged with the section (and flaw category) it was read under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLine {
    pub section: SectionKind,
    pub category: Option<String>,
    pub block: Block,
}

/// Scanner state between lines. `section == None` means lines are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentState {
    pub section: Option<SectionKind>,
    pub category: Option<String>,
}

impl SegmentState {
    /// State after reading `block`, plus the tagged line to emit (if any).
    pub fn advance(&self, block: &Block) -> (SegmentState, Option<SectionLine>) {
        match block {
            Block::Heading2(text) => {
                let section = match_header(text);
                if section.is_none() {
                    debug!(header = %text, "unrecognized section header, dropping lines until the next known one");
                }
                let category = match section {
                    Some(SectionKind::Flaws) => None,
                    _ => self.category.clone(),
                };
                (SegmentState { section, category }, None)
            }
            _ => {
                let Some(section) = self.section else {
                    return (self.clone(), None);
                };
                let (next, block) = match block {
                    Block::Category { name, .. } if section == SectionKind::Flaws => {
                        let category = (!name.is_empty()).then(|| name.clone());
                        (
                            SegmentState {
                                section: self.section,
                                category,
                            },
                            block.clone(),
                        )
                    }
                    // Category markers only mean something under the flaws header.
                    Block::Category { line, .. } => (self.clone(), Block::Text(line.clone())),
                    _ => (self.clone(), block.clone()),
                };
                let category = match section {
                    SectionKind::Flaws => next.category.clone(),
                    _ => None,
                };
                (
                    next,
                    Some(SectionLine {
                        section,
                        category,
                        block,
                    }),
                )
            }
        }
    }
}

pub fn match_header(text: &str) -> Option<SectionKind> {
    SECTION_HEADERS
        .iter()
        .find(|(prefix, _)| text.starts_with(prefix))
        .map(|(_, kind)| *kind)
}

/// Left fold over the classified lines, keeping only lines inside a known section.
pub fn segment(blocks: &[Block]) -> Vec<SectionLine> {
    let (_, lines) = blocks.iter().fold(
        (SegmentState::default(), Vec::with_capacity(blocks.len())),
        |(state, mut out), block| {
            let (next, emitted) = state.advance(block);
            out.extend(emitted);
            (next, out)
        },
    );
    lines
}

// ── Tests ──
