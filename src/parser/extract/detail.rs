use serde::{Deserialize, Serialize};

use crate::parser::blocks::{classify_line, Block};

const EXPLANATION_MARKER: &str = "### In-Depth Flaw Explanation:";
const MITIGATIONS_MARKER: &str = "### Targeted Mitigation Strategies:";

/// Parsed response to a per-flaw "details & mitigations" request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlawDetail {
    pub explanation: Vec<String>,
    /// `None` when the mitigations marker never appeared.
    pub mitigations: Option<Vec<DetailMitigation>>,
    /// Mitigation-section prose seen before the first bullet.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailMitigation {
    pub title: Option<String>,
    pub text: String,
    pub continuation: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailSection {
    Explanation,
    Mitigations,
}

pub fn parse_detail(text: &str) -> FlawDetail {
    let mut detail = FlawDetail::default();
    let mut current: Option<DetailSection> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.starts_with(EXPLANATION_MARKER) {
            current = Some(DetailSection::Explanation);
            continue;
        }
        if line.starts_with(MITIGATIONS_MARKER) {
            current = Some(DetailSection::Mitigations);
            detail.mitigations.get_or_insert_with(Vec::new);
            continue;
        }
        if line.is_empty() || is_rule(line) {
            continue;
        }

        match current {
            Some(DetailSection::Explanation) => detail.explanation.push(line.to_string()),
            Some(DetailSection::Mitigations) => {
                let list = detail.mitigations.get_or_insert_with(Vec::new);
                match classify_line(line) {
                    Block::Bullet { marker: '-', text, .. } => list.push(parse_mitigation(&text)),
                    _ => match list.last_mut() {
                        Some(last) => last.continuation.push(line.to_string()),
                        None => detail.notes.push(line.to_string()),
                    },
                }
            }
            None => {}
        }
    }

    detail
}

/// `**Strategy Title:** explanation`, falling back to plain text.
fn parse_mitigation(text: &str) -> DetailMitigation {
    if text.starts_with("**") {
        if let Some(idx) = text.find(':').filter(|&i| i > 0) {
            let title = text[..idx].replace("**", "").trim().to_string();
            let rest = text[idx + 1..].trim();
            let rest = rest.strip_prefix("**").unwrap_or(rest).trim();
            return DetailMitigation {
                title: Some(title),
                text: rest.to_string(),
                continuation: Vec::new(),
            };
        }
    }
    DetailMitigation {
        title: None,
        text: text.to_string(),
        continuation: Vec::new(),
    }
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

impl FlawDetail {
    pub fn is_empty(&self) -> bool {
        self.explanation.is_empty() && self.mitigations.is_none() && self.notes.is_empty()
    }
}
