use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(label)
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A pro or mitigation bullet: `**Title** - description`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub description: String,
}

impl Item {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Item {
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlawItem {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl FlawItem {
    /// Key the lazily fetched detail panel is addressed by.
    pub fn detail_key(&self) -> DetailKey {
        DetailKey {
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }
}

/// `name` is `None` for the implicit bucket of flaws listed before any
/// `### Category:` marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlawCategory {
    pub name: Option<String>,
    pub items: Vec<FlawItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exploration {
    /// First populated line carried a `Title - Description` split.
    Titled {
        title: String,
        description: String,
        lines: Vec<String>,
    },
    Raw { lines: Vec<String> },
}

impl Exploration {
    pub fn is_empty(&self) -> bool {
        matches!(self, Exploration::Raw { lines } if lines.is_empty())
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Exploration::Titled { lines, .. } | Exploration::Raw { lines } => lines,
        }
    }
}

impl Default for Exploration {
    fn default() -> Self {
        Exploration::Raw { lines: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Exploration,
    Pros,
    Flaws,
    Mitigations,
    Rating,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Exploration,
        SectionKind::Pros,
        SectionKind::Flaws,
        SectionKind::Mitigations,
        SectionKind::Rating,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionKind::Exploration => "exploration",
            SectionKind::Pros => "pros",
            SectionKind::Flaws => "flaws",
            SectionKind::Mitigations => "mitigations",
            SectionKind::Rating => "rating",
        }
    }

    /// Panel heading used by both projectors.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Exploration => "Idea Exploration",
            SectionKind::Pros => "Pros",
            SectionKind::Flaws => "Objective Flaws",
            SectionKind::Mitigations => "Mitigation Strategies",
            SectionKind::Rating => "Overall Rating",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DetailKey {
    pub title: String,
    pub description: String,
}

/// Structured result of parsing one raw analysis response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisDocument {
    pub idea_summary: String,
    pub exploration: Exploration,
    pub pros: Vec<Item>,
    pub flaws: Vec<FlawCategory>,
    pub mitigations: Vec<Item>,
    pub rating: String,
    pub timestamp: DateTime<Utc>,
    /// Sections that parsed to nothing and carry a placeholder instead.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<SectionKind>,
}

impl AnalysisDocument {
    pub fn is_defaulted(&self, section: SectionKind) -> bool {
        self.defaulted.contains(&section)
    }

    pub fn flaw_count(&self) -> usize {
        self.flaws.iter().map(|c| c.items.len()).sum()
    }
}

/// Truncate to `max` chars for display, appending `...` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert_eq!(" low ".parse::<Severity>(), Ok(Severity::Low));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_display_is_capitalized() {
        assert_eq!(Severity::Medium.to_string(), "Medium");
        assert_eq!(Severity::default(), Severity::Medium);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("Smart fridge", 50), "Smart fridge");
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }

    #[test]
    fn raw_exploration_without_lines_is_empty() {
        assert!(Exploration::default().is_empty());
        let titled = Exploration::Titled {
            title: "T".into(),
            description: String::new(),
            lines: vec![],
        };
        assert!(!titled.is_empty());
    }
}
