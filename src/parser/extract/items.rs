use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FlawItem, Item, Severity};

static SEVERITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\(\s*severity\s*:\s*(low|medium|high)\s*\)").unwrap()
});

const DELIMITER: &str = " - ";

/// Parse a flaw bullet: `**Title** - description (Severity: High)`.
///
/// The severity annotation is removed before the delimiter search so its
/// contents can never be mistaken for part of the title/description split.
pub fn parse_flaw(content: &str) -> FlawItem {
    let (working, severity) = take_severity(content);
    let (title, description) = split_title(&working);
    FlawItem {
        title,
        description,
        severity,
    }
}

/// Parse a pro or mitigation bullet.
pub fn parse_item(content: &str) -> Item {
    let (title, description) = split_title(content);
    Item { title, description }
}

/// Strip the last `(Severity: X)` annotation, defaulting to medium.
pub fn take_severity(content: &str) -> (String, Severity) {
    let Some(caps) = SEVERITY_RE.captures_iter(content).last() else {
        return (content.trim().to_string(), Severity::default());
    };
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let severity = caps[1].parse().unwrap_or_default();
    let mut working = String::with_capacity(content.len());
    working.push_str(&content[..whole.start]);
    working.push_str(&content[whole.end..]);
    (working.trim().to_string(), severity)
}

/// Split on the first ` - `; without one the whole text is the title.
pub fn split_title(text: &str) -> (String, String) {
    match text.find(DELIMITER) {
        Some(idx) => (
            strip_emphasis(text[..idx].trim()),
            text[idx + DELIMITER.len()..].trim().to_string(),
        ),
        None => (strip_emphasis(text.trim()), String::new()),
    }
}

/// Remove one wrapping `**...**` pair.
pub fn strip_emphasis(text: &str) -> String {
    text.strip_prefix("**")
        .and_then(|t| t.strip_suffix("**"))
        .map(str::trim)
        .unwrap_or(text)
        .to_string()
}
