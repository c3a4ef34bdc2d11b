pub mod compare;
pub mod detail;
pub mod text;
pub mod tree;

use std::sync::LazyLock;

use regex::Regex;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape, then turn `**bold**` runs into `<strong>`.
pub fn inline_html(text: &str) -> String {
    BOLD_RE
        .replace_all(&escape_html(text), "<strong>$1</strong>")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&</a>"#), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn bold_runs_become_strong() {
        assert_eq!(
            inline_html("**Fast** and **cheap** <maybe>"),
            "<strong>Fast</strong> and <strong>cheap</strong> &lt;maybe&gt;"
        );
    }

    #[test]
    fn unmatched_emphasis_is_left_alone() {
        assert_eq!(inline_html("**dangling"), "**dangling");
    }
}
