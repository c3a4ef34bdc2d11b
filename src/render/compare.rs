use super::inline_html;
use crate::parser::blocks::{classify_line, Block};

pub const NO_COMPARISON: &str = "<p>No comparison data was returned.</p>";

/// Promote comparison text to HTML: headers, bullet lists and paragraphs.
pub fn render_comparison(text: &str) -> String {
    if text.trim().is_empty() {
        return NO_COMPARISON.to_string();
    }

    let mut out = String::new();
    let mut in_list = false;

    for raw in text.lines() {
        let block = classify_line(raw);
        if in_list && !matches!(block, Block::Bullet { .. }) {
            out.push_str("</ul>\n");
            in_list = false;
        }
        match block {
            Block::Heading2(t) => out.push_str(&format!("<h2>{}</h2>\n", inline_html(&t))),
            Block::Heading3 { text: t, .. } => out.push_str(&format!("<h3>{}</h3>\n", inline_html(&t))),
            Block::Category { line, .. } => {
                let t = line.trim_start_matches("### ").trim();
                out.push_str(&format!("<h3>{}</h3>\n", inline_html(t)));
            }
            Block::Bullet { text, .. } => {
                if !in_list {
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                out.push_str(&format!("  <li>{}</li>\n", inline_html(&text)));
            }
            Block::Text(t) => out.push_str(&format!("<p>{}</p>\n", inline_html(&t))),
            Block::Empty => {}
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }
    out
}
