use super::{escape_html, inline_html};
use crate::parser::extract::detail::{DetailMitigation, FlawDetail};

pub const NO_DETAIL: &str = "<p>No further details available for this flaw.</p>";

pub fn render_detail(detail: &FlawDetail) -> String {
    if detail.is_empty() {
        return NO_DETAIL.to_string();
    }

    let mut out = String::new();
    if !detail.explanation.is_empty() {
        out.push_str("<h5>In-Depth Explanation:</h5>\n");
        for line in &detail.explanation {
            out.push_str(&format!("<p>{}</p>\n", escape_html(line)));
        }
    }
    if let Some(mitigations) = &detail.mitigations {
        out.push_str("<h5>Targeted Mitigations:</h5>\n<ul>\n");
        for m in mitigations {
            out.push_str(&format!("  <li>{}</li>\n", mitigation_html(m)));
        }
        out.push_str("</ul>\n");
    }
    for note in &detail.notes {
        out.push_str(&format!("<p>{}</p>\n", escape_html(note)));
    }
    out
}

fn mitigation_html(m: &DetailMitigation) -> String {
    let mut html = match &m.title {
        Some(title) => format!("<strong>{}:</strong> {}", escape_html(title), inline_html(&m.text)),
        None => escape_html(&m.text),
    };
    for line in &m.continuation {
        html.push_str("<br>");
        html.push_str(&escape_html(line));
    }
    html
}
