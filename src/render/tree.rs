use serde::Serialize;

use super::{escape_html, inline_html};
use crate::model::{
    truncate, AnalysisDocument, DetailKey, Exploration, FlawCategory, Item, SectionKind, Severity,
};
use crate::parser::extract::NO_FLAWS;

/// Presentation tree for the interactive view. Shape and ordering are the
/// contract; the HTML projection below is one target among many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum ViewNode {
    Analysis {
        heading: String,
        panels: Vec<ViewNode>,
    },
    Panel {
        section: SectionKind,
        title: String,
        children: Vec<ViewNode>,
    },
    Exploration {
        title: Option<String>,
        description: Option<String>,
        lines: Vec<String>,
    },
    ItemList {
        items: Vec<Item>,
    },
    FlawGroup {
        category: Option<String>,
        flaws: Vec<FlawCard>,
    },
    Rating {
        text: String,
    },
    Notice {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlawCard {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    /// Detail panel, fetched on demand by this key.
    pub detail: DetailKey,
}

pub fn build_tree(doc: &AnalysisDocument) -> ViewNode {
    let panels = SectionKind::ALL
        .iter()
        .map(|&section| ViewNode::Panel {
            section,
            title: section.title().to_string(),
            children: panel_children(doc, section),
        })
        .collect();
    ViewNode::Analysis {
        heading: format!("Analysis for: \"{}\"", truncate(&doc.idea_summary, 50)),
        panels,
    }
}

fn panel_children(doc: &AnalysisDocument, section: SectionKind) -> Vec<ViewNode> {
    match section {
        SectionKind::Exploration => vec![exploration_node(&doc.exploration)],
        SectionKind::Pros => vec![ViewNode::ItemList {
            items: doc.pros.clone(),
        }],
        SectionKind::Flaws if doc.is_defaulted(SectionKind::Flaws) => vec![ViewNode::Notice {
            text: NO_FLAWS.to_string(),
        }],
        SectionKind::Flaws => doc.flaws.iter().map(flaw_group).collect(),
        SectionKind::Mitigations => vec![ViewNode::ItemList {
            items: doc.mitigations.clone(),
        }],
        SectionKind::Rating => vec![ViewNode::Rating {
            text: doc.rating.clone(),
        }],
    }
}

fn exploration_node(exploration: &Exploration) -> ViewNode {
    match exploration {
        Exploration::Titled {
            title,
            description,
            lines,
        } => ViewNode::Exploration {
            title: Some(title.clone()),
            description: Some(description.clone()),
            lines: lines.clone(),
        },
        Exploration::Raw { lines } => ViewNode::Exploration {
            title: None,
            description: None,
            lines: lines.clone(),
        },
    }
}

fn flaw_group(category: &FlawCategory) -> ViewNode {
    ViewNode::FlawGroup {
        category: category.name.clone(),
        flaws: category
            .items
            .iter()
            .map(|f| FlawCard {
                title: f.title.clone(),
                description: f.description.clone(),
                severity: f.severity,
                detail: f.detail_key(),
            })
            .collect(),
    }
}

// ── HTML projection ──

pub fn to_html(node: &ViewNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &ViewNode, out: &mut String) {
    match node {
        ViewNode::Analysis { heading, panels } => {
            out.push_str("<div class=\"analysis-results\">\n");
            out.push_str(&format!("<h3 class=\"idea-title\">{}</h3>\n", escape_html(heading)));
            for panel in panels {
                write_node(panel, out);
            }
            out.push_str("</div>\n");
        }
        ViewNode::Panel {
            section,
            title,
            children,
        } => {
            out.push_str(&format!(
                "<div class=\"accordion-item\" data-section=\"{}\">\n",
                section.key()
            ));
            out.push_str(&format!(
                "<button class=\"accordion-header\">{}</button>\n",
                escape_html(title)
            ));
            out.push_str("<div class=\"accordion-content\">\n");
            for child in children {
                write_node(child, out);
            }
            out.push_str("</div>\n</div>\n");
        }
        ViewNode::Exploration {
            title,
            description,
            lines,
        } => {
            let mut parts = Vec::new();
            if let Some(title) = title {
                let description = description.as_deref().unwrap_or_default();
                parts.push(format!(
                    "<strong class=\"item-title\">{}</strong> - {}",
                    escape_html(title),
                    inline_html(description)
                ));
            }
            parts.extend(lines.iter().map(|l| inline_html(l)));
            out.push_str(&format!(
                "<p class=\"exploration-output\">{}</p>\n",
                parts.join("<br>")
            ));
        }
        ViewNode::ItemList { items } => {
            out.push_str("<ul class=\"item-list\">\n");
            for item in items {
                out.push_str(&format!(
                    "  <li><span class=\"item-title\">{}</span>",
                    escape_html(&item.title)
                ));
                if !item.description.is_empty() {
                    out.push_str(&format!(
                        "<p class=\"item-description\">{}</p>",
                        inline_html(&item.description)
                    ));
                }
                out.push_str("</li>\n");
            }
            out.push_str("</ul>\n");
        }
        ViewNode::FlawGroup { category, flaws } => {
            match category {
                Some(name) => out.push_str(&format!("<h4>{}</h4>\n<ul>\n", escape_html(name))),
                None => out.push_str("<ul class=\"uncategorized-flaws\">\n"),
            }
            for flaw in flaws {
                write_flaw(flaw, out);
            }
            out.push_str("</ul>\n");
        }
        ViewNode::Rating { text } => {
            out.push_str(&format!("<p class=\"rating-output\">{}</p>\n", inline_html(text)));
        }
        ViewNode::Notice { text } => {
            out.push_str(&format!("<p>{}</p>\n", escape_html(text)));
        }
    }
}

fn write_flaw(flaw: &FlawCard, out: &mut String) {
    out.push_str("  <li><div class=\"flaw-item\">");
    out.push_str(&format!(
        "<span class=\"flaw-title\">{}</span>",
        escape_html(&flaw.title)
    ));
    if !flaw.description.is_empty() {
        out.push_str(&format!(
            "<p class=\"flaw-description\">{}</p>",
            inline_html(&flaw.description)
        ));
    }
    out.push_str(&format!(
        "<span class=\"flaw-severity severity-{}\">Severity: {}</span>",
        flaw.severity.as_str(),
        flaw.severity
    ));
    out.push_str(&format!(
        "<button class=\"flaw-details-button\" data-flaw-title=\"{}\" data-flaw-description=\"{}\">Details &amp; Mitigations</button>",
        escape_html(&flaw.detail.title),
        escape_html(&flaw.detail.description)
    ));
    out.push_str("<div class=\"flaw-mitigation-details\"></div></div></li>\n");
}
