use crate::model::{AnalysisDocument, Exploration, FlawItem, Item, SectionKind};

const RULE: &str = "========================================";

/// Plain-text report for clipboard/file export.
///
/// Walks the parsed document rather than the raw response, so the report and
/// the interactive view can never disagree about what an item is.
pub fn render_report(doc: &AnalysisDocument) -> String {
    let mut out = format!("Murphy's Law AI Analysis for: {}\n{}\n", doc.idea_summary, RULE);

    for section in SectionKind::ALL {
        if doc.is_defaulted(section) {
            continue;
        }
        out.push_str(&format!("\n--- {} ---\n", section.title().to_uppercase()));
        match section {
            SectionKind::Exploration => write_exploration(&doc.exploration, &mut out),
            SectionKind::Pros => write_items(&doc.pros, &mut out),
            SectionKind::Flaws => {
                for category in &doc.flaws {
                    if let Some(name) = &category.name {
                        out.push_str(&format!("\nCATEGORY: {}\n", name.to_uppercase()));
                    }
                    for flaw in &category.items {
                        out.push_str(&flaw_line(flaw));
                    }
                }
            }
            SectionKind::Mitigations => write_items(&doc.mitigations, &mut out),
            SectionKind::Rating => {
                out.push_str(&doc.rating);
                out.push('\n');
            }
        }
    }

    out.push_str(&format!("\n{}\nAnalyzed with Murphy's Law of AI\n", RULE));
    out
}

fn write_exploration(exploration: &Exploration, out: &mut String) {
    if let Exploration::Titled {
        title, description, ..
    } = exploration
    {
        out.push_str(&format!("{}: {}\n", title.to_uppercase(), description));
    }
    for line in exploration.lines() {
        out.push_str(line);
        out.push('\n');
    }
}

fn write_items(items: &[Item], out: &mut String) {
    for item in items {
        if item.description.is_empty() {
            out.push_str(&format!("• {}\n", item.title));
        } else {
            out.push_str(&format!("• {}: {}\n", item.title, item.description));
        }
    }
}

fn flaw_line(flaw: &FlawItem) -> String {
    if flaw.description.is_empty() {
        format!("• {} (Severity: {})\n", flaw.title, flaw.severity)
    } else {
        format!(
            "• {}: {} (Severity: {})\n",
            flaw.title, flaw.description, flaw.severity
        )
    }
}

/// Export filename: `murphys_law_ai_report_<slug>.txt`.
pub fn report_filename(idea_summary: &str) -> String {
    let slug: String = idea_summary
        .chars()
        .take(30)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = if slug.is_empty() {
        "ai_analysis".to_string()
    } else {
        slug
    };
    format!("murphys_law_ai_report_{}.txt", slug)
}
