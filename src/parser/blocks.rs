/// One classified line of model output.
///
/// Payloads hold the line with its marker stripped and trimmed. Variants that
/// can reach the document keep the trimmed input line too, so `source()`
/// returns it with inner whitespace intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading2(String),
    Heading3 { text: String, line: String },
    Category { name: String, line: String },
    Bullet { marker: char, text: String, line: String },
    Text(String),
    Empty,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Heading2,
    Category,
    Heading3,
    Bullet(char),
}

// Checked in order; the first matching prefix wins.
const PREFIXES: &[(&str, Rule)] = &[
    ("## ", Rule::Heading2),
    ("### Category:", Rule::Category),
    ("### ", Rule::Heading3),
    ("- ", Rule::Bullet('-')),
    ("* ", Rule::Bullet('*')),
];

impl Rule {
    fn build(self, line: &str, rest: &str) -> Block {
        let rest = rest.trim().to_string();
        match self {
            Rule::Heading2 => Block::Heading2(rest),
            Rule::Category => Block::Category {
                name: rest,
                line: line.to_string(),
            },
            Rule::Heading3 => Block::Heading3 {
                text: rest,
                line: line.to_string(),
            },
            Rule::Bullet(marker) => Block::Bullet {
                marker,
                text: rest,
                line: line.to_string(),
            },
        }
    }
}

impl Block {
    /// The trimmed input line this block was classified from.
    pub fn source(&self) -> String {
        match self {
            Block::Heading2(t) => format!("## {}", t),
            Block::Heading3 { line, .. }
            | Block::Category { line, .. }
            | Block::Bullet { line, .. } => line.clone(),
            Block::Text(t) => t.clone(),
            Block::Empty => String::new(),
        }
    }
}

/// Classify a single line. Total over all strings.
pub fn classify_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        return Block::Empty;
    }
    PREFIXES
        .iter()
        .find_map(|(prefix, rule)| line.strip_prefix(prefix).map(|rest| rule.build(line, rest)))
        .unwrap_or_else(|| Block::Text(line.to_string()))
}

pub fn classify_lines(markdown: &str) -> Vec<Block> {
    markdown.lines().map(classify_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading2() {
        assert_eq!(classify_line("## Pros:"), Block::Heading2("Pros:".into()));
    }

    #[test]
    fn category_beats_heading3() {
        let block = classify_line("### Category: Technical");
        assert!(matches!(&block, Block::Category { name, .. } if name == "Technical"));
        assert_eq!(block.source(), "### Category: Technical");
    }

    #[test]
    fn heading3() {
        assert_eq!(
            classify_line("### Head-to-Head Comparison:"),
            Block::Heading3 {
                text: "Head-to-Head Comparison:".into(),
                line: "### Head-to-Head Comparison:".into(),
            }
        );
    }

    #[test]
    fn category_with_empty_name() {
        assert!(matches!(classify_line("### Category:"), Block::Category { name, .. } if name.is_empty()));
    }

    #[test]
    fn bullets_with_both_markers() {
        assert_eq!(
            classify_line("- **A** - b"),
            Block::Bullet {
                marker: '-',
                text: "**A** - b".into(),
                line: "- **A** - b".into(),
            }
        );
        assert_eq!(
            classify_line("*   **USP:** cheap"),
            Block::Bullet {
                marker: '*',
                text: "**USP:** cheap".into(),
                line: "*   **USP:** cheap".into(),
            }
        );
    }

    #[test]
    fn bold_line_is_not_a_bullet() {
        assert_eq!(classify_line("**Rating:** 7/10"), Block::Text("**Rating:** 7/10".into()));
    }

    #[test]
    fn source_keeps_inner_whitespace() {
        assert_eq!(classify_line("  -   spaced   item ").source(), "-   spaced   item");
        assert_eq!(classify_line("###  Two  spaces").source(), "###  Two  spaces");
    }

    #[test]
    fn lone_marker_is_text() {
        assert_eq!(classify_line("-"), Block::Text("-".into()));
        assert_eq!(classify_line("##"), Block::Text("##".into()));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(classify_line("   ## Pros:  "), Block::Heading2("Pros:".into()));
        assert_eq!(classify_line(" \t "), Block::Empty);
    }

    #[test]
    fn empty_string() {
        assert_eq!(classify_line(""), Block::Empty);
        assert!(classify_lines("").is_empty());
    }

    #[test]
    fn one_block_per_line() {
        let blocks = classify_lines("## Pros:\n\n- a\ntext");
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[1], Block::Empty);
        assert_eq!(blocks[3], Block::Text("text".into()));
    }
}
