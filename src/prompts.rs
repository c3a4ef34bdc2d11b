use crate::model::truncate;

/// Fun-meter tone suffix. Tables are checked top to bottom and the first
/// entry whose bounds hold wins.
struct Tone {
    at_most: Option<u8>,
    at_least: Option<u8>,
    text: &'static str,
}

const ANALYSIS_TONES: &[Tone] = &[
    Tone {
        at_most: Some(20),
        at_least: None,
        text: "Maintain a strictly objective, formal, and highly critical tone. Focus on worst-case scenarios.",
    },
    Tone {
        at_most: None,
        at_least: Some(80),
        text: "Feel free to be very creative, humorous, or even wildly sarcastic. Exaggerate potential problems.",
    },
    Tone {
        at_most: None,
        at_least: None,
        text: "Maintain a balanced, constructive, yet critical tone.",
    },
];

const COMPARISON_TONES: &[Tone] = &[
    Tone {
        at_most: Some(20),
        at_least: None,
        text: "Maintain a strictly objective and analytical tone for the comparison.",
    },
    Tone {
        at_most: None,
        at_least: Some(80),
        text: "Feel free to be more opinionated, and even a bit playful or provocative in your comparison, while still providing insights.",
    },
    Tone {
        at_most: None,
        at_least: None,
        text: "Provide a balanced and insightful comparison.",
    },
];

// No middle band: mid-range levels add nothing.
const DETAIL_TONES: &[Tone] = &[
    Tone {
        at_most: Some(30),
        at_least: None,
        text: "Maintain a very analytical and direct tone for these details.",
    },
    Tone {
        at_most: None,
        at_least: Some(70),
        text: "Be particularly insightful and creative with the mitigation strategies.",
    },
];

fn tone(table: &[Tone], fun: Option<u8>) -> Option<&'static str> {
    let level = fun?;
    table
        .iter()
        .find(|t| {
            t.at_most.map_or(true, |max| level <= max) && t.at_least.map_or(true, |min| level >= min)
        })
        .map(|t| t.text)
}

fn with_tone(mut prompt: String, table: &[Tone], fun: Option<u8>) -> String {
    if let Some(text) = tone(table, fun) {
        prompt.push('\n');
        prompt.push_str(text);
    }
    prompt
}

pub fn analysis_prompt(idea: &str, fun: Option<u8>) -> String {
    let prompt = format!(
        r#"You are an AI designed to find flaws in ideas, in the spirit of "Murphy's Law."
Your task is to analyze the following AI idea: "{idea}"

Please provide the analysis in the following structured Markdown format. Be very specific and detailed in each section:

## Idea Exploration:
[Provide a concise **Main Title for the Exploration** followed by a hyphen ' - ' and then a detailed multi-sentence paragraph exploring the idea, its context, core value, and what it aims to achieve.]
Example:
**Understanding the Core Concept** - This AI idea centers around [core concept]. It aims to solve [problem] by [approach]...

## Pros:
[List 2-4 pros. Each pro MUST be a separate bullet point formatted as: - **Pro Title** - Detailed explanation.]

## Objective Flaws (Murphy's Law in Action!):
[List 3-5 objective flaws. Each flaw MUST be a separate bullet point with a bolded title, then ' - ', then a 1-2 sentence description, then its severity in parentheses.
Flaws may be grouped under lines of the form: ### Category: <name>
Example:
- **Accuracy of Personalization** - The AI might struggle with generic input data, producing outputs that feel impersonal. (Severity: High)]

## Mitigation Strategies:
[Suggest 1-2 actionable strategies for the critical flaws. Each strategy MUST be a separate bullet point formatted as: - **Strategy Title** - Detailed explanation.]

## Overall Rating (out of 10):
[Provide an estimated overall rating (1-10) and a brief justification.]
Rating: [Score]/10 - Justification.

---
"#
    );
    with_tone(prompt, ANALYSIS_TONES, fun)
}

pub fn comparison_prompt(idea1: &str, idea2: &str, fun: Option<u8>) -> String {
    let short1 = truncate(idea1, 50);
    let short2 = truncate(idea2, 50);
    let prompt = format!(
        r#"You are an AI designed to critically compare two AI ideas.
Please compare the following two AI ideas:

Idea 1: "{idea1}"

Idea 2: "{idea2}"

Provide a structured comparison using Markdown, then an overall comparative summary:

## Comparative Analysis:

### Idea 1: "{short1}"
*   **Potential Strengths:** [Key strengths of Idea 1.]
*   **Potential Weaknesses/Flaws:** [Key weaknesses or flaws of Idea 1.]
*   **Unique Selling Proposition (USP):** [What makes Idea 1 stand out, if anything?]
*   **Viability/Feasibility Score (1-10):** [Score Idea 1 and briefly justify]

### Idea 2: "{short2}"
*   **Potential Strengths:** [Key strengths of Idea 2.]
*   **Potential Weaknesses/Flaws:** [Key weaknesses or flaws of Idea 2.]
*   **Unique Selling Proposition (USP):** [What makes Idea 2 stand out, if anything?]
*   **Viability/Feasibility Score (1-10):** [Score Idea 2 and briefly justify]

### Head-to-Head Comparison:
*   **Innovation:** [Which idea is more innovative and why?]
*   **Potential Impact:** [Which idea has a greater potential impact and why?]
*   **Ease of Implementation:** [Which idea seems easier to implement and why?]
*   **Market Attractiveness (if applicable):** [Which idea might be more attractive to users?]

### Overall Recommendation:
[Which idea seems more promising, or are they equally viable in different ways? Provide a concluding thought.]

---
"#
    );
    with_tone(prompt, COMPARISON_TONES, fun)
}

pub fn detail_prompt(
    idea_summary: &str,
    flaw_title: &str,
    flaw_description: Option<&str>,
    fun: Option<u8>,
) -> String {
    let flaw = match flaw_description.filter(|d| !d.is_empty()) {
        Some(description) => format!("{flaw_title} - {description}"),
        None => flaw_title.to_string(),
    };
    let prompt = format!(
        r#"You are an AI assistant specializing in detailed risk analysis and mitigation.
The user is analyzing the following AI idea: "{idea_summary}"
They have identified a specific flaw and want more details about it: "{flaw}"

Please provide a detailed breakdown for this specific flaw using Markdown:

### In-Depth Flaw Explanation:
[Elaborate on why "{flaw}" is a significant concern for the idea "{idea_summary}".
What are the root causes and the negative consequences if this flaw materializes?
Provide 2-3 sentences of detailed explanation.]

### Targeted Mitigation Strategies:
[Suggest 2-3 specific, actionable strategies addressing ONLY the flaw "{flaw}" for the idea "{idea_summary}".
Each strategy should be a separate bullet point formatted as: - **Strategy Title:** How this strategy mitigates the flaw.]

---
"#
    );
    with_tone(prompt, DETAIL_TONES, fun)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_tone_bands() {
        assert!(analysis_prompt("x", Some(20)).ends_with("Focus on worst-case scenarios."));
        assert!(analysis_prompt("x", Some(80)).ends_with("Exaggerate potential problems."));
        assert!(analysis_prompt("x", Some(50)).ends_with("yet critical tone."));
        assert!(analysis_prompt("x", None).ends_with("---\n"));
    }

    #[test]
    fn analysis_prompt_names_every_section() {
        let p = analysis_prompt("Smart fridge", None);
        assert!(p.contains(r#"analyze the following AI idea: "Smart fridge""#));
        for header in [
            "## Idea Exploration:",
            "## Pros:",
            "## Objective Flaws",
            "## Mitigation Strategies:",
            "## Overall Rating",
        ] {
            assert!(p.contains(header), "missing {header}");
        }
    }

    #[test]
    fn comparison_truncates_headings() {
        let long = "y".repeat(60);
        let p = comparison_prompt(&long, "short", Some(10));
        assert!(p.contains(&format!("### Idea 1: \"{}...\"", "y".repeat(50))));
        assert!(p.contains("### Idea 2: \"short\""));
        assert!(p.ends_with("analytical tone for the comparison."));
    }

    #[test]
    fn detail_tone_has_no_middle_band() {
        assert!(detail_prompt("i", "f", None, Some(50)).ends_with("---\n"));
        assert!(detail_prompt("i", "f", None, Some(30)).ends_with("direct tone for these details."));
        assert!(detail_prompt("i", "f", None, Some(70)).ends_with("with the mitigation strategies."));
    }

    #[test]
    fn detail_joins_title_and_description() {
        let p = detail_prompt("Smart fridge", "Spoilage Risk", Some("food may rot"), None);
        assert!(p.contains(r#""Spoilage Risk - food may rot""#));
        let bare = detail_prompt("Smart fridge", "Spoilage Risk", Some(""), None);
        assert!(bare.contains(r#"more details about it: "Spoilage Risk""#));
    }
}
