mod client;
mod db;
mod model;
mod parser;
mod prompts;
mod render;
mod settings;

use std::collections::HashSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::client::GeminiClient;
use crate::model::{truncate, AnalysisDocument};
use crate::parser::extract::detail::parse_detail;
use crate::render::{compare, detail, text, tree};
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "murphys_law", about = "Murphy's Law idea analyzer backed by Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Plain-text report
    Text,
    /// Interactive view as an HTML fragment
    Html,
    /// Parsed document as JSON
    Json,
    /// Presentation tree as JSON
    Tree,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one idea and save it to history
    Analyze {
        idea: String,
        /// Tone, 0 (strict) to 100 (playful)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        fun: Option<u8>,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
        /// Skip saving the result to history
        #[arg(long)]
        no_save: bool,
    },
    /// Compare two ideas
    Compare {
        idea1: String,
        idea2: String,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        fun: Option<u8>,
        /// Print the model text instead of HTML
        #[arg(long)]
        raw: bool,
    },
    /// Details and mitigations for one flaw
    Detail {
        /// The idea the flaw belongs to
        idea: String,
        flaw_title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
        fun: Option<u8>,
        /// Print parsed JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
    /// Parse saved model output offline (file or stdin)
    Render {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
        #[arg(short, long, default_value = "Untitled idea")]
        idea: String,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved analyses, newest first
    List,
    /// Show one saved analysis
    Show {
        /// Position in the list (1 = newest)
        position: usize,
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Write text reports to disk (all records when no position is given)
    Export {
        position: Option<usize>,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Delete all saved analyses
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            idea,
            fun,
            format,
            no_save,
        } => {
            let idea = require_text(&idea, "Idea text is required for analysis.")?;
            let settings = Settings::load()?;
            let fun = fun.unwrap_or(settings.fun_meter);
            let client = GeminiClient::new(&settings)?;
            let prompt = prompts::analysis_prompt(idea, Some(fun));
            let raw = client.generate("Analyzing idea", &prompt).await?;

            let record = db::NewRecord {
                idea_summary: idea.to_string(),
                analysis_text: raw,
                fun_meter: Some(fun),
                timestamp: Utc::now(),
            };
            if !no_save {
                let conn = db::connect(&settings.db_path)?;
                db::init_schema(&conn)?;
                let saved = db::save(&conn, &record, settings.history_limit)?;
                info!("Saved to history as #{} ({} pruned)", saved.id, saved.pruned);
            }
            println!("{}", emit(&record.document(), format)?);
            Ok(())
        }
        Commands::Compare {
            idea1,
            idea2,
            fun,
            raw,
        } => {
            let message = "Two ideas are required for comparison.";
            let idea1 = require_text(&idea1, message)?;
            let idea2 = require_text(&idea2, message)?;
            let settings = Settings::load()?;
            let fun = fun.unwrap_or(settings.fun_meter);
            let client = GeminiClient::new(&settings)?;
            let prompt = prompts::comparison_prompt(idea1, idea2, Some(fun));
            let text = client.generate("Comparing ideas", &prompt).await?;
            if raw {
                println!("{}", text);
            } else {
                println!("{}", compare::render_comparison(&text));
            }
            Ok(())
        }
        Commands::Detail {
            idea,
            flaw_title,
            description,
            fun,
            json,
        } => {
            let message = "Original idea summary and flaw title are required.";
            let idea = require_text(&idea, message)?;
            let flaw_title = require_text(&flaw_title, message)?;
            let settings = Settings::load()?;
            let fun = fun.unwrap_or(settings.fun_meter);
            let client = GeminiClient::new(&settings)?;
            let prompt =
                prompts::detail_prompt(idea, flaw_title, description.as_deref(), Some(fun));
            let text = client.generate("Fetching flaw details", &prompt).await?;
            let parsed = parse_detail(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                println!("{}", detail::render_detail(&parsed));
            }
            Ok(())
        }
        Commands::Render { file, idea, format } => {
            println!("{}", render_offline(file.as_deref(), &idea, format)?);
            Ok(())
        }
        Commands::History { action } => {
            let settings = Settings::load()?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            run_history(&conn, action)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn run_history(conn: &rusqlite::Connection, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            let records = db::list(conn)?;
            if records.is_empty() {
                println!("No analysis history yet.");
                return Ok(());
            }
            println!("{:>3} | {:<50} | {:<19} | {:>3}", "#", "Idea", "Saved (UTC)", "Fun");
            println!("{}", "-".repeat(86));
            for (i, r) in records.iter().enumerate() {
                let fun = r.fun_meter.map(|f| f.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{:>3} | {:<50} | {:<19} | {:>3}",
                    i + 1,
                    truncate(&r.idea_summary, 47),
                    r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    fun
                );
            }
            Ok(())
        }
        HistoryAction::Show { position, format } => {
            let record = db::get(conn, position)?
                .with_context(|| format!("No history entry at position {}", position))?;
            println!("{}", emit(&record.document(), format)?);
            Ok(())
        }
        HistoryAction::Export { position, out } => {
            let records = match position {
                Some(p) => vec![db::get(conn, p)?
                    .with_context(|| format!("No history entry at position {}", p))?],
                None => db::list(conn)?,
            };
            if records.is_empty() {
                println!("Nothing to export.");
                return Ok(());
            }
            std::fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let written = export_reports(&records, &out)?;
            println!("Exported {} report(s) to {}", written, out.display());
            Ok(())
        }
        HistoryAction::Clear => {
            let n = db::clear(conn)?;
            println!("Cleared {} saved analyses.", n);
            Ok(())
        }
    }
}

/// Render reports in parallel, then write them out in list order.
fn export_reports(records: &[db::HistoryRecord], out: &Path) -> Result<usize> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("#>-"),
    );

    let bodies: Vec<String> = records
        .par_iter()
        .map(|r| text::render_report(&r.document()))
        .collect();
    let names = export_names(records);

    for (name, body) in names.iter().zip(&bodies) {
        let path = out.join(name);
        std::fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(bodies.len())
}

/// One filename per record, unique within the batch. The first record keeps
/// the plain name; later ones with the same name get their timestamp, then
/// their position, appended.
fn export_names(records: &[db::HistoryRecord]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let base = text::report_filename(&r.idea_summary);
            let stem = base.trim_end_matches(".txt");
            let candidates = [
                base.clone(),
                format!("{}_{}.txt", stem, r.timestamp.format("%Y%m%dT%H%M%S")),
                format!("{}_{}.txt", stem, i + 1),
            ];
            let name = candidates
                .iter()
                .find(|c| !taken.contains(c.as_str()))
                .cloned()
                .unwrap_or_else(|| format!("{}_{}_{}.txt", stem, r.id, i + 1));
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Parse saved model output without touching settings or the network.
fn render_offline(file: Option<&Path>, idea: &str, format: Format) -> Result<String> {
    let raw = read_input(file)?;
    emit(&parser::parse_analysis(idea, &raw, Utc::now()), format)
}

fn emit(doc: &AnalysisDocument, format: Format) -> Result<String> {
    Ok(match format {
        Format::Text => text::render_report(doc),
        Format::Html => tree::to_html(&tree::build_tree(doc)),
        Format::Json => serde_json::to_string_pretty(doc)?,
        Format::Tree => serde_json::to_string_pretty(&tree::build_tree(doc))?,
    })
}

fn require_text<'a>(value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{}", message);
    }
    Ok(trimmed)
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_rejected() {
        assert!(require_text("   ", "needed").is_err());
        assert_eq!(require_text("  fridge ", "needed").unwrap(), "fridge");
    }

    #[test]
    fn every_format_renders() {
        let raw = std::fs::read_to_string("tests/fixtures/smart_fridge.md").unwrap();
        let doc = parser::parse_analysis("Smart fridge", &raw, chrono::DateTime::<Utc>::UNIX_EPOCH);
        assert!(emit(&doc, Format::Text).unwrap().starts_with("Murphy's Law AI Analysis for: Smart fridge"));
        assert!(emit(&doc, Format::Html).unwrap().starts_with("<div class=\"analysis-results\">"));
        assert!(emit(&doc, Format::Json).unwrap().contains("\"idea_summary\": \"Smart fridge\""));
        assert!(emit(&doc, Format::Tree).unwrap().contains("\"node\": \"analysis\""));
    }

    fn saved(id: i64, idea: &str, pro: &str, minutes: i64) -> db::HistoryRecord {
        db::HistoryRecord {
            id,
            idea_summary: idea.into(),
            analysis_text: format!("## Pros:\n- **{}** - automates shopping", pro),
            fun_meter: None,
            timestamp: "2026-10-19T12:00:00Z".parse::<chrono::DateTime<Utc>>().unwrap()
                + chrono::Duration::minutes(minutes),
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("murphys_law_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn export_writes_named_files() {
        let dir = scratch_dir("export_single");
        let record = saved(1, "Smart fridge", "Saves Time", 0);
        assert_eq!(export_reports(&[record], &dir).unwrap(), 1);
        let body = std::fs::read_to_string(dir.join("murphys_law_ai_report_smart_fridge.txt")).unwrap();
        assert!(body.contains("• Saves Time: automates shopping"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn same_idea_exports_do_not_overwrite() {
        let dir = scratch_dir("export_same_idea");
        let records = [
            saved(2, "Smart fridge", "Newer", 10),
            saved(1, "Smart fridge", "Older", 0),
        ];
        assert_eq!(export_reports(&records, &dir).unwrap(), 2);
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
        let newest = std::fs::read_to_string(dir.join("murphys_law_ai_report_smart_fridge.txt")).unwrap();
        assert!(newest.contains("• Newer: automates shopping"));
        let older = std::fs::read_to_string(
            dir.join("murphys_law_ai_report_smart_fridge_20261019T120000.txt"),
        )
        .unwrap();
        assert!(older.contains("• Older: automates shopping"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn shared_prefix_and_timestamp_fall_back_to_position() {
        let prefix = "An extremely long idea about smart";
        let records = [
            saved(3, &format!("{} fridges", prefix), "A", 0),
            saved(2, &format!("{} ovens", prefix), "B", 0),
            saved(1, &format!("{} sinks", prefix), "C", 0),
        ];
        let names = export_names(&records);
        let stem = "murphys_law_ai_report_an_extremely_long_idea_about_s";
        assert_eq!(
            names,
            vec![
                format!("{}.txt", stem),
                format!("{}_20261019T120000.txt", stem),
                format!("{}_3.txt", stem),
            ]
        );
    }

    #[test]
    fn render_ignores_broken_settings() {
        let dir = scratch_dir("render_offline");
        let input = dir.join("raw.md");
        std::fs::write(&input, "## Pros:\n- **Saves Time** - automates shopping\n").unwrap();
        std::env::set_var("MURPHY_FUN_METER", "500");
        assert!(Settings::load().is_err());
        let out = render_offline(Some(&input), "Smart fridge", Format::Text);
        std::env::remove_var("MURPHY_FUN_METER");
        assert!(out.unwrap().contains("• Saves Time: automates shopping"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
    }
}
