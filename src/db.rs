use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use crate::model::AnalysisDocument;
use crate::parser::parse_analysis;

pub fn connect(path: &str) -> Result<Connection> {
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS history (
            id            INTEGER PRIMARY KEY,
            idea_summary  TEXT NOT NULL,
            analysis_text TEXT NOT NULL,
            fun_meter     INTEGER,
            created_at    TEXT NOT NULL,
            UNIQUE(idea_summary, created_at)
        );
        CREATE INDEX IF NOT EXISTS idx_history_created ON history(created_at);
        ",
    )?;
    Ok(())
}

/// An analysis about to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub idea_summary: String,
    pub analysis_text: String,
    pub fun_meter: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

impl NewRecord {
    pub fn document(&self) -> AnalysisDocument {
        parse_analysis(&self.idea_summary, &self.analysis_text, self.timestamp)
    }
}

/// One saved analysis. The raw model text is stored; documents are re-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub idea_summary: String,
    pub analysis_text: String,
    pub fun_meter: Option<u8>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn document(&self) -> AnalysisDocument {
        parse_analysis(&self.idea_summary, &self.analysis_text, self.timestamp)
    }
}

pub struct Saved {
    pub id: i64,
    pub pruned: usize,
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Save a record, replacing any with the same idea and timestamp, then keep
/// only the newest `limit`.
pub fn save(conn: &Connection, record: &NewRecord, limit: usize) -> Result<Saved> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO history (idea_summary, analysis_text, fun_meter, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            record.idea_summary,
            record.analysis_text,
            record.fun_meter,
            format_ts(&record.timestamp),
        ],
    )?;
    let id = tx.last_insert_rowid();
    let pruned = tx.execute(
        "DELETE FROM history WHERE id NOT IN
         (SELECT id FROM history ORDER BY created_at DESC, id DESC LIMIT ?1)",
        rusqlite::params![limit as i64],
    )?;
    tx.commit()?;
    Ok(Saved { id, pruned })
}

/// All records, newest first.
pub fn list(conn: &Connection) -> Result<Vec<HistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, idea_summary, analysis_text, fun_meter, created_at
         FROM history ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<u8>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, idea_summary, analysis_text, fun_meter, created_at)| {
            let timestamp = DateTime::parse_from_rfc3339(&created_at)
                .with_context(|| format!("Bad timestamp in history: {}", created_at))?
                .with_timezone(&Utc);
            Ok(HistoryRecord {
                id,
                idea_summary,
                analysis_text,
                fun_meter,
                timestamp,
            })
        })
        .collect()
}

/// Record at 1-based `position` in newest-first order.
pub fn get(conn: &Connection, position: usize) -> Result<Option<HistoryRecord>> {
    if position == 0 {
        return Ok(None);
    }
    Ok(list(conn)?.into_iter().nth(position - 1))
}

pub fn clear(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM history", [])?)
}
