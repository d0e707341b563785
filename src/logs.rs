//! Discovery and parsing of Claude Code transcript logs.
//!
//! Transcripts live as JSONL files under the Claude config directory's
//! `projects/` tree. Lines that are not valid JSON, carry no usage object, or
//! have an unparseable timestamp are skipped here so the chart pipeline never
//! sees them.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::models::{TranscriptLine, UsageEvent};

/// The Claude config directory: `$CLAUDE_CONFIG_DIR` if set, else `~/.claude`.
pub fn claude_dir() -> PathBuf {
    std::env::var_os("CLAUDE_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".claude")))
        .unwrap_or_else(|| PathBuf::from(".claude"))
}

/// Read every usage event from the JSONL transcripts under `projects_dir`.
///
/// Files are parsed in parallel; unreadable files are skipped with a debug
/// log rather than failing the whole scan.
pub fn read_usage_events(projects_dir: &Path) -> Result<Vec<UsageEvent>> {
    let files: Vec<PathBuf> = WalkDir::new(projects_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "jsonl")
        })
        .map(|entry| entry.into_path())
        .collect();

    info!(
        "Scanning {} transcript files under {}",
        files.len(),
        projects_dir.display()
    );

    let events: Vec<UsageEvent> = files
        .par_iter()
        .flat_map_iter(|path| parse_transcript(path))
        .collect();

    debug!("Parsed {} usage events", events.len());
    Ok(events)
}

fn parse_transcript(path: &Path) -> Vec<UsageEvent> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            debug!("Skipping {}: {}", path.display(), err);
            return Vec::new();
        }
    };
    content.lines().filter_map(parse_line).collect()
}

/// Parse one transcript line into a usage event, or `None` if the line is
/// blank, malformed, or carries no usage data.
fn parse_line(line: &str) -> Option<UsageEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let record: TranscriptLine = serde_json::from_str(line).ok()?;
    let message = record.message?;
    let usage = message.usage?;
    let timestamp = DateTime::parse_from_rfc3339(&record.timestamp?)
        .ok()?
        .with_timezone(&Utc);

    Some(UsageEvent {
        timestamp,
        model: message.model.unwrap_or_else(|| "unknown".to_string()),
        usage,
    })
}

/// Keep only events within `days_back` days of the latest event seen.
pub fn filter_recent(events: Vec<UsageEvent>, days_back: i64) -> Vec<UsageEvent> {
    let Some(latest) = events.iter().map(|e| e.timestamp).max() else {
        return events;
    };
    let cutoff = latest - Duration::days(days_back);
    events
        .into_iter()
        .filter(|event| event.timestamp >= cutoff)
        .collect()
}
