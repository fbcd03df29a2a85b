use std::fs;
use std::path::Path;

use loanlog_core::error::{LoanlogError, Result};
use loanlog_core::model::record::LogRecord;

use crate::decode::decode_line;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub reason: String,
    pub preview: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    pub records: Vec<LogRecord>,
    /// The first decoded line as written, extra keys included.
    pub first_entry: Option<serde_json::Value>,
    pub total_lines: usize,
    pub blank_lines: usize,
    pub skipped: Vec<SkippedLine>,
}

impl ReadOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Reads a JSON-lines log file. Only an unreadable file is an error; bad lines
/// end up in [`ReadOutcome::skipped`].
pub fn read_log_file(path: &Path) -> Result<ReadOutcome> {
    let raw = fs::read_to_string(path)
        .map_err(|e| LoanlogError::Io(format!("failed reading {}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "opened log file");
    Ok(read_log_str(&raw))
}

pub fn read_log_str(raw: &str) -> ReadOutcome {
    let mut out = ReadOutcome::default();
    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        out.total_lines += 1;

        let line = line.trim();
        if line.is_empty() {
            out.blank_lines += 1;
            continue;
        }

        match decode_line(line) {
            Ok(record) => {
                if out.first_entry.is_none() {
                    out.first_entry = serde_json::from_str(line).ok();
                }
                out.records.push(record);
            }
            Err(err) => {
                tracing::warn!(line = line_no, error = %err, "skipping malformed log line");
                out.skipped.push(SkippedLine {
                    line_no,
                    reason: err.to_string(),
                    preview: line.chars().take(PREVIEW_CHARS).collect(),
                });
            }
        }
    }

    tracing::debug!(
        lines = out.total_lines,
        records = out.records.len(),
        blank = out.blank_lines,
        skipped = out.skipped.len(),
        "finished reading log"
    );
    out
}
