use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

use loanlog_core::filter::OperationMatcher;
use loanlog_core::model::record::LogRecord;
use regex::Regex;

pub const EMAIL_OPERATION: &str = "send_email";
pub const UNKNOWN_ERROR: &str = "UnknownError";

pub type Counts = HashMap<String, usize>;

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub recent_errors: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { recent_errors: 5 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default)]
pub struct OperationTally {
    pub counts: Counts,
    pub outcomes: HashMap<String, Outcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentError {
    pub timestamp: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorTally {
    pub total: usize,
    pub by_type: Counts,
    pub by_operation: Counts,
    recent: VecDeque<RecentError>,
}

impl ErrorTally {
    pub fn recent_newest_first(&self) -> impl Iterator<Item = &RecentError> {
        self.recent.iter().rev()
    }

    fn remember(&mut self, record: &LogRecord, window: usize) {
        if window == 0 {
            return;
        }
        if self.recent.len() == window {
            self.recent.pop_front();
        }
        self.recent.push_back(RecentError {
            timestamp: record.timestamp.clone(),
            message: record.message.clone(),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmailStats {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub recipients: Counts,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    pub operations: Counts,
    pub total: usize,
    pub failed: usize,
    pub table_records: HashMap<String, u64>,
}

impl DatabaseStats {
    /// Failed share of database operations as a percentage, `None` when no
    /// database operation was seen.
    pub fn error_rate(&self) -> Option<f64> {
        percentage(self.failed, self.total)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tallies {
    pub total_records: usize,
    pub levels: Counts,
    pub operations: OperationTally,
    pub errors: ErrorTally,
    pub email: EmailStats,
    pub database: DatabaseStats,
}

pub fn percentage(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64 * 100.0)
}

pub fn aggregate(records: &[LogRecord], opts: &AggregateOptions) -> Tallies {
    let db_ops = OperationMatcher::database();
    let mut t = Tallies::default();

    for record in records {
        t.total_records += 1;
        bump(&mut t.levels, record.level_label());

        let operation = record.operation();
        let failed = record.is_failure();
        bump(&mut t.operations.counts, operation);
        let outcome = t
            .operations
            .outcomes
            .entry(operation.to_string())
            .or_default();
        outcome.total += 1;
        if !failed {
            outcome.succeeded += 1;
        }

        if record.is_error() {
            t.errors.total += 1;
            bump(&mut t.errors.by_type, &classify_error(record));
            bump(&mut t.errors.by_operation, operation);
            t.errors.remember(record, opts.recent_errors);
        }

        if operation == EMAIL_OPERATION {
            t.email.attempted += 1;
            if failed {
                t.email.failed += 1;
            } else {
                t.email.succeeded += 1;
            }
            if let Some(recipient) = record.extra.str("recipient") {
                bump(&mut t.email.recipients, recipient);
            }
        }

        if db_ops.matches(operation) {
            t.database.total += 1;
            if failed {
                t.database.failed += 1;
            }
            bump(&mut t.database.operations, operation);
            if let Some(table) = record.extra.str("table") {
                let sum = t
                    .database
                    .table_records
                    .entry(table.to_string())
                    .or_insert(0);
                *sum = sum.saturating_add(record_count(record));
            }
        }
    }

    tracing::debug!(
        records = t.total_records,
        errors = t.errors.total,
        emails = t.email.attempted,
        db_ops = t.database.total,
        "aggregated log records"
    );
    t
}

/// `extra.error_type` wins; otherwise the last exception-like word of the
/// message; otherwise [`UNKNOWN_ERROR`].
pub fn classify_error(record: &LogRecord) -> String {
    if let Some(kind) = record.extra.str("error_type").map(str::trim)
        && !kind.is_empty()
    {
        return kind.to_string();
    }
    record
        .message
        .as_deref()
        .and_then(error_type_from_message)
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

/// Last word shaped like `SomethingError` or `pkg.SomethingException`. The
/// module prefix is dropped and bare `Error`/`Exception` is ignored.
pub fn error_type_from_message(message: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:[A-Za-z_][A-Za-z0-9_]*\.)*([A-Z][A-Za-z0-9_]*(?:Error|Exception))\b")
            .expect("error type pattern is valid")
    });

    pattern
        .captures_iter(message)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|word| *word != "Error" && *word != "Exception")
        .last()
}

fn record_count(record: &LogRecord) -> u64 {
    match record.extra.number("record_count") {
        Some(n) if n.is_finite() && n >= 0.0 => n as u64,
        _ => 0,
    }
}

fn bump(counts: &mut Counts, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}
