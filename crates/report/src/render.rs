use std::collections::HashMap;

use crate::aggregate::{RecentError, Tallies, percentage};

pub const BASIC_REPORT: &str = "basic_report.txt";
pub const EMAIL_REPORT: &str = "email_report.txt";
pub const DATABASE_REPORT: &str = "database_report.txt";
pub const ERROR_REPORT: &str = "error_report.txt";
pub const OPERATION_REPORT: &str = "operation_report.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub name: &'static str,
    pub file_name: &'static str,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub top_operations: usize,
    pub top_recipients: usize,
    pub extended: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            top_operations: 10,
            top_recipients: 5,
            extended: false,
        }
    }
}

pub fn render_reports(t: &Tallies, opts: &RenderOptions) -> Vec<Report> {
    let mut reports = vec![
        basic_report(t, opts.top_operations),
        email_report(t, opts.top_recipients),
        database_report(t),
    ];
    if opts.extended {
        reports.push(error_report(t));
        reports.push(operation_report(t));
    }
    reports
}

pub fn basic_report(t: &Tallies, top_operations: usize) -> Report {
    let mut out = TextReport::new("BASIC LOG REPORT");
    out.blank();
    out.line("Log Levels:");
    out.rows(&t.levels, None);
    out.blank();
    out.line("Operations:");
    out.rows(&t.operations.counts, Some(top_operations));
    out.blank();
    out.line("Error Types:");
    out.rows(&t.errors.by_type, None);
    out.blank();
    out.line("Recent Errors:");
    out.recent(t.errors.recent_newest_first());
    out.finish("Basic", BASIC_REPORT)
}

pub fn email_report(t: &Tallies, top_recipients: usize) -> Report {
    let email = &t.email;
    let mut out = TextReport::new("EMAIL REPORT");
    out.line(format!("Total emails: {}", email.attempted));
    out.line(format!("Successful emails: {}", email.succeeded));
    out.line(format!("Failed emails: {}", email.failed));
    out.blank();
    out.line("Top recipients:");
    out.rows(&email.recipients, Some(top_recipients));
    out.finish("Email", EMAIL_REPORT)
}

pub fn database_report(t: &Tallies) -> Report {
    let db = &t.database;
    let mut out = TextReport::new("DATABASE REPORT");
    out.line("Database operations:");
    out.rows(&db.operations, None);
    out.blank();
    out.line(format!(
        "Database error rate: {}",
        format_rate(db.failed, db.total)
    ));
    out.blank();
    out.line("Record counts by table:");
    out.rows(&db.table_records, None);
    out.finish("Database", DATABASE_REPORT)
}

pub fn error_report(t: &Tallies) -> Report {
    let errors = &t.errors;
    let mut out = TextReport::new("ERROR REPORT");
    out.line(format!("Total errors: {}", errors.total));
    out.blank();
    out.line("Error types:");
    out.rows(&errors.by_type, None);
    out.blank();
    out.line("Operations with errors:");
    out.rows(&errors.by_operation, None);
    out.blank();
    out.line("Most recent errors:");
    out.recent(errors.recent_newest_first());
    out.finish("Error", ERROR_REPORT)
}

pub fn operation_report(t: &Tallies) -> Report {
    let ops = &t.operations;
    let mut out = TextReport::new("OPERATION REPORT");
    out.line("Operations count:");
    out.rows(&ops.counts, None);
    out.blank();
    out.line("Operation success rates:");
    let ordered = sorted_counts(&ops.counts);
    if ordered.is_empty() {
        out.line("  (none)");
    }
    for (operation, _) in ordered {
        let outcome = ops.outcomes.get(operation).copied().unwrap_or_default();
        out.line(format!(
            "  {operation}: {}",
            format_rate(outcome.succeeded, outcome.total)
        ));
    }
    out.finish("Operation", OPERATION_REPORT)
}

/// `50.0% (1/2)`, or `N/A (0/0)` for an empty denominator.
pub fn format_rate(numerator: usize, denominator: usize) -> String {
    match percentage(numerator, denominator) {
        Some(rate) => format!("{rate:.1}% ({numerator}/{denominator})"),
        None => format!("N/A ({numerator}/{denominator})"),
    }
}

/// Descending by count, ties by key ascending.
pub fn sorted_counts<V: Ord + Copy>(counts: &HashMap<String, V>) -> Vec<(&str, V)> {
    let mut rows = counts
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    rows
}

struct TextReport {
    body: String,
}

impl TextReport {
    fn new(title: &str) -> Self {
        Self {
            body: format!("=== {title} ===\n"),
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.body.push_str(text.as_ref());
        self.body.push('\n');
    }

    fn blank(&mut self) {
        self.body.push('\n');
    }

    fn rows<V: Ord + Copy + std::fmt::Display>(
        &mut self,
        counts: &HashMap<String, V>,
        limit: Option<usize>,
    ) {
        let rows = sorted_counts(counts);
        let limit = limit.unwrap_or(rows.len());
        if rows.is_empty() || limit == 0 {
            self.line("  (none)");
            return;
        }
        for (key, count) in rows.into_iter().take(limit) {
            self.line(format!("  {key}: {count}"));
        }
    }

    fn recent<'a>(&mut self, errors: impl Iterator<Item = &'a RecentError>) {
        let mut any = false;
        for err in errors {
            any = true;
            self.line(format!(
                "  [{}] {}",
                err.timestamp.as_deref().unwrap_or("Unknown time"),
                err.message.as_deref().unwrap_or("No message")
            ));
        }
        if !any {
            self.line("  (none)");
        }
    }

    fn finish(self, name: &'static str, file_name: &'static str) -> Report {
        Report {
            name,
            file_name,
            body: self.body,
        }
    }
}
