use std::fs;
use std::io;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{Value, json};

const LOAN_OPERATIONS: &[&str] = &[
    "payment_reminder",
    "due_date_reminder",
    "apply_penalty",
    "send_statement",
    "record_payment",
];
const LOAN_ERRORS: &[&str] = &[
    "DatabaseError",
    "ConnectionError",
    "ValidationError",
    "TimeoutError",
];

/// Deterministic generator for JSON-lines logs shaped like the notification
/// job's output. Each appended line is 90 seconds after the previous one.
#[derive(Debug, Clone)]
pub struct ExampleLog {
    next_ts: NaiveDateTime,
    lines: Vec<String>,
}

impl Default for ExampleLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ExampleLog {
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2025, 3, 22)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        Self {
            next_ts: start,
            lines: Vec::new(),
        }
    }

    pub fn entry(mut self, level: &str, message: &str, extra: Option<Value>) -> Self {
        let mut line = json!({
            "timestamp": self.next_ts.format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
            "level": level,
            "logger": "root",
            "message": message,
            "module": "loans",
        });
        if let Some(extra) = extra {
            line["extra"] = extra;
        }
        self.lines.push(line.to_string());
        self.next_ts += Duration::seconds(90);
        self
    }

    /// `info` successful and `errors` failed loan operations, cycling through
    /// the job's operation names and error types.
    pub fn operations(mut self, info: usize, errors: usize) -> Self {
        for i in 0..info {
            let op = LOAN_OPERATIONS[i % LOAN_OPERATIONS.len()];
            let loan_id = format!("LOAN-{:04}", i + 1);
            self = self.entry(
                "INFO",
                &format!("Successfully performed {op} for loan {loan_id}"),
                Some(json!({
                    "operation": op,
                    "loan": {"loan_id": loan_id, "status": "active"},
                    "success": true,
                })),
            );
        }
        for i in 0..errors {
            let op = LOAN_OPERATIONS[i % LOAN_OPERATIONS.len()];
            let error_type = LOAN_ERRORS[i % LOAN_ERRORS.len()];
            let message = format!("Failed to perform {op}: {error_type}");
            self = self.entry(
                "ERROR",
                &message,
                Some(json!({
                    "operation": op,
                    "success": false,
                    "error_type": error_type,
                    "error": message,
                })),
            );
        }
        self
    }

    pub fn email(self, recipient: &str, delivered: bool) -> Self {
        if delivered {
            self.entry(
                "INFO",
                &format!("Email sent to {recipient}"),
                Some(json!({
                    "operation": "send_email",
                    "recipient": recipient,
                    "subject": "Payment Reminder",
                    "success": true,
                })),
            )
        } else {
            self.entry(
                "ERROR",
                "Failed to send email: SMTPError",
                Some(json!({
                    "operation": "send_email",
                    "recipient": recipient,
                    "subject": "Payment Reminder",
                    "success": false,
                    "error_type": "SMTPError",
                })),
            )
        }
    }

    pub fn db(self, operation: &str, table: &str, record_count: Option<u64>, ok: bool) -> Self {
        let mut extra = json!({
            "operation": operation,
            "table": table,
            "success": ok,
        });
        if let Some(count) = record_count {
            extra["record_count"] = json!(count);
        }
        if ok {
            self.entry(
                "INFO",
                &format!("Database {operation} on {table} table completed"),
                Some(extra),
            )
        } else {
            extra["error_type"] = json!("DatabaseError");
            self.entry(
                "ERROR",
                &format!("Database error during {operation} on {table}"),
                Some(extra),
            )
        }
    }

    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_text(&self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_text())
    }
}

/// Two emails (one delivered, one failed) and two database queries (one
/// failed).
pub fn email_db_sample() -> ExampleLog {
    ExampleLog::new()
        .email("client01@example.com", true)
        .email("client02@example.com", false)
        .db("db_query", "loans", Some(42), true)
        .db("db_query", "payments", None, false)
}
