use chrono::NaiveDateTime;
use serde::Serialize;

use crate::filter::Severity;
use crate::model::extra::Extra;

pub const UNKNOWN_OPERATION: &str = "unknown";
pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogRecord {
    pub timestamp: Option<String>,
    #[serde(skip)]
    pub parsed_ts: Option<NaiveDateTime>,
    pub level: Option<String>,
    pub message: Option<String>,
    pub extra: Extra,
}

impl LogRecord {
    pub fn operation(&self) -> &str {
        self.extra.str("operation").unwrap_or(UNKNOWN_OPERATION)
    }

    pub fn level_label(&self) -> &str {
        self.level.as_deref().unwrap_or(UNKNOWN_LEVEL)
    }

    pub fn severity(&self) -> Option<Severity> {
        self.level.as_deref().and_then(|l| l.parse().ok())
    }

    pub fn is_error(&self) -> bool {
        self.severity().is_some_and(Severity::is_error)
    }

    /// Error level or an explicit `success: false` marks the record as failed.
    pub fn is_failure(&self) -> bool {
        self.is_error() || self.extra.bool("success") == Some(false)
    }
}
