use std::str::FromStr;

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::error::{LoanlogError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Critical)
    }
}

impl FromStr for Severity {
    type Err = LoanlogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(LoanlogError::Parse(format!("unknown severity: {s}"))),
        }
    }
}

/// Operation names the job emits while talking to its database.
pub const DATABASE_OPERATION_PATTERNS: &[&str] =
    &["db_*", "*database*", "*query*", "check_loans_table"];

/// Glob-based membership test over operation names.
#[derive(Debug, Clone)]
pub struct OperationMatcher {
    patterns: Vec<Pattern>,
}

impl OperationMatcher {
    pub fn new(patterns: &[&str]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| LoanlogError::Parse(format!("invalid operation pattern {p}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn database() -> Self {
        Self::new(DATABASE_OPERATION_PATTERNS).expect("database operation patterns are valid")
    }

    pub fn matches(&self, operation: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(operation))
    }
}
