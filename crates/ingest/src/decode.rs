use loanlog_core::error::{LoanlogError, Result};
use loanlog_core::model::extra::Extra;
use loanlog_core::model::record::LogRecord;
use loanlog_core::time::parse_log_timestamp;

/// Decodes one JSON log line. Only the JSON shape can fail: absent or
/// wrongly typed fields fall back to `None`.
pub fn decode_line(line: &str) -> Result<LogRecord> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|e| LoanlogError::Parse(format!("invalid json: {e}")))?;
    let serde_json::Value::Object(obj) = value else {
        return Err(LoanlogError::Parse(format!(
            "expected a json object, got {}",
            json_kind(&value)
        )));
    };

    let timestamp = string_field(obj.get("timestamp"));
    let parsed_ts = timestamp.as_deref().and_then(parse_log_timestamp);

    Ok(LogRecord {
        timestamp,
        parsed_ts,
        level: string_field(obj.get("level")).map(|l| l.trim().to_ascii_uppercase()),
        message: string_field(obj.get("message")),
        extra: Extra::from_json(obj.get("extra")),
    })
}

fn string_field(value: Option<&serde_json::Value>) -> Option<String> {
    match value {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
