use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{LoanlogError, Result};
use crate::time::parse_duration_str;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub recent_errors: usize,
    pub top_operations: usize,
    pub top_recipients: usize,
    pub plot_bucket: Duration,
    pub extended: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            recent_errors: 5,
            top_operations: 10,
            top_recipients: 5,
            plot_bucket: Duration::from_secs(60 * 60),
            extended: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    output_dir: Option<PathBuf>,
    recent_errors: Option<usize>,
    top_operations: Option<usize>,
    top_recipients: Option<usize>,
    plot_bucket: Option<String>,
    extended: Option<bool>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOANLOG_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("loanlog/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LoanlogError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LoanlogError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    Ok(ConfigOverrides {
        output_dir: env::var("LOANLOG_OUTPUT_DIR").ok().map(PathBuf::from),
        recent_errors: env_usize("LOANLOG_RECENT_ERRORS")?,
        top_operations: env_usize("LOANLOG_TOP_OPERATIONS")?,
        top_recipients: env_usize("LOANLOG_TOP_RECIPIENTS")?,
        plot_bucket: env::var("LOANLOG_PLOT_BUCKET").ok(),
        extended: env::var("LOANLOG_EXTENDED")
            .ok()
            .map(|v| parse_flag(&v))
            .transpose()?,
    })
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match env::var(key) {
        Ok(v) => v
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| LoanlogError::Config(format!("bad {key} in environment: {e}"))),
        Err(_) => Ok(None),
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(LoanlogError::Config(format!(
            "bad LOANLOG_EXTENDED in environment: expected a boolean, got {other}"
        ))),
    }
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.output_dir {
        cfg.output_dir = v;
    }
    if let Some(v) = overrides.recent_errors {
        cfg.recent_errors = v;
    }
    if let Some(v) = overrides.top_operations {
        cfg.top_operations = v;
    }
    if let Some(v) = overrides.top_recipients {
        cfg.top_recipients = v;
    }
    if let Some(v) = overrides.plot_bucket {
        let bucket = parse_duration_str(&v)
            .map_err(|e| LoanlogError::Config(format!("bad plot_bucket in {source}: {e}")))?;
        if bucket.as_secs() == 0 {
            return Err(LoanlogError::Config(format!(
                "bad plot_bucket in {source}: must be at least one second (value={v})"
            )));
        }
        cfg.plot_bucket = bucket;
    }
    if let Some(v) = overrides.extended {
        cfg.extended = v;
    }
    Ok(())
}
