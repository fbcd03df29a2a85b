use std::path::Path;

use loanlog_ingest::{ReadOutcome, SkippedLine};
use loanlog_report::Tallies;
use owo_colors::OwoColorize;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Warn,
    Bad,
}

pub fn print_written(path: &Path) {
    println!("Wrote report to {}", path.display());
}

pub fn print_summary(read: &ReadOutcome, tallies: &Tallies, color: bool) {
    println!(
        "Processed {} lines: {} records, {} skipped, {} errors, {} emails, {} database operations",
        read.total_lines,
        tallies.total_records,
        tone(read.skipped_count(), Tone::Warn, color),
        tone(tallies.errors.total, Tone::Bad, color),
        tallies.email.attempted,
        tallies.database.total,
    );
}

pub fn print_skipped(skipped: &[SkippedLine]) {
    println!("Skipped {} malformed lines", skipped.len());
    for line in skipped {
        println!("  line {}: {} | {}", line.line_no, line.reason, line.preview);
    }
}

pub fn print_sample(entry: &serde_json::Value) -> anyhow::Result<()> {
    println!("Sample log entry:");
    println!("{}", serde_json::to_string_pretty(entry)?);
    Ok(())
}

pub fn print_capability(name: &str, available: bool, detail: &str, color: bool) {
    let state = match (available, color) {
        (true, true) => "available".green().to_string(),
        (true, false) => "available".to_string(),
        (false, true) => "unavailable".red().to_string(),
        (false, false) => "unavailable".to_string(),
    };
    println!("  {name}: {state} ({detail})");
}

fn tone(n: usize, tone: Tone, color: bool) -> String {
    if !color || n == 0 {
        return n.to_string();
    }
    match tone {
        Tone::Warn => n.yellow().to_string(),
        Tone::Bad => n.red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tone_is_plain_without_color_or_when_zero() {
        assert_eq!(tone(3, Tone::Bad, false), "3");
        assert_eq!(tone(0, Tone::Bad, true), "0");
        assert_ne!(tone(3, Tone::Bad, true), "3");
    }
}
