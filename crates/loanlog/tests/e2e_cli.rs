use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use testkit::{ExampleLog, email_db_sample};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_loanlog")
}

fn loanlog(temp: &Path) -> Command {
    let mut cmd = Command::new(bin());
    cmd.env("LOANLOG_CONFIG", temp.join("no-config.toml"))
        .env_remove("LOANLOG_OUTPUT_DIR")
        .env_remove("LOANLOG_RECENT_ERRORS")
        .env_remove("LOANLOG_TOP_OPERATIONS")
        .env_remove("LOANLOG_TOP_RECIPIENTS")
        .env_remove("LOANLOG_PLOT_BUCKET")
        .env_remove("LOANLOG_EXTENDED")
        .env_remove("RUST_LOG");
    cmd
}

fn analyze(temp: &Path, log: &Path, out: &Path, extra_args: &[&str]) -> Output {
    loanlog(temp)
        .arg(log)
        .arg("--output")
        .arg(out)
        .args(extra_args)
        .output()
        .unwrap()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn e2e_sample_email_and_database_reports() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("loan_system.log");
    email_db_sample().write_to(&log).unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &log, &out, &[]);
    assert!(output.status.success(), "{output:?}");

    let email = read(&out.join("email_report.txt"));
    assert!(email.starts_with("=== EMAIL REPORT ===\n"));
    assert!(email.contains("Total emails: 2\nSuccessful emails: 1\nFailed emails: 1\n"));

    let database = read(&out.join("database_report.txt"));
    assert!(database.contains("Database error rate: 50.0% (1/2)\n"));
    assert!(database.contains("  loans: 42\n"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Wrote report to"));
    assert!(stdout.contains("Analysis complete."));
}

#[test]
fn e2e_generated_log_level_counts() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    ExampleLog::new().operations(17, 6).write_to(&log).unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &log, &out, &[]);
    assert!(output.status.success(), "{output:?}");

    let basic = read(&out.join("basic_report.txt"));
    let lines: Vec<_> = basic.lines().map(str::trim).collect();
    assert!(lines.contains(&"INFO: 17"), "{basic}");
    assert!(lines.contains(&"ERROR: 6"), "{basic}");
}

#[test]
fn e2e_malformed_only_log_still_reports() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("broken.log");
    fs::write(&log, "not json\n{\"level\":\n\n42\n").unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &log, &out, &["--extended", "--debug"]);
    assert!(output.status.success(), "{output:?}");

    let email = read(&out.join("email_report.txt"));
    assert!(email.contains("Total emails: 0\n"));
    assert!(email.contains("Failed emails: 0\n"));
    assert!(read(&out.join("database_report.txt")).contains("Database error rate: N/A (0/0)\n"));
    assert!(read(&out.join("error_report.txt")).contains("Total errors: 0\n"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Skipped 3 malformed lines"), "{stdout}");
}

#[test]
fn e2e_empty_file_exits_zero() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("empty.log");
    fs::write(&log, "").unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &log, &out, &[]);
    assert!(output.status.success(), "{output:?}");
    assert!(read(&out.join("basic_report.txt")).contains("Log Levels:\n  (none)\n"));
}

#[test]
fn e2e_missing_log_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &temp.path().join("absent.log"), &out, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read log file"), "{stderr}");
    assert!(!out.join("basic_report.txt").exists());
}

#[test]
fn e2e_extended_mode_writes_five_reports() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    ExampleLog::new()
        .operations(4, 2)
        .email("client01@example.com", true)
        .write_to(&log)
        .unwrap();

    let plain = temp.path().join("plain");
    assert!(analyze(temp.path(), &log, &plain, &[]).status.success());
    assert!(!plain.join("error_report.txt").exists());
    assert!(!plain.join("operation_report.txt").exists());

    let extended = temp.path().join("extended");
    assert!(analyze(temp.path(), &log, &extended, &["--extended"]).status.success());
    for name in [
        "basic_report.txt",
        "email_report.txt",
        "database_report.txt",
        "error_report.txt",
        "operation_report.txt",
    ] {
        assert!(extended.join(name).exists(), "missing {name}");
    }
    let errors = read(&extended.join("error_report.txt"));
    assert!(errors.starts_with("=== ERROR REPORT ===\nTotal errors: 2\n"));
}

#[test]
fn e2e_runs_are_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    ExampleLog::new()
        .operations(23, 9)
        .email("client01@example.com", true)
        .email("client02@example.com", false)
        .email("client03@example.com", true)
        .db("query_loans", "loans", Some(12), true)
        .db("query_payments", "payments", Some(30), true)
        .db("check_database_connection", "loans", None, false)
        .write_to(&log)
        .unwrap();

    let first = temp.path().join("first");
    let second = temp.path().join("second");
    assert!(analyze(temp.path(), &log, &first, &["--extended"]).status.success());
    assert!(analyze(temp.path(), &log, &second, &["--extended"]).status.success());

    for entry in fs::read_dir(&first).unwrap() {
        let name = entry.unwrap().file_name();
        assert_eq!(
            fs::read(first.join(&name)).unwrap(),
            fs::read(second.join(&name)).unwrap(),
            "{name:?} differs between runs"
        );
    }
}

#[test]
fn e2e_config_file_sets_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    let mut sample = ExampleLog::new();
    for i in 0..4 {
        sample = sample.entry("ERROR", &format!("Failed run {i}: TimeoutError"), None);
    }
    sample.write_to(&log).unwrap();

    let out = temp.path().join("from-config");
    let config = temp.path().join("loanlog.toml");
    fs::write(
        &config,
        format!(
            "output_dir = {:?}\nrecent_errors = 2\nextended = true\n",
            out.display().to_string()
        ),
    )
    .unwrap();

    let output = loanlog(temp.path())
        .env("LOANLOG_CONFIG", &config)
        .arg(&log)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");

    let errors = read(&out.join("error_report.txt"));
    let recent = errors.split("Most recent errors:\n").nth(1).unwrap();
    assert_eq!(recent.lines().count(), 2);
    assert!(recent.contains("Failed run 3: TimeoutError"));
    assert!(errors.contains("  TimeoutError: 4\n"));
}

#[test]
fn e2e_bad_env_config_fails() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    ExampleLog::new().operations(1, 0).write_to(&log).unwrap();

    let output = loanlog(temp.path())
        .env("LOANLOG_RECENT_ERRORS", "lots")
        .arg(&log)
        .arg("--output")
        .arg(temp.path().join("out"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("LOANLOG_RECENT_ERRORS"));
}

#[test]
fn e2e_output_path_that_is_a_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("loan_system.log");
    email_db_sample().write_to(&log).unwrap();
    let blocker = temp.path().join("reports");
    fs::write(&blocker, "not a directory").unwrap();

    let output = analyze(temp.path(), &log, &blocker, &[]);
    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Analysis complete."), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("write reports to"), "{stderr}");
    assert_eq!(read(&blocker), "not a directory");
}

#[test]
fn e2e_missing_argument_is_usage_error() {
    let temp = tempfile::tempdir().unwrap();
    let output = loanlog(temp.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[cfg(feature = "plot")]
#[test]
fn e2e_plot_and_check_deps() {
    let temp = tempfile::tempdir().unwrap();
    let log = temp.path().join("example.log");
    ExampleLog::new().operations(40, 10).write_to(&log).unwrap();
    let out = temp.path().join("reports");

    let output = analyze(temp.path(), &log, &out, &["--plot"]);
    assert!(output.status.success(), "{output:?}");
    let png = fs::read(out.join("operations_over_time.png")).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");

    let deps = loanlog(temp.path()).arg("--check-deps").output().unwrap();
    assert!(deps.status.success());
    assert!(String::from_utf8_lossy(&deps.stdout).contains("All dependencies are installed."));
}
