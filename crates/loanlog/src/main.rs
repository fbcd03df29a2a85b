mod output;
mod telemetry;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use loanlog_core::config::Config;
use loanlog_core::model::record::LogRecord;
use loanlog_ingest::read_log_file;
use loanlog_report::aggregate::{AggregateOptions, aggregate};
use loanlog_report::plot::{self, CHART_FILE};
use loanlog_report::render::{RenderOptions, render_reports};
use loanlog_report::write::write_reports;

use crate::output::{
    print_capability, print_sample, print_skipped, print_summary, print_written,
};
use crate::telemetry::{LogFormat, init_cli_tracing};

#[derive(Parser, Debug)]
#[command(name = "loanlog")]
#[command(about = "Generate text reports from loan-servicing JSON logs")]
struct Cli {
    #[arg(
        required_unless_present = "check_deps",
        help = "Path to the JSON-lines log file"
    )]
    log_file: Option<PathBuf>,

    #[arg(short, long, help = "Output directory for reports")]
    output: Option<PathBuf>,

    #[arg(short, long, help = "Render operations_over_time.png")]
    plot: bool,

    #[arg(long, help = "Report optional capabilities and exit")]
    check_deps: bool,

    #[arg(short, long, help = "Debug logging, sample entry and skipped lines")]
    debug: bool,

    #[arg(long, help = "Also write error_report.txt and operation_report.txt")]
    extended: bool,
}

#[derive(Debug, Clone)]
struct RunOptions {
    config: Config,
    plot: bool,
    plotting_available: bool,
    debug: bool,
    color: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_cli_tracing(cli.debug, LogFormat::from_env());
    tracing::debug!("debug mode enabled");

    let plotting_available = plot::is_available();
    let color = std::io::stdout().is_terminal();

    if cli.check_deps {
        return Ok(check_deps(plotting_available, color));
    }

    let mut config = Config::load().context("load config")?;
    if let Some(v) = cli.output {
        config.output_dir = v;
    }
    if cli.extended {
        config.extended = true;
    }

    let Some(log_file) = cli.log_file else {
        anyhow::bail!("log file path is required");
    };

    run_analysis(
        &log_file,
        &RunOptions {
            config,
            plot: cli.plot,
            plotting_available,
            debug: cli.debug,
            color,
        },
    )?;
    Ok(ExitCode::SUCCESS)
}

fn run_analysis(log_file: &Path, opts: &RunOptions) -> anyhow::Result<()> {
    let cfg = &opts.config;
    tracing::info!(path = %log_file.display(), "loading logs");
    let read = read_log_file(log_file)
        .with_context(|| format!("cannot read log file {}", log_file.display()))?;

    if opts.debug {
        tracing::debug!(output_dir = %cfg.output_dir.display(), "resolved output directory");
        if let Some(first) = &read.first_entry {
            print_sample(first)?;
        }
        print_skipped(&read.skipped);
    }
    if read.records.is_empty() {
        tracing::warn!("no valid log records found, reports will be empty");
    }

    let tallies = aggregate(
        &read.records,
        &AggregateOptions {
            recent_errors: cfg.recent_errors,
        },
    );
    let reports = render_reports(
        &tallies,
        &RenderOptions {
            top_operations: cfg.top_operations,
            top_recipients: cfg.top_recipients,
            extended: cfg.extended,
        },
    );

    let written = write_reports(&cfg.output_dir, &reports)
        .with_context(|| format!("write reports to {}", cfg.output_dir.display()))?;
    for path in &written {
        print_written(path);
    }

    if opts.plot {
        render_plot(&read.records, opts, &cfg.output_dir.join(CHART_FILE));
    }

    print_summary(&read, &tallies, opts.color);
    println!("Analysis complete.");
    Ok(())
}

fn render_plot(records: &[LogRecord], opts: &RunOptions, path: &Path) {
    if !opts.plotting_available {
        tracing::warn!("plotting is unavailable in this build, skipping chart");
        return;
    }

    let series = plot::bucket_operations(records, opts.config.plot_bucket);
    if series.is_empty() {
        tracing::warn!(
            untimed = series.untimed,
            "no timestamped records, skipping chart"
        );
        return;
    }

    match plot::render_chart(&series, path) {
        Ok(()) => println!("Plot saved to {}", path.display()),
        Err(err) => tracing::warn!(error = %err, "failed to render chart"),
    }
}

fn check_deps(plotting_available: bool, color: bool) -> ExitCode {
    println!("Optional capabilities:");
    let detail = if plotting_available {
        "PNG charts via plotters"
    } else {
        "rebuild with the `plot` feature"
    };
    print_capability("plotting", plotting_available, detail, color);

    if plotting_available {
        println!("All dependencies are installed.");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
