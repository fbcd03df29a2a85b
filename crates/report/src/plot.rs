use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use loanlog_core::error::{LoanlogError, Result};
use loanlog_core::model::record::LogRecord;
use loanlog_core::time::floor_to_bucket;

pub const CHART_FILE: &str = "operations_over_time.png";
#[cfg(feature = "plot")]
const CHART_SIZE: (u32, u32) = (1200, 600);
#[cfg(feature = "plot")]
const CHART_FONT: &str = "sans-serif";
#[cfg(feature = "plot")]
static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Per-operation counts keyed by bucket start.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    pub bucket: Duration,
    pub counts: BTreeMap<String, BTreeMap<NaiveDateTime, usize>>,
    pub untimed: usize,
}

impl TimeSeries {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(String::as_str)
    }

    pub fn buckets(&self) -> BTreeSet<NaiveDateTime> {
        self.counts
            .values()
            .flat_map(|per_bucket| per_bucket.keys().copied())
            .collect()
    }

    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let buckets = self.buckets();
        Some((*buckets.first()?, *buckets.last()?))
    }

    pub fn max_count(&self) -> usize {
        self.counts
            .values()
            .flat_map(|per_bucket| per_bucket.values().copied())
            .max()
            .unwrap_or(0)
    }

    /// One point per bucket seen anywhere in the series, zero-filled.
    pub fn dense_points(&self, operation: &str) -> Vec<(NaiveDateTime, usize)> {
        let per_bucket = self.counts.get(operation);
        self.buckets()
            .into_iter()
            .map(|b| {
                let n = per_bucket.and_then(|m| m.get(&b)).copied().unwrap_or(0);
                (b, n)
            })
            .collect()
    }
}

pub fn bucket_operations(records: &[LogRecord], bucket: Duration) -> TimeSeries {
    let mut series = TimeSeries {
        bucket,
        counts: BTreeMap::new(),
        untimed: 0,
    };
    for record in records {
        let Some(ts) = record.parsed_ts else {
            series.untimed += 1;
            continue;
        };
        *series
            .counts
            .entry(record.operation().to_string())
            .or_default()
            .entry(floor_to_bucket(ts, bucket))
            .or_insert(0) += 1;
    }
    series
}

pub fn is_available() -> bool {
    cfg!(feature = "plot")
}

#[cfg(feature = "plot")]
pub fn render_chart(series: &TimeSeries, path: &Path) -> Result<()> {
    use plotters::prelude::*;

    let Some((first, last)) = series.span() else {
        return Err(LoanlogError::Plot(
            "no timestamped records to plot".to_string(),
        ));
    };
    let step = series.bucket.as_secs().max(1) as i64;
    let x_start = first.and_utc().timestamp();
    let x_end = last.and_utc().timestamp().max(x_start) + step;
    let y_end = series.max_count() as u64 + 1;

    register_chart_font()?;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Operations Over Time", (CHART_FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_start..x_end, 0u64..y_end)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc("Count")
        .x_labels(8)
        .x_label_formatter(&|secs| tick_label(*secs))
        .label_style((CHART_FONT, 14))
        .draw()
        .map_err(plot_err)?;

    for (idx, operation) in series.operations().enumerate() {
        let color = Palette99::pick(idx);
        let points = series
            .dense_points(operation)
            .into_iter()
            .map(|(ts, n)| (ts.and_utc().timestamp(), n as u64));
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(plot_err)?
            .label(operation)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((CHART_FONT, 14))
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    tracing::debug!(path = %path.display(), operations = series.counts.len(), "rendered chart");
    Ok(())
}

#[cfg(not(feature = "plot"))]
pub fn render_chart(_series: &TimeSeries, path: &Path) -> Result<()> {
    Err(LoanlogError::Unavailable(format!(
        "cannot render {}: built without the `plot` feature",
        path.display()
    )))
}

/// Text needs a registered font; the bitmap backend has none of its own.
#[cfg(feature = "plot")]
fn register_chart_font() -> Result<()> {
    use std::sync::OnceLock;

    use plotters::style::{FontStyle, register_font};

    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED
        .get_or_init(|| register_font(CHART_FONT, FontStyle::Normal, DEJAVU_SANS).is_ok());
    if ok {
        Ok(())
    } else {
        Err(LoanlogError::Plot("embedded chart font is invalid".to_string()))
    }
}

#[cfg(feature = "plot")]
fn tick_label(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|ts| ts.format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

#[cfg(feature = "plot")]
fn plot_err<E: std::fmt::Display>(err: E) -> LoanlogError {
    LoanlogError::Plot(err.to_string())
}
