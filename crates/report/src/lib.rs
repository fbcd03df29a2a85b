pub mod aggregate;
pub mod plot;
pub mod render;
pub mod write;

pub use aggregate::{AggregateOptions, Tallies, aggregate};
pub use render::{RenderOptions, Report, render_reports};
pub use write::{ReportDir, write_reports};
