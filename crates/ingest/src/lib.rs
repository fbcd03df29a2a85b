pub mod decode;
pub mod reader;

pub use reader::{ReadOutcome, SkippedLine, read_log_file, read_log_str};
