use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoanlogError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, LoanlogError>;
