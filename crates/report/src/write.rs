use std::fs;
use std::path::{Path, PathBuf};

use loanlog_core::error::{LoanlogError, Result};

use crate::render::Report;

/// Output directory for one run. Files are replaced wholesale on every write.
#[derive(Debug, Clone)]
pub struct ReportDir {
    path: PathBuf,
}

impl ReportDir {
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path).map_err(|e| {
            LoanlogError::Io(format!(
                "failed to create output dir {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn file(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    pub fn write(&self, report: &Report) -> Result<PathBuf> {
        let target = self.file(report.file_name);
        fs::write(&target, &report.body).map_err(|e| {
            LoanlogError::Io(format!("failed writing {}: {e}", target.display()))
        })?;
        tracing::debug!(path = %target.display(), bytes = report.body.len(), "wrote report");
        Ok(target)
    }
}

pub fn write_reports(dir: &Path, reports: &[Report]) -> Result<Vec<PathBuf>> {
    let out = ReportDir::open(dir)?;
    reports.iter().map(|r| out.write(r)).collect()
}
