//! Output layout and report persistence
//!
//! ```text
//! output/
//! ├── news.xlsx          # report, removed before each run
//! └── images/            # cleared before each run
//!     ├── {id}.jpg
//!     └── ...
//! ```

pub mod report;

pub use report::{ReportSink, XlsxReportSink, REPORT_HEADERS};

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::Result;

/// Resolved output paths for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    report_path: PathBuf,
    images_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>, report_filename: &str, images_subdir: &str) -> Self {
        let root = root.into();
        Self {
            report_path: root.join(report_filename),
            images_dir: root.join(images_subdir),
            root,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(&config.dir, &config.report_filename, &config.images_subdir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Create the output root and start from an empty image directory
    ///
    /// The previous report and its images are deleted, so a run that fails
    /// afterwards leaves no report behind.
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        if self.report_path.exists() {
            tracing::info!(path = %self.report_path.display(), "Removing previous report");
            fs::remove_file(&self.report_path)?;
        }

        if self.images_dir.exists() {
            tracing::info!(path = %self.images_dir.display(), "Clearing previous images");
            fs::remove_dir_all(&self.images_dir)?;
        }
        fs::create_dir_all(&self.images_dir)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = OutputLayout::new("out", "news.xlsx", "images");
        assert_eq!(layout.report_path(), Path::new("out/news.xlsx"));
        assert_eq!(layout.images_dir(), Path::new("out/images"));
    }

    #[test]
    fn test_prepare_clears_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path(), "news.xlsx", "images");

        layout.prepare().unwrap();
        let stale = layout.images_dir().join("stale.jpg");
        fs::write(&stale, b"old").unwrap();
        let report = layout.report_path().to_path_buf();
        fs::write(&report, b"old report").unwrap();

        layout.prepare().unwrap();

        assert!(layout.images_dir().is_dir());
        assert!(!stale.exists());
        assert!(!report.exists());
    }
}
