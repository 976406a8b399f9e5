//! Spreadsheet report output
//!
//! The report has one header row and one row per record. Column order and
//! header text are a stable contract for downstream consumers.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::{Path, PathBuf};

use crate::models::NewsRecord;
use crate::utils::error::ReportWriteError;

/// Report header, in column order
pub const REPORT_HEADERS: [&str; 6] = [
    "Title",
    "Date",
    "Description",
    "Picture Filename",
    "Search Phrase Count",
    "Contains Money",
];

/// Persists the accumulated records of a run
pub trait ReportSink: Send + Sync {
    /// Write all records, replacing any previous report
    ///
    /// Returns the path of the written report.
    fn write(&self, records: &[NewsRecord]) -> Result<PathBuf, ReportWriteError>;
}

/// Writes the report as an `.xlsx` workbook
#[derive(Debug, Clone)]
pub struct XlsxReportSink {
    path: PathBuf,
}

impl XlsxReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn build_workbook(records: &[NewsRecord]) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in REPORT_HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet.write_string(row, 0, record.title.as_str())?;
            worksheet.write_string(row, 1, record.date.as_str())?;
            worksheet.write_string(row, 2, record.description.as_str())?;
            worksheet.write_string(row, 3, record.picture_filename.as_str())?;
            worksheet.write_number(row, 4, f64::from(record.search_phrase_count))?;
            worksheet.write_boolean(row, 5, record.contains_money)?;
        }

        worksheet.set_column_width(0, 60.0)?;
        worksheet.set_column_width(1, 12.0)?;
        worksheet.set_column_width(2, 80.0)?;
        worksheet.set_column_width(3, 30.0)?;

        Ok(workbook)
    }
}

impl ReportSink for XlsxReportSink {
    fn write(&self, records: &[NewsRecord]) -> Result<PathBuf, ReportWriteError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ReportWriteError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let workbook_error = |source: XlsxError| ReportWriteError::Workbook {
            path: self.path.clone(),
            source,
        };

        let mut workbook = Self::build_workbook(records).map_err(workbook_error)?;
        workbook.save(&self.path).map_err(workbook_error)?;

        tracing::info!(path = %self.path.display(), rows = records.len(), "News written to report");
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> NewsRecord {
        NewsRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            date: "2024-06-01".to_string(),
            description: "Something about $5".to_string(),
            picture_filename: NewsRecord::picture_filename_for(id),
            search_phrase_count: 2,
            contains_money: true,
        }
    }

    #[test]
    fn test_header_order() {
        assert_eq!(REPORT_HEADERS[0], "Title");
        assert_eq!(REPORT_HEADERS[3], "Picture Filename");
        assert_eq!(REPORT_HEADERS[5], "Contains Money");
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = XlsxReportSink::new(dir.path().join("nested").join("news.xlsx"));

        let path = sink.write(&[record("a"), record("b")]).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_write_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let sink = XlsxReportSink::new(dir.path().join("news.xlsx"));

        assert!(sink.write(&[]).is_ok());
    }

    #[test]
    fn test_write_into_missing_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not a directory").unwrap();

        let sink = XlsxReportSink::new(blocker.join("news.xlsx"));
        assert!(sink.write(&[record("a")]).is_err());
    }
}
