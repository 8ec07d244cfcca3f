//! CSV export of list views
//!
//! Failures never reach the caller: an empty dataset produces an info toast,
//! anything that goes wrong while writing produces an error toast.

use crate::notify::{Notifier, Toast};
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

/// MIME type declared for downloads
pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("row {index} could not be built: {reason}")]
    Row { index: usize, reason: String },
}

/// Where finished files go
pub trait DownloadSink: Send + Sync {
    fn download(&self, filename: &str, mime: &str, contents: &[u8]) -> Result<(), ExportError>;
}

/// Saves downloads into a directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn download(&self, filename: &str, _mime: &str, contents: &[u8]) -> Result<(), ExportError> {
        let path = self.dir.join(filename);
        std::fs::create_dir_all(&self.dir)
            .and_then(|_| std::fs::write(&path, contents))
            .map_err(|source| ExportError::Io { path, source })
    }
}

/// A file handed to a [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub mime: String,
    pub contents: Vec<u8>,
}

/// Keeps downloads in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    downloads: Mutex<Vec<Download>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn downloads(&self) -> Vec<Download> {
        self.downloads.lock().clone()
    }
}

impl DownloadSink for MemorySink {
    fn download(&self, filename: &str, mime: &str, contents: &[u8]) -> Result<(), ExportError> {
        self.downloads.lock().push(Download {
            filename: filename.to_string(),
            mime: mime.to_string(),
            contents: contents.to_vec(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Nothing to export; no file was produced
    Empty,
    Exported { filename: String, rows: usize },
    Failed,
}

/// Quote a cell if it contains a comma or a double quote
pub fn escape_cell(cell: &str) -> String {
    if cell.contains(',') || cell.contains('"') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Join rows into CSV text, one line per row, no trailing newline
pub fn to_csv<R, C>(rows: R) -> String
where
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| escape_cell(cell.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<prefix>_<YYYY-MM-DD>.csv`
pub fn export_filename(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Exports rows through a sink and reports the result as toasts
pub struct CsvExporter<'a> {
    sink: &'a dyn DownloadSink,
    notifier: &'a dyn Notifier,
    date: Option<NaiveDate>,
}

impl<'a> CsvExporter<'a> {
    pub fn new(sink: &'a dyn DownloadSink, notifier: &'a dyn Notifier) -> Self {
        Self {
            sink,
            notifier,
            date: None,
        }
    }

    /// Stamp files with `date` instead of today's UTC date
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Export `data` as CSV with `headers` as the first row
    ///
    /// A row mapper error aborts the export like a failed download does.
    pub fn export<T, F, E>(
        &self,
        data: &[T],
        headers: &[&str],
        filename_prefix: &str,
        map_row: F,
    ) -> ExportOutcome
    where
        F: FnMut(&T) -> Result<Vec<String>, E>,
        E: Display,
    {
        if data.is_empty() {
            self.notifier
                .notify(Toast::info("No Data", "There is no data to export."));
            return ExportOutcome::Empty;
        }

        match self.write(data, headers, filename_prefix, map_row) {
            Ok(filename) => {
                info!(%filename, rows = data.len(), "Exported csv");
                self.notifier.notify(Toast::success(
                    "Export Complete",
                    format!("Exported {} records to {}", data.len(), filename),
                ));
                ExportOutcome::Exported {
                    filename,
                    rows: data.len(),
                }
            }
            Err(e) => {
                error!(error = %e, prefix = filename_prefix, "CSV export failed");
                self.notifier.notify(Toast::error(
                    "Export Failed",
                    "An error occurred while exporting data. Please try again.",
                ));
                ExportOutcome::Failed
            }
        }
    }

    fn write<T, F, E>(
        &self,
        data: &[T],
        headers: &[&str],
        filename_prefix: &str,
        mut map_row: F,
    ) -> Result<String, ExportError>
    where
        F: FnMut(&T) -> Result<Vec<String>, E>,
        E: Display,
    {
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(data.len() + 1);
        rows.push(headers.iter().map(|h| h.to_string()).collect());
        for (index, item) in data.iter().enumerate() {
            let row = map_row(item).map_err(|e| ExportError::Row {
                index,
                reason: e.to_string(),
            })?;
            rows.push(row);
        }

        let date = self
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let filename = export_filename(filename_prefix, date);
        self.sink.download(&filename, CSV_MIME, to_csv(&rows).as_bytes())?;
        Ok(filename)
    }
}
