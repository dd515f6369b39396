//! Dated worksheet sink.
//!
//! Each run writes one worksheet named after the local date. Row 1 holds the
//! fixed header and article rows start at row 2, so the data range for 25
//! articles is `A2:E26`. Opening only checks that the destination is
//! writable; files are written on [`Sink::append`], which replaces any
//! worksheet an earlier run wrote for the same day.

use super::{Sink, json, markdown};
use crate::error::NewsError;
use crate::utils::ensure_writable_dir;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, instrument};

/// Column titles in row 1.
pub const HEADER: [&str; 5] = ["Date", "Title", "Link", "Summary", "Translated Title"];

/// First row used for data (1-based, after the header).
pub const FIRST_DATA_ROW: usize = 2;

/// One day's worksheet: a fixed header plus one row per article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    /// Local date (`YYYY-MM-DD`); also the file stem.
    pub title: String,
    /// Column titles for row 1, see [`HEADER`].
    pub header: Vec<String>,
    /// 1-based row of the first article.
    pub start_row: usize,
    /// Cells in [`HEADER`] order, in rank order.
    pub rows: Vec<Vec<String>>,
}

impl Worksheet {
    /// Empty worksheet with the standard header.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            header: HEADER.iter().map(|h| h.to_string()).collect(),
            start_row: FIRST_DATA_ROW,
            rows: Vec::new(),
        }
    }

    /// A1-style range covered by the data rows, e.g. `A2:E26`.
    pub fn data_range(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }
        let last_col = column_letter(self.header.len().max(1) - 1);
        let last_row = self.start_row + self.rows.len() - 1;
        Some(format!("A{}:{}{}", self.start_row, last_col, last_row))
    }
}

/// Zero-based column index to its letter name (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letter(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.iter().rev().collect()
}

/// Sink writing the worksheet as JSON plus a Markdown table.
#[derive(Debug)]
pub struct SheetSink {
    dir: String,
    worksheet: Worksheet,
}

impl SheetSink {
    /// Open the worksheet for `date` under `dir`.
    ///
    /// # Errors
    ///
    /// [`NewsError::SinkUnavailable`] when `dir` cannot be created or written.
    #[instrument(level = "info")]
    pub async fn open(dir: &str, date: &str) -> Result<Self, NewsError> {
        ensure_writable_dir(dir)
            .await
            .map_err(|e| NewsError::SinkUnavailable {
                path: dir.to_string(),
                reason: e.to_string(),
            })?;
        info!(worksheet = %date, "Worksheet destination ready");
        Ok(Self {
            dir: dir.trim_end_matches('/').to_string(),
            worksheet: Worksheet::new(date),
        })
    }

    /// Where [`Sink::append`] writes the JSON worksheet.
    pub fn json_path(&self) -> PathBuf {
        json::worksheet_path(&self.dir, &self.worksheet.title)
    }

    /// Where [`Sink::append`] writes the Markdown table.
    pub fn markdown_path(&self) -> PathBuf {
        markdown::worksheet_path(&self.dir, &self.worksheet.title)
    }

    async fn flush(&self) -> Result<(), NewsError> {
        let sink_err = |e: Box<dyn std::error::Error>| NewsError::SinkUnavailable {
            path: self.dir.clone(),
            reason: e.to_string(),
        };
        json::write_worksheet(&self.worksheet, &self.dir)
            .await
            .map_err(sink_err)?;
        markdown::write_worksheet(&self.worksheet, &self.dir)
            .await
            .map_err(sink_err)?;
        Ok(())
    }
}

impl Sink for SheetSink {
    #[instrument(level = "info", skip_all, fields(rows = rows.len()))]
    async fn append(&mut self, rows: Vec<Vec<String>>) -> Result<(), NewsError> {
        self.worksheet.rows.extend(rows);
        self.flush().await?;
        info!(
            range = ?self.worksheet.data_range(),
            total_rows = self.worksheet.rows.len(),
            "Worksheet updated"
        );
        Ok(())
    }
}
