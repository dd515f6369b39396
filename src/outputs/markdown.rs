//! Markdown table rendering of the daily worksheet, for reading in a browser
//! or an mdBook.

use super::sheet::Worksheet;
use std::error::Error;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Path of the Markdown file for the worksheet titled `title`: `{dir}/{title}.md`.
pub fn worksheet_path(dir: &str, title: &str) -> PathBuf {
    Path::new(dir).join(format!("{title}.md"))
}

fn cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

pub fn worksheet_to_markdown(worksheet: &Worksheet) -> String {
    let mut md = String::new();
    let _ = writeln!(md, "# Market news for {}\n", worksheet.title);

    let header: Vec<String> = worksheet.header.iter().map(|h| cell(h)).collect();
    let _ = writeln!(md, "| {} |", header.join(" | "));
    let _ = writeln!(md, "|{}", "---|".repeat(header.len()));

    for row in &worksheet.rows {
        let cells: Vec<String> = row.iter().map(|c| cell(c)).collect();
        let _ = writeln!(md, "| {} |", cells.join(" | "));
    }
    md
}

#[instrument(level = "debug", skip_all, fields(%dir, worksheet = %worksheet.title))]
pub async fn write_worksheet(worksheet: &Worksheet, dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = worksheet_path(dir, &worksheet.title);
    fs::write(&path, worksheet_to_markdown(worksheet)).await?;
    info!(path = %path.display(), "Wrote worksheet Markdown");
    Ok(path)
}
