//! JSON rendering of the daily worksheet.
//!
//! ```text
//! output_dir/
//! └── 2026-10-17.json
//! ```

use super::sheet::Worksheet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Path of the JSON file for the worksheet titled `title`.
///
/// # Arguments
///
/// * `dir` - Output directory
/// * `title` - Worksheet title, normally the local date
///
/// # Returns
///
/// `{dir}/{title}.json`
pub fn worksheet_path(dir: &str, title: &str) -> PathBuf {
    Path::new(dir).join(format!("{title}.json"))
}

/// Serialize `worksheet` to `{dir}/{title}.json`, replacing any earlier file.
#[instrument(level = "debug", skip_all, fields(%dir, worksheet = %worksheet.title))]
pub async fn write_worksheet(worksheet: &Worksheet, dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(worksheet)?;
    let path = worksheet_path(dir, &worksheet.title);
    fs::write(&path, json).await?;
    info!(path = %path.display(), rows = worksheet.rows.len(), "Wrote worksheet JSON");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_worksheet_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_str().unwrap();
        let mut ws = Worksheet::new("2026-10-17");
        ws.rows.push(vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()]);

        let path = write_worksheet(&ws, dir).await.unwrap();
        assert!(path.ends_with("2026-10-17.json"));
        let back: Worksheet = serde_json::from_str(&fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(back, ws);
    }
}
