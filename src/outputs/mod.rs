//! Output destinations for summary rows.
//!
//! # Submodules
//!
//! - [`sheet`]: the dated worksheet and its [`Sink`] implementation
//! - [`json`]: writes the worksheet as JSON
//! - [`markdown`]: renders the worksheet as a Markdown table
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 2026-10-16.json
//! ├── 2026-10-16.md
//! ├── 2026-10-17.json
//! └── 2026-10-17.md
//! ```

use crate::error::NewsError;

pub mod json;
pub mod markdown;
pub mod sheet;

/// Destination that accepts worksheet rows.
pub trait Sink {
    async fn append(&mut self, rows: Vec<Vec<String>>) -> Result<(), NewsError>;
}
