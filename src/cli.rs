//! Command-line interface definitions for market_news.
//!
//! Every flag is optional; with none the binary runs the full pipeline with the
//! built-in defaults and writes to `./reports`. Flags can also be supplied
//! through environment variables.

use crate::config::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

/// # Examples
///
/// ```sh
/// # Defaults: 16 US market topics, Korean translation, ./reports
/// market_news
///
/// # Custom topic file, Japanese output, no more than 10 articles
/// market_news --config pipeline.yaml --target-language ja --top-n 10
///
/// # English only
/// market_news --no-translate -o /srv/news
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a pipeline config YAML file
    #[arg(short, long, env = "MARKET_NEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory receiving the dated worksheet files
    #[arg(short, long, env = "MARKET_NEWS_OUTPUT_DIR", default_value = "./reports")]
    pub output_dir: String,

    /// Language code summaries and titles are translated into
    #[arg(short = 'l', long, env = "MARKET_NEWS_TARGET_LANGUAGE")]
    pub target_language: Option<String>,

    /// Skip translation entirely
    #[arg(long, conflicts_with = "target_language")]
    pub no_translate: bool,

    /// Maximum number of articles to summarize
    #[arg(long)]
    pub top_n: Option<usize>,

    /// Concurrent feed and article requests
    #[arg(long)]
    pub concurrency: Option<usize>,
}

impl Cli {
    /// Overlay command-line choices on top of the file/default configuration.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(lang) = &self.target_language {
            config.target_language = Some(lang.clone());
        }
        if self.no_translate {
            config.target_language = None;
        }
        if let Some(n) = self.top_n {
            config.top_n = n;
        }
        if let Some(n) = self.concurrency {
            config.concurrency = n.max(1);
        }
    }
}
