//! # market_news
//!
//! Collects recent US market and economy news from Google News topic searches,
//! extracts each article's body, summarizes it with an LLM, optionally
//! translates the result, and writes a dated worksheet.
//!
//! ## Usage
//!
//! ```sh
//! market_news -o ./reports
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: one Google News RSS query per topic, first 7 items each
//! 2. **Filtering**: drop items older than 48 hours, PDFs, videos and podcasts
//! 3. **Ranking**: dedupe by link and sort newest first
//! 4. **Processing**: extract, summarize and translate the top 25 articles
//! 5. **Output**: write the worksheet as JSON and Markdown

use awful_aj::{config as llm_config_file, config_dir, template};
use chrono::Utc;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod filter;
mod http;
mod models;
mod outputs;
mod pipeline;
mod rank;
mod render;
mod scrapers;
mod summarize;
mod translate;
mod utils;

use crate::config::PipelineConfig;
use api::{AwfulAsk, RetryAsk};
use cli::Cli;
use http::{RetryPolicy, build_client};
use outputs::sheet::SheetSink;
use pipeline::Pipeline;
use render::HttpRenderer;
use scrapers::google_news::GoogleNews;
use translate::GoogleTranslate;
use utils::local_date;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("market_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut pipeline_config = match &args.config {
        Some(path) => PipelineConfig::load(path).await?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut pipeline_config);

    // Fail before any network work if the worksheet cannot be written
    let date = local_date();
    let mut sink = match SheetSink::open(&args.output_dir, &date).await {
        Ok(sink) => sink,
        Err(e) => {
            error!(path = %args.output_dir, error = %e, "Worksheet destination unavailable");
            return Err(e.into());
        }
    };

    // ---- Summarization backend ----
    let conf_file = config_dir()?.join("config.yaml");
    let config_path = conf_file
        .to_str()
        .ok_or("awful_aj config path is not valid UTF-8")?;
    let llm_config = llm_config_file::load_config(config_path)?;
    info!(config_path, "Loaded LLM configuration");
    let template = template::load_template(&pipeline_config.summary.template).await?;
    info!(template = %pipeline_config.summary.template, "Loaded summary template");

    let backend = RetryAsk::new(
        AwfulAsk {
            config: &llm_config,
            template: &template,
        },
        pipeline_config.retries,
        Duration::from_secs(1),
    );

    // ---- Network collaborators ----
    let policy = RetryPolicy::from_config(&pipeline_config);
    let client = build_client(&pipeline_config.user_agent, pipeline_config.request_timeout())?;
    let feeds = GoogleNews::new(client.clone(), pipeline_config.feed_url_template.clone(), policy);
    let renderer = HttpRenderer::new(client.clone(), policy, &pipeline_config.extraction);
    let translator = pipeline_config
        .target_language
        .as_ref()
        .map(|_| GoogleTranslate::new(client.clone(), policy));

    info!(
        topics = pipeline_config.topics.len(),
        top_n = pipeline_config.top_n,
        target_language = ?pipeline_config.target_language,
        concurrency = pipeline_config.concurrency,
        "Starting news collection"
    );

    let pipeline = Pipeline::new(&pipeline_config, feeds, renderer, backend, translator);
    let stats = match pipeline.run(&mut sink, Utc::now(), &date).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(fatal = e.is_fatal(), error = %e, "Run aborted");
            return Err(e.into());
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        raw = stats.raw_items,
        unique = stats.ranked_items,
        processed = stats.processed,
        unavailable = stats.content_unavailable,
        placeholders = stats.placeholders,
        json = %sink.json_path().display(),
        markdown = %sink.markdown_path().display(),
        "Execution complete"
    );

    Ok(())
}
