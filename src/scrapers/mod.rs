//! Sources the pipeline reads from.
//!
//! | Module | Role | Method |
//! |--------|------|--------|
//! | [`google_news`] | Topic search feeds | Google News RSS |
//! | [`article`] | Article body text | HTML scraping with a strategy chain |
//!
//! Both follow the same failure rule: a topic or article that cannot be read
//! is logged and degrades to an empty result, it never aborts the run.

pub mod article;
pub mod google_news;
