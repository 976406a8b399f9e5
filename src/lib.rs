//! newsharvest - Recent news collector
//!
//! Searches a news site for a phrase, walks the newest-first results page by
//! page until an article falls outside the requested recency window, and
//! writes every collected article with its image and text metrics to an
//! `.xlsx` report.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Feed traversal, image download and the collection loop
//! - [`parser`] - Search results page parsing
//! - [`analytics`] - Phrase counting and money detection
//! - [`models`] - Core data structures and types
//! - [`storage`] - Output layout and report writing
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use newsharvest::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let criteria = SearchCriteria::new("climate", None, 1)?;
//!     let fetcher = Arc::new(WebFetcher::from_config(&config.feed)?);
//!
//!     let mut cursor = SearchFeedCursor::open(fetcher.clone(), &criteria).await?;
//!     let summary = HarvestPipeline::from_config(&config, criteria, fetcher)
//!         .run(&mut cursor)
//!         .await?;
//!     println!("{} records", summary.result.len());
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod parser;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{
        AssetFailurePolicy, AssetFetcher, CollectionEngine, FeedCursor, HarvestPipeline,
        HarvestSummary, SearchFeedCursor, StaticFeed, WebFetcher,
    };
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::models::{CollectionResult, FeedItem, NewsRecord, SearchCriteria, StopReason};
    pub use crate::storage::{OutputLayout, ReportSink, XlsxReportSink};
}

pub use models::{CollectionResult, FeedItem, NewsRecord, SearchCriteria};
