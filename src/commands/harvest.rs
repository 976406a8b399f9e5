use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use newsharvest::config::Config;
use newsharvest::crawler::fetcher::WebFetcher;
use newsharvest::crawler::list::SearchFeedCursor;
use newsharvest::crawler::pipeline::HarvestPipeline;
use newsharvest::crawler::{FeedCursor, StaticFeed};
use newsharvest::error::Error;
use newsharvest::models::{StopReason, TaskInput};
use newsharvest::utils::truncate_text;

/// Parameters of one harvest invocation
pub struct HarvestParams {
    /// Criteria from the work-item file and flags, flags winning
    pub input: TaskInput,

    /// Replay a captured feed instead of searching the live site
    pub feed_file: Option<PathBuf>,
}

pub async fn harvest(config: Config, params: HarvestParams, cancel: Arc<AtomicBool>) -> Result<()> {
    let criteria = params.input.into_criteria()?;

    println!("Starting News Harvest");
    println!("=====================");
    println!("  Phrase: {}", criteria.phrase());
    println!("  Category: {}", criteria.category().unwrap_or("any"));
    println!("  Months: {}", criteria.months());
    println!("  Output: {}", config.output.dir.display());

    let fetcher = Arc::new(
        WebFetcher::from_config(&config.feed)
            .map_err(|e| Error::config(format!("cannot create HTTP client: {e}")))?,
    );

    let mut cursor: Box<dyn FeedCursor> = match &params.feed_file {
        Some(path) => {
            println!("  Feed: {} (captured)", path.display());
            Box::new(StaticFeed::from_file(path).map_err(Error::from)?)
        }
        None => {
            let cursor = SearchFeedCursor::open(fetcher.clone(), &criteria)
                .await
                .map_err(Error::from)?;
            match cursor.applied_filter() {
                Some(filter) => println!("  Filter: {}", filter.label),
                None if criteria.category().is_some() => {
                    println!("  Filter: none matched, searching all categories")
                }
                None => {}
            }
            Box::new(cursor)
        }
    };

    let summary = HarvestPipeline::from_config(&config, criteria, fetcher)
        .with_cancel_flag(cancel)
        .run(cursor.as_mut())
        .await?;

    println!("\nHarvest Complete");
    println!("================");
    println!("  Records: {}", summary.result.len());
    println!("  Pages visited: {}", summary.result.pages_visited);
    match &summary.result.stop_reason {
        StopReason::WindowExceeded { page, position } => {
            println!("  Stopped: older article at page {page}, position {}", position + 1)
        }
        StopReason::FeedExhausted => println!("  Stopped: no more results"),
    }
    if !summary.result.skipped.is_empty() {
        println!("  Skipped: {}", summary.result.skipped.len());
        for skipped in &summary.result.skipped {
            println!("    - {} ({})", truncate_text(&skipped.title, 60), skipped.error);
        }
    }
    println!("  Report: {}", summary.report_path.display());
    println!("  Images: {}", summary.images_dir.display());

    Ok(())
}
