//! Incremental collection with a recency cutoff
//!
//! The engine walks a [`FeedCursor`] page by page. Each item is checked
//! against the recency window: the first item outside it stops the whole
//! run, since the feed is sorted newest-first and nothing after it can
//! qualify. Accepted items are enriched, their image downloaded, and the
//! resulting [`NewsRecord`] appended in discovery order.
//!
//! ```text
//!   Scanning ──(item outside window)──▶ Stopped(WindowExceeded)
//!      │  ▲
//!      │  └──(advance() == true)
//!      └─────(advance() == false)─────▶ Stopped(FeedExhausted)
//! ```
//!
//! All calls are awaited one at a time; the engine never overlaps
//! navigation with downloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::analytics::{contains_money, count_occurrences};
use crate::crawler::feed::FeedCursor;
use crate::crawler::fetcher::AssetFetcher;
use crate::crawler::ids::{IdGenerator, ShortUuidGenerator};
use crate::crawler::window::{is_within_window, normalized_date, window_cutoff};
use crate::error::{Error, Result};
use crate::models::{
    CollectionResult, FeedItem, NewsRecord, SearchCriteria, SkippedItem, StopReason,
};
use crate::utils::truncate_text;

/// Handling of a failed image download
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetFailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Drop the affected record and keep scanning
    SkipRecord,
}

impl FromStr for AssetFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" | "skip_record" | "skip-record" => Ok(Self::SkipRecord),
            other => Err(format!(
                "unknown asset failure policy '{other}', expected 'abort' or 'skip_record'"
            )),
        }
    }
}

/// Drives a feed cursor and accumulates records
pub struct CollectionEngine {
    criteria: SearchCriteria,
    assets: Arc<dyn AssetFetcher>,
    ids: Arc<dyn IdGenerator>,
    image_dir: PathBuf,
    policy: AssetFailurePolicy,
    now: DateTime<Utc>,
    cancel: Option<Arc<AtomicBool>>,
}

impl CollectionEngine {
    /// Create an engine that saves images into `image_dir`
    ///
    /// Defaults: random short identifiers, abort on asset failure, and the
    /// current wall-clock time as the window reference.
    pub fn new(
        criteria: SearchCriteria,
        assets: Arc<dyn AssetFetcher>,
        image_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            criteria,
            assets,
            ids: Arc::new(ShortUuidGenerator),
            image_dir: image_dir.into(),
            policy: AssetFailurePolicy::default(),
            now: Utc::now(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Fix the reference time for the recency window
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AssetFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Flag checked before each page and each advance
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    /// Run the collection to completion
    ///
    /// # Errors
    ///
    /// - `Error::Navigation` if the cursor cannot advance
    /// - `Error::AssetFetch` if an image fails under [`AssetFailurePolicy::Abort`]
    /// - `Error::InvalidInput` if an item carries an invalid timestamp
    /// - `Error::Cancelled` if the cancel flag was raised
    pub async fn collect<C>(&self, cursor: &mut C) -> Result<CollectionResult>
    where
        C: FeedCursor + ?Sized,
    {
        let months = self.criteria.months();
        let cutoff = window_cutoff(self.now, months)?;

        tracing::info!(
            phrase = %self.criteria.phrase(),
            months,
            cutoff = %cutoff,
            policy = ?self.policy,
            "Starting collection"
        );

        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut pages_visited = 0;

        let stop_reason = loop {
            self.check_cancelled()?;

            let page = cursor.page_number();
            let batch = cursor.current_batch();
            pages_visited += 1;

            tracing::debug!(page, items = batch.len(), "Scanning page");

            let mut rejected_at = None;
            for (position, item) in batch.iter().enumerate() {
                if !is_within_window(item.timestamp_ms, self.now, months)? {
                    rejected_at = Some(position);
                    break;
                }

                let record = self.build_record(item)?;
                tracing::info!(
                    page,
                    item = position + 1,
                    id = %record.id,
                    title = %truncate_text(&record.title, 80),
                    "Processing news item"
                );

                let destination = self.image_dir.join(&record.picture_filename);
                match self.assets.fetch(&item.image_url, &destination).await {
                    Ok(()) => records.push(record),
                    Err(err) if self.policy == AssetFailurePolicy::SkipRecord => {
                        tracing::warn!(
                            id = %record.id,
                            title = %record.title,
                            error = %err,
                            "Skipping record after image failure"
                        );
                        skipped.push(SkippedItem {
                            title: item.title.clone(),
                            image_url: item.image_url.clone(),
                            error: err.to_string(),
                        });
                    }
                    Err(err) => return Err(err.into()),
                }
            }

            if let Some(position) = rejected_at {
                tracing::info!(page, position, "Reached item outside the recency window");
                break StopReason::WindowExceeded { page, position };
            }

            self.check_cancelled()?;
            if !cursor.advance().await? {
                tracing::info!(page, "No further pages");
                break StopReason::FeedExhausted;
            }
        };

        tracing::info!(
            records = records.len(),
            skipped = skipped.len(),
            pages = pages_visited,
            stop = %stop_reason,
            "Collection finished"
        );

        Ok(CollectionResult {
            records,
            stop_reason,
            pages_visited,
            skipped,
        })
    }

    /// Enrich an admitted item into a record (image not yet fetched)
    fn build_record(&self, item: &FeedItem) -> Result<NewsRecord> {
        let id = self.ids.next_id();
        let phrase = self.criteria.phrase();

        let search_phrase_count =
            count_occurrences(&item.title, phrase) + count_occurrences(&item.description, phrase);
        let contains_money = contains_money(&item.description) || contains_money(&item.title);

        Ok(NewsRecord {
            picture_filename: NewsRecord::picture_filename_for(&id),
            id,
            title: item.title.clone(),
            date: normalized_date(item.timestamp_ms)?,
            description: item.description.clone(),
            search_phrase_count,
            contains_money,
        })
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::SeqCst) => {
                tracing::warn!("Collection cancelled");
                Err(Error::Cancelled)
            }
            _ => Ok(()),
        }
    }
}
