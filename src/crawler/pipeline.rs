//! One complete harvest run
//!
//! ```text
//! ┌────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │  Output    │     │ CollectionEngine │     │  ReportSink  │
//! │  layout    │────▶│  (FeedCursor +   │────▶│  news.xlsx   │
//! │  prepare() │     │   AssetFetcher)  │     │              │
//! └────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! The report is written only when collection succeeds; a failed or
//! cancelled run leaves no partial report behind.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use newsharvest::config::Config;
//! use newsharvest::crawler::fetcher::WebFetcher;
//! use newsharvest::crawler::list::SearchFeedCursor;
//! use newsharvest::crawler::pipeline::HarvestPipeline;
//! use newsharvest::models::SearchCriteria;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::default();
//! let criteria = SearchCriteria::new("election", Some("politics"), 2)?;
//! let fetcher = Arc::new(WebFetcher::from_config(&config.feed)?);
//!
//! let mut cursor = SearchFeedCursor::open(fetcher.clone(), &criteria).await?;
//! let summary = HarvestPipeline::from_config(&config, criteria, fetcher)
//!     .run(&mut cursor)
//!     .await?;
//!
//! println!("Collected {} records", summary.result.len());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::config::Config;
use crate::crawler::engine::{AssetFailurePolicy, CollectionEngine};
use crate::crawler::feed::FeedCursor;
use crate::crawler::fetcher::{AssetFetcher, HttpAssetFetcher, WebFetcher};
use crate::crawler::ids::IdGenerator;
use crate::error::Result;
use crate::models::{CollectionResult, SearchCriteria};
use crate::storage::{OutputLayout, ReportSink, XlsxReportSink};

/// Outcome of a successful run
#[derive(Debug)]
pub struct HarvestSummary {
    pub result: CollectionResult,
    pub report_path: PathBuf,
    pub images_dir: PathBuf,
}

/// Wires output layout, engine and report sink for one run
pub struct HarvestPipeline {
    criteria: SearchCriteria,
    layout: OutputLayout,
    assets: Arc<dyn AssetFetcher>,
    sink: Box<dyn ReportSink>,
    policy: AssetFailurePolicy,
    ids: Option<Arc<dyn IdGenerator>>,
    now: Option<DateTime<Utc>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl HarvestPipeline {
    /// Create a pipeline writing an `.xlsx` report into `layout`
    pub fn new(
        criteria: SearchCriteria,
        layout: OutputLayout,
        assets: Arc<dyn AssetFetcher>,
    ) -> Self {
        let sink: Box<dyn ReportSink> = Box::new(XlsxReportSink::new(layout.report_path()));
        Self {
            criteria,
            layout,
            assets,
            sink,
            policy: AssetFailurePolicy::default(),
            ids: None,
            now: None,
            cancel: None,
        }
    }

    /// Build from configuration, downloading images through `fetcher`
    pub fn from_config(
        config: &Config,
        criteria: SearchCriteria,
        fetcher: Arc<WebFetcher>,
    ) -> Self {
        let layout = OutputLayout::from_config(&config.output);
        let assets = Arc::new(HttpAssetFetcher::new(fetcher));
        Self::new(criteria, layout, assets).with_policy(config.assets.on_failure)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AssetFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Prepare the output directory, collect from `cursor`, write the report
    ///
    /// # Errors
    ///
    /// Any error from collection or report writing. When collection fails
    /// no report is written.
    pub async fn run<C>(&self, cursor: &mut C) -> Result<HarvestSummary>
    where
        C: FeedCursor + ?Sized,
    {
        self.layout.prepare()?;

        let result = self.engine().collect(cursor).await?;
        let report_path = self.sink.write(&result.records)?;

        tracing::info!(
            records = result.len(),
            skipped = result.skipped.len(),
            report = %report_path.display(),
            "Harvest completed"
        );

        Ok(HarvestSummary {
            result,
            report_path,
            images_dir: self.layout.images_dir().to_path_buf(),
        })
    }

    fn engine(&self) -> CollectionEngine {
        let mut engine = CollectionEngine::new(
            self.criteria.clone(),
            self.assets.clone(),
            self.layout.images_dir(),
        )
        .with_policy(self.policy);

        if let Some(ids) = &self.ids {
            engine = engine.with_id_generator(ids.clone());
        }
        if let Some(now) = self.now {
            engine = engine.with_now(now);
        }
        if let Some(cancel) = &self.cancel {
            engine = engine.with_cancel_flag(cancel.clone());
        }
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::feed::StaticFeed;
    use crate::crawler::ids::SequentialIdGenerator;
    use crate::error::Error;
    use crate::models::{FeedItem, NewsRecord};
    use crate::utils::error::{AssetFetchError, ReportWriteError};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::path::Path;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn item(title: &str) -> FeedItem {
        FeedItem {
            timestamp_ms: now().timestamp_millis(),
            title: title.to_string(),
            description: String::new(),
            image_url: format!("https://img.example.com/{title}.jpg"),
        }
    }

    /// Writes a placeholder file for every image
    struct FileWritingFetcher;

    #[async_trait]
    impl AssetFetcher for FileWritingFetcher {
        async fn fetch(
            &self,
            _uri: &str,
            destination: &Path,
        ) -> std::result::Result<(), AssetFetchError> {
            std::fs::write(destination, b"jpg").map_err(|source| AssetFetchError::Write {
                path: destination.to_path_buf(),
                source,
            })
        }
    }

    #[derive(Default)]
    struct MemorySink {
        written: Mutex<Vec<Vec<NewsRecord>>>,
    }

    impl ReportSink for Arc<MemorySink> {
        fn write(&self, records: &[NewsRecord]) -> std::result::Result<PathBuf, ReportWriteError> {
            self.written.lock().unwrap().push(records.to_vec());
            Ok(PathBuf::from("memory"))
        }
    }

    fn pipeline(root: &Path) -> HarvestPipeline {
        let criteria = SearchCriteria::new("election", None, 1).unwrap();
        HarvestPipeline::new(
            criteria,
            OutputLayout::new(root, "news.xlsx", "images"),
            Arc::new(FileWritingFetcher),
        )
        .with_now(now())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("n")))
    }

    #[tokio::test]
    async fn test_run_writes_report_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut feed = StaticFeed::new(vec![vec![item("a"), item("b")]]);

        let summary = pipeline(dir.path()).run(&mut feed).await.unwrap();

        assert_eq!(summary.result.len(), 2);
        assert_eq!(summary.report_path, dir.path().join("news.xlsx"));
        assert!(summary.report_path.exists());
        assert!(summary.images_dir.join("n1.jpg").exists());
        assert!(summary.images_dir.join("n2.jpg").exists());
    }

    #[tokio::test]
    async fn test_run_uses_injected_sink() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MemorySink::default());
        let mut feed = StaticFeed::new(vec![vec![item("a")]]);

        let summary = pipeline(dir.path())
            .with_sink(Box::new(sink.clone()))
            .run(&mut feed)
            .await
            .unwrap();

        assert_eq!(summary.report_path, PathBuf::from("memory"));
        let written = sink.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0][0].id, "n1");
    }

    #[tokio::test]
    async fn test_cancelled_run_writes_no_report() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MemorySink::default());
        let mut feed = StaticFeed::new(vec![vec![item("a")]]);

        let result = pipeline(dir.path())
            .with_sink(Box::new(sink.clone()))
            .with_cancel_flag(Arc::new(AtomicBool::new(true)))
            .run(&mut feed)
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(sink.written.lock().unwrap().is_empty());
    }
}
