//! Feed traversal and collection
//!
//! - [`feed`] - the [`FeedCursor`] capability and a replayable [`StaticFeed`]
//! - [`list`] - live search results cursor with pagination
//! - [`fetcher`] - rate-limited HTTP and image downloads
//! - [`window`] - recency window arithmetic
//! - [`engine`] - the collection loop with its stop rule
//! - [`pipeline`] - one complete run including the report

pub mod engine;
pub mod feed;
pub mod fetcher;
pub mod ids;
pub mod list;
pub mod pipeline;
pub mod window;

pub use engine::{AssetFailurePolicy, CollectionEngine};
pub use feed::{FeedCursor, StaticFeed};
pub use fetcher::{AssetFetcher, HttpAssetFetcher, WebFetcher};
pub use ids::{IdGenerator, SequentialIdGenerator, ShortUuidGenerator};
pub use list::SearchFeedCursor;
pub use pipeline::{HarvestPipeline, HarvestSummary};
