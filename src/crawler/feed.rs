//! Paginated feed abstraction
//!
//! A [`FeedCursor`] exposes the items of the currently loaded results page
//! and advances to the next one. The collection engine only ever talks to
//! this trait, so it can be driven by the live search pages
//! ([`crate::crawler::list::SearchFeedCursor`]) or by pre-captured pages
//! ([`StaticFeed`]).
//!
//! Implementations must yield items newest-first, within and across pages.

use async_trait::async_trait;
use std::path::Path;

use crate::models::FeedItem;
use crate::utils::error::NavigationError;

/// Cursor over a paginated, newest-first feed
#[async_trait]
pub trait FeedCursor: Send {
    /// Items of the currently loaded page, in native order
    fn current_batch(&self) -> &[FeedItem];

    /// Load the next page
    ///
    /// Returns `Ok(false)` once no further page exists; the cursor then
    /// stays exhausted and further calls keep returning `Ok(false)`.
    async fn advance(&mut self) -> Result<bool, NavigationError>;

    /// 1-based number of the currently loaded page
    fn page_number(&self) -> u32;
}

/// Feed over in-memory pages
///
/// Used to replay a captured feed without network access.
#[derive(Debug, Clone, Default)]
pub struct StaticFeed {
    pages: Vec<Vec<FeedItem>>,
    current: usize,
    pages_loaded: u32,
    exhausted: bool,
}

impl StaticFeed {
    /// Create a feed; the first page counts as loaded immediately
    pub fn new(pages: Vec<Vec<FeedItem>>) -> Self {
        Self {
            pages,
            current: 0,
            pages_loaded: 1,
            exhausted: false,
        }
    }

    /// Load pages from a JSON file containing an array of item arrays
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::CapturedFeed` if the file cannot be read
    /// or does not decode
    pub fn from_file(path: &Path) -> Result<Self, NavigationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NavigationError::CapturedFeed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let pages: Vec<Vec<FeedItem>> =
            serde_json::from_str(&content).map_err(|e| NavigationError::CapturedFeed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        tracing::debug!(path = %path.display(), pages = pages.len(), "Loaded captured feed");
        Ok(Self::new(pages))
    }

    /// Number of pages that have been loaded so far, including the first
    pub fn pages_loaded(&self) -> u32 {
        self.pages_loaded
    }
}

#[async_trait]
impl FeedCursor for StaticFeed {
    fn current_batch(&self) -> &[FeedItem] {
        if self.exhausted {
            return &[];
        }
        self.pages
            .get(self.current)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    async fn advance(&mut self) -> Result<bool, NavigationError> {
        if self.exhausted || self.current + 1 >= self.pages.len() {
            self.exhausted = true;
            return Ok(false);
        }

        self.current += 1;
        self.pages_loaded += 1;
        Ok(true)
    }

    fn page_number(&self) -> u32 {
        self.current as u32 + 1
    }
}
