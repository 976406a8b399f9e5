//! Search results feed with pagination support
//!
//! [`SearchFeedCursor`] opens the site search for a phrase sorted by newest
//! first, optionally narrows it to a category filter offered by the page,
//! and then follows the "next page" link one page at a time. A next link
//! that leads back to any page already visited is a layout error.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::crawler::feed::FeedCursor;
use crate::crawler::fetcher::WebFetcher;
use crate::models::{FeedItem, SearchCriteria};
use crate::parser::{CategoryFilter, SearchResultsParser};
use crate::utils::error::{FetchError, NavigationError};

/// Sort order parameter value for "newest first"
const SORT_NEWEST: &str = "1";

/// URL builder for the search results pages
pub struct SearchUrlBuilder;

impl SearchUrlBuilder {
    /// Build the first results page URL
    ///
    /// Format: `{base}search?q={phrase}&s=1[&{filter.param}={filter.value}]`.
    /// The phrase is lowercased, matching what is typed into the search box.
    ///
    /// # Examples
    ///
    /// ```
    /// use newsharvest::crawler::list::SearchUrlBuilder;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://www.latimes.com/").unwrap();
    /// let url = SearchUrlBuilder::search(&base, "Climate Change", None).unwrap();
    /// assert_eq!(url.as_str(), "https://www.latimes.com/search?q=climate+change&s=1");
    /// ```
    pub fn search(
        base: &Url,
        phrase: &str,
        filter: Option<&CategoryFilter>,
    ) -> Result<Url, FetchError> {
        let mut url = base
            .join("search")
            .map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &phrase.to_lowercase());
            query.append_pair("s", SORT_NEWEST);
            if let Some(filter) = filter {
                query.append_pair(&filter.param, &filter.value);
            }
        }

        Ok(url)
    }
}

/// Live cursor over the site's search results
pub struct SearchFeedCursor {
    fetcher: Arc<WebFetcher>,
    parser: SearchResultsParser,
    current_url: Url,
    visited: HashSet<Url>,
    next_href: Option<String>,
    batch: Vec<FeedItem>,
    page: u32,
    exhausted: bool,
    applied_filter: Option<CategoryFilter>,
}

impl SearchFeedCursor {
    /// Run the search and load the first results page
    ///
    /// When the criteria name a category, the filter whose label contains it
    /// (case-insensitively) is applied. No match leaves the search
    /// unfiltered.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::PageLoad` if a results page cannot be loaded
    pub async fn open(
        fetcher: Arc<WebFetcher>,
        criteria: &SearchCriteria,
    ) -> Result<Self, NavigationError> {
        let parser = SearchResultsParser::new();

        let mut url = SearchUrlBuilder::search(fetcher.base_url(), criteria.phrase(), None)
            .map_err(|source| NavigationError::PageLoad {
                url: fetcher.base_url().to_string(),
                source,
            })?;
        let mut html = load_page(&fetcher, &url).await?;
        let mut applied_filter = None;

        if let Some(category) = criteria.category() {
            let filters = parser.category_filters(&html);
            match filters.iter().find(|f| f.matches(category)) {
                Some(filter) => {
                    tracing::info!(category, label = %filter.label, "Applying category filter");
                    url = SearchUrlBuilder::search(
                        fetcher.base_url(),
                        criteria.phrase(),
                        Some(filter),
                    )
                    .map_err(|source| NavigationError::PageLoad {
                        url: url.to_string(),
                        source,
                    })?;
                    html = load_page(&fetcher, &url).await?;
                    applied_filter = Some(filter.clone());
                }
                None => {
                    let available: Vec<&str> = filters.iter().map(|f| f.label.as_str()).collect();
                    tracing::info!(
                        category,
                        available = ?available,
                        "No category filter matches, continuing unfiltered"
                    );
                }
            }
        }

        let batch = parser.parse_items(&html);
        let next_href = parser.next_page_href(&html);

        tracing::debug!(
            url = %url,
            items = batch.len(),
            has_next = next_href.is_some(),
            "Loaded first results page"
        );

        let visited = HashSet::from([url.clone()]);

        Ok(Self {
            fetcher,
            parser,
            visited,
            current_url: url,
            next_href,
            batch,
            page: 1,
            exhausted: false,
            applied_filter,
        })
    }

    /// Category filter applied during setup, if any
    pub fn applied_filter(&self) -> Option<&CategoryFilter> {
        self.applied_filter.as_ref()
    }

    pub fn current_url(&self) -> &Url {
        &self.current_url
    }
}

#[async_trait]
impl FeedCursor for SearchFeedCursor {
    fn current_batch(&self) -> &[FeedItem] {
        &self.batch
    }

    async fn advance(&mut self) -> Result<bool, NavigationError> {
        if self.exhausted {
            return Ok(false);
        }

        let Some(href) = self.next_href.take() else {
            tracing::debug!(page = self.page, "No next page link");
            self.exhausted = true;
            self.batch.clear();
            return Ok(false);
        };

        let url = self
            .fetcher
            .resolve(&href)
            .map_err(|source| NavigationError::PageLoad {
                url: href.clone(),
                source,
            })?;

        if self.visited.contains(&url) {
            return Err(NavigationError::UnexpectedLayout(format!(
                "next page link points back to an already visited page: {url}"
            )));
        }

        let html = load_page(&self.fetcher, &url).await?;

        self.page += 1;
        self.batch = self.parser.parse_items(&html);
        self.next_href = self.parser.next_page_href(&html);
        self.visited.insert(url.clone());
        self.current_url = url;

        tracing::debug!(
            page = self.page,
            url = %self.current_url,
            items = self.batch.len(),
            has_next = self.next_href.is_some(),
            "Loaded results page"
        );

        Ok(true)
    }

    fn page_number(&self) -> u32 {
        self.page
    }
}

async fn load_page(fetcher: &WebFetcher, url: &Url) -> Result<String, NavigationError> {
    fetcher
        .fetch_text(url)
        .await
        .map_err(|source| NavigationError::PageLoad {
            url: url.to_string(),
            source,
        })
}
