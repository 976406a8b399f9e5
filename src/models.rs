// Core data structures for the newsharvest collector

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Search parameters for one run
///
/// Immutable once constructed; use [`SearchCriteria::new`] so that the
/// phrase and window are validated before any browsing starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    phrase: String,
    category: Option<String>,
    months: u32,
}

impl SearchCriteria {
    /// Validate and build criteria
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the phrase is blank or `months` is zero
    pub fn new(phrase: &str, category: Option<&str>, months: i64) -> Result<Self> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(Error::invalid_input("phrase must not be empty"));
        }

        if months <= 0 {
            return Err(Error::invalid_input(format!(
                "last_months must be a positive integer, got {months}"
            )));
        }
        let months = u32::try_from(months)
            .map_err(|_| Error::invalid_input(format!("last_months is too large: {months}")))?;

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            phrase: phrase.to_string(),
            category,
            months,
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Recency window in whole calendar months
    pub fn months(&self) -> u32 {
        self.months
    }
}

/// Raw task input before validation
///
/// Mirrors the work-item variables: `phrase`, `category`, `last_months`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskInput {
    pub phrase: Option<String>,
    pub category: Option<String>,
    pub last_months: Option<i64>,
}

impl TaskInput {
    /// Load a JSON work-item file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::invalid_input(format!("malformed input file {}: {e}", path.display()))
        })
    }

    /// Overlay values that were given explicitly (e.g. on the command line)
    pub fn merge(self, other: TaskInput) -> Self {
        Self {
            phrase: other.phrase.or(self.phrase),
            category: other.category.or(self.category),
            last_months: other.last_months.or(self.last_months),
        }
    }

    /// Validate into [`SearchCriteria`]
    pub fn into_criteria(self) -> Result<SearchCriteria> {
        let phrase = self
            .phrase
            .ok_or_else(|| Error::invalid_input("missing required parameter: phrase"))?;
        let months = self
            .last_months
            .ok_or_else(|| Error::invalid_input("missing required parameter: last_months"))?;
        SearchCriteria::new(&phrase, self.category.as_deref(), months)
    }
}

/// One article summary as it appears on a results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Publication time in milliseconds since the Unix epoch (UTC)
    pub timestamp_ms: i64,
    pub title: String,
    pub description: String,
    /// Image source locator; empty when the card had no image
    #[serde(default)]
    pub image_url: String,
}

/// Normalized, enriched article ready for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: String,
    pub title: String,
    /// UTC calendar date, `YYYY-MM-DD`
    pub date: String,
    pub description: String,
    pub picture_filename: String,
    pub search_phrase_count: u32,
    pub contains_money: bool,
}

impl NewsRecord {
    /// Image filename derived from a record identifier
    pub fn picture_filename_for(id: &str) -> String {
        format!("{id}.jpg")
    }
}

/// Why the collection engine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// An item fell outside the recency window
    WindowExceeded {
        /// 1-based page number
        page: u32,
        /// 0-based position of the rejected item within its page
        position: usize,
    },
    /// The feed had no further pages
    FeedExhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WindowExceeded { page, position } => {
                write!(f, "window exceeded at page {page}, item {position}")
            }
            Self::FeedExhausted => write!(f, "feed exhausted"),
        }
    }
}

/// An accepted item dropped because its image could not be fetched
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub title: String,
    pub image_url: String,
    pub error: String,
}

/// Records accumulated by one run, in discovery order
#[derive(Debug, Clone, Serialize)]
pub struct CollectionResult {
    pub records: Vec<NewsRecord>,
    pub stop_reason: StopReason,
    pub pages_visited: u32,
    pub skipped: Vec<SkippedItem>,
}

impl CollectionResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
