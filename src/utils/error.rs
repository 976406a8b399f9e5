//! Error types for the newsharvest collaborators
//!
//! These are the domain-specific errors raised by the HTTP fetcher, the feed
//! cursor, the asset downloader and the report writer. They are wrapped by
//! the unified [`crate::error::Error`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status code
    #[error("Server returned status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Classify a transport error, separating timeouts from the rest
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors raised while loading or advancing feed pages
#[derive(Error, Debug)]
pub enum NavigationError {
    /// A results page could not be loaded
    #[error("Failed to load page {url}: {source}")]
    PageLoad {
        url: String,
        #[source]
        source: FetchError,
    },

    /// An expected element was missing from the page
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The page layout did not match what the cursor understands
    #[error("Unexpected page layout: {0}")]
    UnexpectedLayout(String),

    /// A captured feed file could not be read or decoded
    #[error("Failed to load captured feed {path}: {message}")]
    CapturedFeed { path: PathBuf, message: String },
}

/// Errors raised while retrieving an article image
#[derive(Error, Debug)]
pub enum AssetFetchError {
    /// The feed item carried no image locator
    #[error("Article has no image source")]
    MissingSource,

    /// The image locator is not a valid URL
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// The image could not be downloaded
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: FetchError,
    },

    /// The downloaded bytes could not be written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while persisting the final report
#[derive(Error, Debug)]
pub enum ReportWriteError {
    /// Workbook encoding or save failure
    #[error("Failed to write workbook {}: {source}", path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// The report directory could not be prepared
    #[error("Failed to prepare report directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
