//! Unified error handling for the newsharvest crate
//!
//! This module consolidates the collaborator errors into a single `Error`
//! enum. The core never retries; [`Error::is_recoverable`] and
//! [`Error::category`] exist so a caller wrapping the whole run can decide
//! what to do with a failure.
//!
//! # Usage
//!
//! ```rust,ignore
//! use newsharvest::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         eprintln!("Transient failure, the run may be repeated: {err}");
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::utils::error::{AssetFetchError, FetchError, NavigationError, ReportWriteError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or missing search criteria
    Input,
    /// Feed page loading and traversal
    Navigation,
    /// Image retrieval
    Asset,
    /// Report and filesystem output
    Storage,
    /// Configuration loading and validation
    Config,
    /// Run interrupted by the caller
    Cancelled,
}

impl ErrorCategory {
    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Navigation => "navigation",
            Self::Asset => "asset",
            Self::Storage => "storage",
            Self::Config => "config",
            Self::Cancelled => "cancelled",
        }
    }

    /// Process exit code reported by the binary for this category
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input => 2,
            Self::Config => 3,
            Self::Navigation => 4,
            Self::Asset => 5,
            Self::Storage => 6,
            Self::Cancelled => 130,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the newsharvest crate
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing search criteria, detected before browsing starts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The feed could not be loaded or advanced
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// An article image could not be retrieved
    #[error("Asset fetch error: {0}")]
    AssetFetch(#[from] AssetFetchError),

    /// The final report could not be written
    #[error("Report write error: {0}")]
    ReportWrite(#[from] ReportWriteError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors outside the report and asset paths
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The run was cancelled between pages
    #[error("Run cancelled")]
    Cancelled,
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::Input,
            Self::Navigation(_) => ErrorCategory::Navigation,
            Self::AssetFetch(_) => ErrorCategory::Asset,
            Self::ReportWrite(_) | Self::Io(_) => ErrorCategory::Storage,
            Self::Config(_) => ErrorCategory::Config,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether repeating the whole run could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Navigation(NavigationError::PageLoad { source, .. }) => {
                source_is_transient(source)
            }
            Self::AssetFetch(AssetFetchError::Download { source, .. }) => {
                source_is_transient(source)
            }
            Self::Io(_) => true,
            Self::Cancelled => true,
            _ => false,
        }
    }
}

fn source_is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Timeout | FetchError::Http(_) => true,
        FetchError::Status(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        FetchError::InvalidUrl(_) => false,
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
