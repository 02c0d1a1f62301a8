//! Error types shared across the crate

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Failure of a single fetch attempt. A non-200 status is not an error.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to access metadata file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unusable metadata entry for key '{key}': {reason}")]
    Malformed { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date '{0}', expected YYYY-MM-DD, \"beginning\" or \"today\"")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    ReversedRange { start: NaiveDate, end: NaiveDate },

    #[error("Input ended before a date was entered")]
    EndOfInput,
}
