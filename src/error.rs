//! Errors of the file-size lookup.
//!
//! These never reach the page: the overlay turns every `FetchError` into the
//! "unknown size" sentinel and logs it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("could not read file metadata: {0}")]
    Io(#[from] std::io::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("response carries no content length")]
    MissingContentLength,
    #[error("content length {0:?} is not a byte count")]
    InvalidContentLength(String),
    #[error("{0} cannot be resolved to a location")]
    InvalidUrl(String),
}
