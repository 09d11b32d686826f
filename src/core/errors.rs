use std::net::AddrParseError;
use std::path::PathBuf;
use thiserror::Error;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Error type used throughout the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Fetch Errors
--------------------------------------------------------------------------------------*/

/// Errors raised while obtaining the AWS IP ranges dataset. All of them are fatal for the
/// invocation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The download failed and there is no cached copy to fall back on.
    #[error(
        "could not download the AWS IP ranges from {url} and no file from a previous run exists; \
         try downloading the file manually and saving it as {}",
        .cache_file.display()
    )]
    Unavailable {
        url: String,
        cache_file: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    /// The downloaded or cached document is not a valid AWS IP ranges dataset.
    #[error("{origin} does not contain valid AWS IP ranges data: {source}")]
    CorruptData {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cache file exists but could not be read.
    #[error("failed to read the cached AWS IP ranges from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/*--------------------------------------------------------------------------------------
  Lookup Errors
--------------------------------------------------------------------------------------*/

/// Errors raised by individual queries. These are reported to the user and do not abort the
/// invocation.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid IP address: {address}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },
}

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error<E: std::fmt::Display>(error: &E) {
    log::error!("{}", error);
}
