// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum EdgarError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Request for listing page {page} ({url}) failed: {source}")]
    Transport {
        page: usize,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for listing page {page} ({url}) timed out after {secs} seconds")]
    Timeout { page: usize, url: String, secs: u64 },

    #[error("Listing page {page} ({url}) returned HTTP {status}: {body}")]
    Http {
        page: usize,
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Could not extract filing on listing page {page}: {source}")]
    Extract {
        page: usize,
        #[source]
        source: ExtractError,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Structure mismatch: {0}")]
    StructureMismatch(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Store returned HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Revision conflict writing {path} (HTTP {status}); document changed since it was read")]
    Conflict {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed document line {line}: {reason}")]
    DocumentFormat { line: usize, reason: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("EDGAR interaction failed: {0}")]
    Edgar(#[from] EdgarError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
