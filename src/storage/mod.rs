// src/storage/mod.rs
pub mod document;
pub mod github;

use async_trait::async_trait;

use crate::edgar::models::Filing;
use crate::utils::error::StorageError;
use document::DocumentHeader;

/// Opaque version marker of the stored document, handed back on write so a
/// concurrent change is rejected instead of overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionToken(String);

impl RevisionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds a token from an HTTP `ETag`, dropping the weak marker and quotes.
    pub fn from_etag(etag: &str) -> Self {
        let trimmed = etag.trim();
        let trimmed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        Self::new(trimmed.trim_matches('"'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The persisted filing list together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub filings: Vec<Filing>,
    pub revision: RevisionToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// Read/write contract for the document holding the filing table.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Human-readable location, for logs.
    fn location(&self) -> String;

    /// Current filings and revision, or `None` when the document doesn't exist.
    /// Failures other than not-found are errors, never `None`.
    async fn read(&self) -> Result<Option<StoredDocument>, StorageError>;

    /// Replaces the whole document. `revision` must be the token from `read`;
    /// `None` asks for the document to be created.
    async fn write(
        &self,
        header: &DocumentHeader,
        filings: &[Filing],
        revision: Option<&RevisionToken>,
    ) -> Result<WriteOutcome, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_quotes_and_weak_marker_are_stripped() {
        assert_eq!(RevisionToken::from_etag("\"abc123\"").as_str(), "abc123");
        assert_eq!(RevisionToken::from_etag("W/\"abc123\"").as_str(), "abc123");
        assert_eq!(RevisionToken::from_etag("abc123").as_str(), "abc123");
    }
}
