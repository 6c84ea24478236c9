// src/config.rs
use std::fmt;
use std::time::Duration;

use crate::edgar::models::PageSize;

/// How much to trust the newest-first ordering of the EDGAR listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OrderCheck {
    /// Trust the listing as delivered.
    Off,
    /// Log every adjacent pair that is out of order.
    #[default]
    Flag,
    /// Log violations and re-sort the newly fetched filings newest-first.
    Reorder,
}

/// Where the "latest filings" listing lives and how to fetch it.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    pub url: String, // browse-edgar endpoint; filing hrefs are resolved against it
    pub user_agent: String,
    pub page_size: PageSize,
    pub timeout: Duration,
    pub request_delay: Duration,
}

/// Coordinates of the persisted markdown document.
#[derive(Clone)]
pub struct StoreConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub token: String,
    pub timeout: Duration,
}

impl StoreConfig {
    /// `{api}/repos/{owner}/{repo}/contents/{path}`
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.path.trim_start_matches('/')
        )
    }
}

// Keep the credential out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("path", &self.path)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Everything one run needs, fixed at process start.
#[derive(Debug, Clone)]
pub struct Config {
    /// Item code tracked in the 8-K text, e.g. "1.05".
    pub item: String,
    pub listing: ListingConfig,
    pub store: StoreConfig,
    pub order_check: OrderCheck,
    pub skip_malformed_rows: bool,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(api_url: &str, path: &str) -> StoreConfig {
        StoreConfig {
            api_url: api_url.to_string(),
            owner: "octo".to_string(),
            repo: "8-Ks".to_string(),
            path: path.to_string(),
            token: "ghp_secret".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn contents_url_joins_coordinates() {
        let cfg = store("https://api.github.com/", "/8-Ks.md");
        assert_eq!(
            cfg.contents_url(),
            "https://api.github.com/repos/octo/8-Ks/contents/8-Ks.md"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let rendered = format!("{:?}", store("https://api.github.com", "8-Ks.md"));
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
