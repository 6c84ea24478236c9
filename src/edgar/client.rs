// src/edgar/client.rs
use crate::config::ListingConfig;
use crate::edgar::models::PageCursor;
use crate::utils::error::EdgarError;
use reqwest::header;

/// HTTP access to the EDGAR "latest filings" listing.
pub struct ListingClient {
    http: reqwest::Client,
    config: ListingConfig,
}

impl ListingClient {
    /// Creates a reqwest client configured for EDGAR interaction.
    pub fn new(config: ListingConfig) -> Result<Self, EdgarError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone()) // EDGAR rejects anonymous clients
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    /// URL of the listing page at `cursor`, restricted to 8-K filings.
    pub fn page_url(&self, cursor: PageCursor) -> String {
        format!(
            "{}?action=getcurrent&datea=&dateb=&company=&type=8-k&SIC=&State=&Country=&CIK=&owner=include&accno=&start={}&count={}",
            self.config.url, cursor.offset, cursor.page_size
        )
    }

    /// Downloads one listing page. Any transport failure, timeout or non-2xx
    /// status is returned with the page number and URL; nothing is retried.
    pub async fn fetch_page(&self, cursor: PageCursor) -> Result<String, EdgarError> {
        let page = cursor.page_number();
        let url = self.page_url(cursor);

        // SEC asks for 10 requests/second max.
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }

        tracing::info!("Checking 'latest filings' page {}: {}", page, url);

        let response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
            .send()
            .await
            .map_err(|source| self.transport_error(page, &url, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Failed to load SEC data (code: {}) for URL: {}", status, url);
            if status == reqwest::StatusCode::FORBIDDEN {
                tracing::debug!("Received 403 Forbidden - check User-Agent and request rate.");
            }
            return Err(EdgarError::Http { page, url, status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|source| self.transport_error(page, &url, source))?;
        tracing::debug!("Downloaded {} bytes for page {}", body.len(), page);
        Ok(body)
    }

    fn transport_error(&self, page: usize, url: &str, source: reqwest::Error) -> EdgarError {
        if source.is_timeout() {
            tracing::debug!(
                "Request to {} timed out after {} seconds.",
                url,
                self.config.timeout.as_secs()
            );
            EdgarError::Timeout {
                page,
                url: url.to_string(),
                secs: self.config.timeout.as_secs(),
            }
        } else {
            tracing::debug!("Request to {} encountered an exception: {}", url, source);
            EdgarError::Transport {
                page,
                url: url.to_string(),
                source,
            }
        }
    }
}
