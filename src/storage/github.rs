// src/storage/github.rs
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{header, StatusCode};
use serde::Serialize;

use super::document::{self, DocumentHeader};
use super::{RemoteStore, RevisionToken, StoredDocument, WriteOutcome};
use crate::config::StoreConfig;
use crate::edgar::models::Filing;
use crate::utils::error::StorageError;

const GITHUB_USER_AGENT: &str = concat!("form8k-tracker/", env!("CARGO_PKG_VERSION"));
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Body of a contents API `PUT`.
#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String, // base64 of the full document
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// The filing table kept as a file in a GitHub repository.
pub struct GitHubStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl GitHubStore {
    pub fn new(config: StoreConfig) -> Result<Self, StorageError> {
        let http = reqwest::Client::builder()
            .user_agent(GITHUB_USER_AGENT) // GitHub rejects requests without one
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    fn authorization(&self) -> String {
        format!("token {}", self.config.token)
    }
}

#[async_trait]
impl RemoteStore for GitHubStore {
    fn location(&self) -> String {
        format!("{}/{}:{}", self.config.owner, self.config.repo, self.config.path)
    }

    async fn read(&self) -> Result<Option<StoredDocument>, StorageError> {
        let url = self.config.contents_url();
        tracing::debug!("Reading {} from {}", self.config.path, url);

        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, RAW_MEDIA_TYPE)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!("{} doesn't exist", self.config.path);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                "Error reading {}. HTTP Status Code: {}, Response: {}",
                self.config.path,
                status,
                body
            );
            return Err(StorageError::Http { status, body });
        }

        // The contents API reports the blob SHA as the ETag; it is the sha a PUT must echo.
        let revision = response
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(RevisionToken::from_etag)
            .ok_or_else(|| StorageError::Http {
                status,
                body: format!("{} response carried no ETag", self.config.path),
            })?;

        let content = response.text().await?;
        let filings = document::parse_body(&content)?;
        tracing::debug!("Read {} stored filings at revision {}", filings.len(), revision.as_str());

        Ok(Some(StoredDocument { filings, revision }))
    }

    async fn write(
        &self,
        doc_header: &DocumentHeader,
        filings: &[Filing],
        revision: Option<&RevisionToken>,
    ) -> Result<WriteOutcome, StorageError> {
        let full_content = document::render_document(doc_header, filings);
        let verb = if revision.is_some() { "Update" } else { "Create" };
        let payload = PutContents {
            message: format!("{} {}", verb, self.config.path),
            content: STANDARD.encode(full_content.as_bytes()),
            sha: revision.map(RevisionToken::as_str),
        };

        let response = self
            .http
            .put(self.config.contents_url())
            .header(header::AUTHORIZATION, self.authorization())
            .header(header::ACCEPT, JSON_MEDIA_TYPE)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                tracing::info!("Updated {} successfully.", self.config.path);
                Ok(WriteOutcome::Updated)
            }
            StatusCode::CREATED => {
                tracing::info!("Created {} successfully.", self.config.path);
                Ok(WriteOutcome::Created)
            }
            status @ (StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED) => {
                tracing::debug!("{} changed since it was read (HTTP {})", self.config.path, status);
                Err(StorageError::Conflict {
                    path: self.config.path.clone(),
                    status,
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::debug!(
                    "Error interacting with {}. HTTP Status Code: {}, Response: {}",
                    self.config.path,
                    status,
                    body
                );
                Err(StorageError::Http { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTENTS_PATH: &str = "/repos/octo/8-Ks/contents/8-Ks.md";

    fn store(server: &MockServer) -> GitHubStore {
        store_at(server.uri())
    }

    fn store_at(api_url: String) -> GitHubStore {
        GitHubStore::new(StoreConfig {
            api_url,
            owner: "octo".to_string(),
            repo: "8-Ks".to_string(),
            path: "8-Ks.md".to_string(),
            token: "ghp_test".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn header_at_noon() -> DocumentHeader {
        let checked_at = NaiveDate::from_ymd_opt(2024, 1, 3)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        DocumentHeader::new("1.05", checked_at)
    }

    fn filing() -> Filing {
        Filing::new(
            "ACME CORP",
            "2024-01-03 09:00:00".parse().unwrap(),
            "https://www.sec.gov/a-index.htm",
        )
    }

    #[tokio::test]
    async fn read_missing_document_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CONTENTS_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\":\"Not Found\"}"))
            .mount(&server)
            .await;

        assert_eq!(assert_ok!(store(&server).read().await), None);
    }

    #[tokio::test]
    async fn read_returns_filings_and_revision() {
        let server = MockServer::start().await;
        let content = document::render_document(&header_at_noon(), &[filing()]);
        Mock::given(method("GET"))
            .and(path(CONTENTS_PATH))
            .and(header("authorization", "token ghp_test"))
            .and(header("accept", RAW_MEDIA_TYPE))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("ETag", "\"3f2a9c\"")
                    .set_body_string(content),
            )
            .mount(&server)
            .await;

        let stored = assert_ok!(store(&server).read().await).expect("document present");
        assert_eq!(stored.revision, RevisionToken::new("3f2a9c"));
        assert_eq!(stored.filings, vec![filing()]);
    }

    #[tokio::test]
    async fn read_failure_is_not_treated_as_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        let err = assert_err!(store(&server).read().await);
        assert!(matches!(err, StorageError::Http { status, .. } if status.as_u16() == 401));
    }

    #[tokio::test]
    async fn write_without_revision_creates() {
        let server = MockServer::start().await;
        let content = document::render_document(&header_at_noon(), &[filing()]);
        Mock::given(method("PUT"))
            .and(path(CONTENTS_PATH))
            .and(body_json(json!({
                "message": "Create 8-Ks.md",
                "content": STANDARD.encode(content.as_bytes()),
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = assert_ok!(store(&server).write(&header_at_noon(), &[filing()], None).await);
        assert_eq!(outcome, WriteOutcome::Created);
    }

    #[tokio::test]
    async fn write_with_revision_updates() {
        let server = MockServer::start().await;
        let content = document::render_document(&header_at_noon(), &[]);
        Mock::given(method("PUT"))
            .and(path(CONTENTS_PATH))
            .and(body_json(json!({
                "message": "Update 8-Ks.md",
                "content": STANDARD.encode(content.as_bytes()),
                "sha": "3f2a9c",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let revision = RevisionToken::new("3f2a9c");
        let outcome = assert_ok!(store(&server).write(&header_at_noon(), &[], Some(&revision)).await);
        assert_eq!(outcome, WriteOutcome::Updated);
    }

    #[tokio::test]
    async fn stale_revision_is_a_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_string("sha mismatch"))
            .mount(&server)
            .await;

        let revision = RevisionToken::new("stale");
        let err = assert_err!(store(&server).write(&header_at_noon(), &[filing()], Some(&revision)).await);
        assert!(matches!(err, StorageError::Conflict { ref path, .. } if path == "8-Ks.md"));
    }

    #[tokio::test]
    async fn unreachable_api_is_transport_failure() {
        // Nothing listens on port 1.
        let store = store_at("http://127.0.0.1:1".to_string());
        let err = assert_err!(store.read().await);
        assert!(matches!(err, StorageError::Transport(_)), "got {err:?}");
        let err = assert_err!(store.write(&header_at_noon(), &[filing()], None).await);
        assert!(matches!(err, StorageError::Transport(_)), "got {err:?}");
    }
}
