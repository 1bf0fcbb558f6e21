// src/core/fetcher.rs

use crate::core::config::AuditConfig;
use crate::core::document::FetchedPage;
use crate::core::error::AuditError;
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Descriptive user agent sent with every request of an audit.
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; GEO-Audit-Bot/1.0)";

/// Pause before the single retry of a failed page fetch.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Retrieves the audited page. The wrapped client is shared with the robots
/// and link modules so that every request carries the same user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &AuditConfig) -> Result<Self, AuditError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.page_timeout())
            .build()
            .map_err(AuditError::Client)?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fetches `url`, retrying exactly once on a network error or a non-2xx status.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage, AuditError> {
        match self.fetch_once(url).await {
            Ok(page) => Ok(page),
            Err(e) => {
                warn!(url = %url, error = %e, "Page fetch failed, retrying once.");
                tokio::time::sleep(RETRY_DELAY).await;
                self.fetch_once(url).await
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedPage, AuditError> {
        debug!(url = %url, "Requesting page.");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| AuditError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let bytes = response.bytes().await.map_err(|source| AuditError::Body {
            url: url.to_string(),
            source,
        })?;
        info!(url = %final_url, status = %status, bytes = bytes.len(), "Page fetched.");

        Ok(FetchedPage {
            url: final_url,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            bytes: bytes.len(),
            fetched_at: Utc::now(),
        })
    }
}

/// Turns user input into an absolute http(s) URL, defaulting to `https://`.
pub fn normalize_target(input: &str) -> Result<Url, AuditError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AuditError::InvalidUrl(input.to_string()));
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|_| AuditError::InvalidUrl(input.to_string()))?;
    if url.host_str().is_none() {
        return Err(AuditError::InvalidUrl(input.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_https() {
        let url = normalize_target("example.com/blog").unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = normalize_target(" http://example.com ").unwrap();
        assert_eq!(url.scheme(), "http");
    }

    #[test]
    fn empty_and_garbage_input_rejected() {
        assert!(matches!(normalize_target("   "), Err(AuditError::InvalidUrl(_))));
        assert!(matches!(normalize_target("http://"), Err(AuditError::InvalidUrl(_))));
    }
}
