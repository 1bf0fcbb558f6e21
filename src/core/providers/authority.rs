// src/core/providers/authority.rs

use super::{AuthorityProvider, ProviderError};
use crate::core::config::SearchConfig;
use crate::core::fetcher::USER_AGENT;
use crate::core::models::AuthoritySnapshot;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Google Custom Search JSON API, queried with `site:{host}`.
#[derive(Debug, Clone)]
pub struct GoogleSearchAuthority {
    api_key: String,
    engine_id: String,
    endpoint: String,
    timeout: Duration,
}

impl GoogleSearchAuthority {
    /// `None` unless both the key and the engine id are set.
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        let engine_id = config.engine_id.clone()?;
        Some(Self {
            api_key,
            engine_id,
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

impl AuthorityProvider for GoogleSearchAuthority {
    fn lookup(&self, host: &str) -> Result<AuthoritySnapshot, ProviderError> {
        info!(host, "Querying search index.");
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()?;
        let query = format!("site:{}", host);
        let response = client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        let body: Value = response.json()?;
        Ok(parse_search_response(&body))
    }
}

/// Reads a count that may be encoded as a JSON string or number.
fn as_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// Extracts the indexed-page estimate from a Custom Search response.
///
/// `searchInformation.totalResults` first, then
/// `queries.request[0].totalResults`, then the number of returned items.
pub fn parse_search_response(body: &Value) -> AuthoritySnapshot {
    let sample_results = body
        .get("items")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);

    let primary = as_count(body.pointer("/searchInformation/totalResults")).filter(|n| *n > 0);
    let request = as_count(body.pointer("/queries/request/0/totalResults")).filter(|n| *n > 0);
    let (indexed_pages, source) = match (primary, request) {
        (Some(n), _) => (n, "searchInformation.totalResults"),
        (None, Some(n)) => (n, "queries.request.totalResults"),
        (None, None) => (sample_results as u64, "items"),
    };
    debug!(indexed_pages, source, sample_results, "Search response parsed.");

    AuthoritySnapshot {
        indexed_pages,
        sample_results,
        source: source.to_string(),
    }
}
