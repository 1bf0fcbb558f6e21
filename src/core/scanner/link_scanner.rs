// src/core/scanner/link_scanner.rs

use crate::core::document::Document;
use crate::core::models::{AuthorityTier, LinkCandidate, LinkCheckResult, LinkResults, ProbeMethod, TierCounts};
use crate::core::score::ScorePolicy;
use futures::future::join_all;
use once_cell::sync::Lazy;
use scraper::Selector;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

const GOV_SUFFIXES: &[&str] = &[".gov", ".gov.br", ".gov.uk", ".gov.au", ".gc.ca", ".gouv.fr", ".mil"];
const EDU_SUFFIXES: &[&str] = &[".edu", ".edu.br", ".ac.uk", ".edu.au", ".ac.jp"];
const ORG_SUFFIXES: &[&str] = &[".org", ".org.br", ".org.uk"];

/// Classifies a host by its public suffix.
pub fn classify_tier(host: &str) -> AuthorityTier {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let matches = |suffixes: &[&str]| suffixes.iter().any(|s| host.ends_with(s));
    if matches(GOV_SUFFIXES) {
        AuthorityTier::Gov
    } else if matches(EDU_SUFFIXES) {
        AuthorityTier::Edu
    } else if matches(ORG_SUFFIXES) {
        AuthorityTier::Org
    } else {
        AuthorityTier::Generic
    }
}

fn netloc(url: &Url) -> (Option<String>, Option<u16>) {
    (url.host_str().map(str::to_ascii_lowercase), url.port())
}

/// Every distinct absolute http(s) link pointing off the page's host, in
/// first-seen order, fragments removed.
pub fn collect_external_links(doc: &Document<'_>) -> Vec<LinkCandidate> {
    let base = doc.url();
    let own = netloc(base);
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for href in doc.html().select(&LINKS).filter_map(|a| a.value().attr("href")) {
        let Ok(mut url) = base.join(href.trim()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") || netloc(&url) == own {
            continue;
        }
        url.set_fragment(None);
        let Some(host) = url.host_str() else {
            continue;
        };
        let tier = classify_tier(host);
        let url = url.to_string();
        if seen.insert(url.clone()) {
            candidates.push(LinkCandidate { url, tier });
        }
    }
    debug!(count = candidates.len(), "External links collected.");
    candidates
}

/// HEAD first; a GET only when the HEAD request itself fails.
pub async fn probe_link(client: &reqwest::Client, candidate: LinkCandidate, timeout: Duration) -> LinkCheckResult {
    let head = client.head(&candidate.url).timeout(timeout).send().await;
    let (method, response) = match head {
        Ok(resp) => (ProbeMethod::Head, Ok(resp)),
        Err(e) => {
            debug!(url = %candidate.url, error = %e, "HEAD failed, trying GET.");
            (ProbeMethod::Get, client.get(&candidate.url).timeout(timeout).send().await)
        }
    };

    match response {
        Ok(resp) => {
            let status = resp.status().as_u16();
            LinkCheckResult {
                candidate,
                broken: status >= 400,
                method,
                status: Some(status),
            }
        }
        Err(e) => {
            warn!(url = %candidate.url, error = %e, "Link unreachable.");
            LinkCheckResult {
                candidate,
                broken: true,
                method: ProbeMethod::Unreachable,
                status: None,
            }
        }
    }
}

/// Tallies tiers over every candidate and probes the leading sample concurrently.
pub async fn run_link_audit(
    client: &reqwest::Client,
    candidates: Vec<LinkCandidate>,
    policy: &ScorePolicy,
    timeout: Duration,
) -> LinkResults {
    info!(total = candidates.len(), "Starting link audit.");
    let mut tiers = TierCounts::default();
    for candidate in &candidates {
        tiers.add(candidate.tier);
    }
    let total_external = candidates.len();

    let sample: Vec<LinkCandidate> = candidates
        .into_iter()
        .take(policy.thresholds.link_sample_size)
        .collect();
    let sampled = sample.len();
    let checks: Vec<LinkCheckResult> =
        join_all(sample.into_iter().map(|c| probe_link(client, c, timeout))).await;

    let broken_count = checks.iter().filter(|c| c.broken).count();
    let score_part = (100.0 - policy.thresholds.broken_link_penalty * broken_count as f64).max(0.0);
    let issues = checks
        .iter()
        .filter(|c| c.broken)
        .map(|c| match c.status {
            Some(status) => format!("Broken link ({}): {}", status, c.candidate.url),
            None => format!("Unreachable link: {}", c.candidate.url),
        })
        .collect();

    info!(sampled, broken_count, authoritative = tiers.authoritative(), "Link audit finished.");
    LinkResults {
        total_external,
        tiers,
        sampled,
        broken_count,
        checks,
        score_part,
        issues,
    }
}
