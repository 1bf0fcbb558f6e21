// src/core/scanner/eeat_scanner.rs

use crate::core::document::Document;
use crate::core::models::EeatResults;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use tracing::info;

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static AUTHOR_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(sobre o autor|about the author|escrito por|written by)").unwrap()
});
static STATISTIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+%)|(\d{2,})").unwrap());

/// Profile hosts that identify an author.
const PROFILE_LINKS: &[&str] = &["linkedin.com/in", "orcid.org"];
/// Social hosts whose links are not citations.
const SOCIAL_HOSTS: &[&str] = &["facebook", "twitter"];

const STATS_FOR_CREDIT: usize = 5;
const CITATIONS_FOR_CREDIT: usize = 2;

/// Experience/expertise/authority/trust signals: author identification,
/// statistics and outbound citations.
pub fn run_eeat_scan(doc: &Document<'_>) -> EeatResults {
    info!(url = %doc.url(), "Starting E-E-A-T scan.");
    let hrefs: Vec<&str> = doc
        .html()
        .select(&LINKS)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .collect();
    let text = doc.plain_text();

    let has_profile_link = hrefs.iter().any(|href| {
        let href = href.to_lowercase();
        PROFILE_LINKS.iter().any(|p| href.contains(p))
    });
    let has_author_bio = has_profile_link || AUTHOR_MARKER.is_match(&text);

    let citation_count = hrefs
        .iter()
        .filter(|href| href.starts_with("http://") || href.starts_with("https://"))
        .filter(|href| !SOCIAL_HOSTS.iter().any(|s| href.contains(s)))
        .count();
    let stats_density = STATISTIC.find_iter(&text).count();

    let mut issues = Vec::new();
    let mut score_part = 0.0;
    if has_author_bio {
        score_part += 30.0;
    } else {
        issues.push("No author identification found".to_string());
    }
    if stats_density > STATS_FOR_CREDIT {
        score_part += 30.0;
    } else {
        issues.push(format!("Only {} statistics in the text", stats_density));
    }
    if citation_count > CITATIONS_FOR_CREDIT {
        score_part += 40.0;
    } else {
        issues.push(format!("Only {} external citations", citation_count));
    }

    info!(has_author_bio, citation_count, stats_density, "E-E-A-T scan finished.");
    EeatResults {
        has_author_bio,
        citation_count,
        stats_density,
        score_part,
        issues,
    }
}
