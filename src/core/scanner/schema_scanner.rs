// src/core/scanner/schema_scanner.rs

use crate::core::document::Document;
use crate::core::models::SchemaResults;
use crate::core::score::ScorePolicy;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use scraper::Selector;
use serde_json::Value;
use tracing::{debug, info, warn};

static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// Schema.org types the audit validates.
pub const TARGET_TYPES: &[&str] = &[
    "Organization",
    "Person",
    "FAQPage",
    "Article",
    "Product",
    "BlogPosting",
    "NewsArticle",
];

const ARTICLE_TYPES: &[&str] = &["Article", "BlogPosting", "NewsArticle"];

/// Hosts that count as knowledge-graph entity links in `sameAs`.
const KNOWLEDGE_GRAPH_HOSTS: &[&str] = &["wikidata.org", "wikipedia.org", "g.co/kg", "google.com/search"];

/// Flattens one decoded JSON-LD block into its items.
pub fn normalize_block(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut map) => match map.remove("@graph") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("@graph".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

/// `@type` as a string, taking the first element of a type list.
pub fn item_type(item: &Value) -> Option<&str> {
    match item.get("@type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types.first().and_then(Value::as_str),
        _ => None,
    }
}

fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Non-blank `sameAs` strings of an item.
fn same_as_links(item: &Value) -> Vec<&str> {
    let links: Vec<&str> = match item.get("sameAs") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    links.into_iter().filter(|link| !link.trim().is_empty()).collect()
}

fn is_knowledge_graph_link(link: &str) -> bool {
    KNOWLEDGE_GRAPH_HOSTS.iter().any(|host| link.contains(host))
}

/// Parses RFC 3339, a plain `YYYY-MM-DD` prefix or a naive date-time.
pub fn parse_schema_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    let date_part = raw.get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn check_authors(item: &Value, label: &str, issues: &mut Vec<String>) {
    let author = item.get("author");
    if !is_present(author) {
        issues.push(format!("{label} is missing author"));
        return;
    }
    let authors: Vec<&Value> = match author {
        Some(Value::Array(list)) => list.iter().collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    };
    let unlinked = authors
        .iter()
        .filter(|a| a.is_object())
        .any(|a| !is_present(a.get("sameAs")) && !is_present(a.get("url")));
    if unlinked {
        issues.push(format!("{label} author has neither sameAs nor url"));
    }
}

/// Validates every JSON-LD block of the page against the target types.
///
/// `now` anchors the freshness window.
pub fn run_schema_scan(doc: &Document<'_>, policy: &ScorePolicy, now: DateTime<Utc>) -> SchemaResults {
    info!(url = %doc.url(), "Starting schema scan.");
    let mut results = SchemaResults::default();

    for (index, script) in doc.html().select(&JSON_LD).enumerate() {
        results.blocks_found += 1;
        let raw = script.text().collect::<String>();
        let value: Value = match serde_json::from_str(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                warn!(block = index + 1, error = %e, "Malformed JSON-LD block.");
                results.issues.push(format!("Malformed JSON-LD block #{}", index + 1));
                continue;
            }
        };

        for (item_index, item) in normalize_block(value).iter().enumerate() {
            if is_present(item.get("reviewedBy")) {
                results.has_reviewer = true;
            }
            if same_as_links(item).into_iter().any(is_knowledge_graph_link) {
                results.entity_links_valid = true;
            }

            let Some(kind) = item_type(item).filter(|t| TARGET_TYPES.contains(t)) else {
                continue;
            };
            debug!(kind, "Schema type found.");
            results.found_types.insert(kind.to_string());
            let label = format!("{} (block {}, item {})", kind, index + 1, item_index + 1);

            match kind {
                "Organization" | "Person" => {
                    if same_as_links(item).is_empty() {
                        results.issues.push(format!("{label} has no sameAs entity link"));
                    }
                }
                "FAQPage" => results.has_faq = true,
                k if ARTICLE_TYPES.contains(&k) => {
                    results.has_article = true;
                    check_authors(item, &label, &mut results.issues);
                    let modified = item.get("dateModified");
                    if !is_present(modified) {
                        results.issues.push(format!("{label} is missing dateModified"));
                    } else if let Some(date) = modified.and_then(Value::as_str) {
                        let fresh = parse_schema_date(date)
                            .is_some_and(|d| (now - d).num_days() < policy.thresholds.freshness_days);
                        results.freshness_valid |= fresh;
                    }
                }
                _ => {}
            }
        }
    }

    let mut score: f64 = 0.0;
    if !results.found_types.is_empty() {
        score = 60.0;
        if results.has_faq {
            score += 10.0;
        }
        if results.has_article {
            score += 10.0;
        }
    }
    score -= 10.0 * results.issues.len() as f64;
    results.score_part = score.clamp(0.0, 100.0);

    info!(
        blocks = results.blocks_found,
        types = ?results.found_types,
        issues = results.issues.len(),
        "Schema scan finished."
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::test_support::page;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn scan(blocks: &[&str]) -> SchemaResults {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{b}</script>"#))
            .collect();
        let page = page(
            "https://example.com/post",
            &format!("<html><head>{scripts}</head><body></body></html>"),
        );
        run_schema_scan(&Document::parse(&page), &ScorePolicy::v2(), now())
    }

    #[test]
    fn graph_and_arrays_are_flattened() {
        assert_eq!(normalize_block(json!({"@graph": [{"@type": "A"}, {"@type": "B"}]})).len(), 2);
        assert_eq!(normalize_block(json!([{"@type": "A"}])).len(), 1);
        assert_eq!(normalize_block(json!({"@type": "A"})).len(), 1);
        assert!(normalize_block(json!("text")).is_empty());
    }

    #[test]
    fn type_lists_use_first_entry() {
        assert_eq!(item_type(&json!({"@type": ["Article", "Thing"]})), Some("Article"));
        assert_eq!(item_type(&json!({"name": "x"})), None);
    }

    #[test]
    fn complete_article_has_no_issues() {
        let results = scan(&[r#"{
            "@type": "Article",
            "author": {"@type": "Person", "name": "Ana", "sameAs": "https://www.wikidata.org/wiki/Q1"},
            "dateModified": "2025-05-20T08:00:00Z"
        }"#]);
        assert!(results.issues.is_empty(), "{:?}", results.issues);
        assert!(results.has_article);
        assert!(results.freshness_valid);
        assert_eq!(results.score_part, 70.0);
    }

    #[test]
    fn article_rules_report_each_gap() {
        let results = scan(&[
            r#"{"@type": "BlogPosting"}"#,
            r#"{"@type": "NewsArticle", "author": [{"name": "A", "url": "https://a.example"}, {"name": "B"}], "dateModified": "2024-01-01"}"#,
        ]);
        assert_eq!(
            results.issues,
            vec![
                "BlogPosting (block 1, item 1) is missing author".to_string(),
                "BlogPosting (block 1, item 1) is missing dateModified".to_string(),
                "NewsArticle (block 2, item 1) author has neither sameAs nor url".to_string(),
            ]
        );
        assert!(!results.freshness_valid, "2024-01-01 is outside the window");
        assert_eq!(results.score_part, 40.0);
    }

    #[test]
    fn malformed_block_is_skipped_with_issue() {
        let results = scan(&["{not json", r#"{"@type": "FAQPage", "reviewedBy": {"name": "Dr. X"}}"#]);
        assert_eq!(results.blocks_found, 2);
        assert_eq!(results.issues, vec!["Malformed JSON-LD block #1".to_string()]);
        assert!(results.has_faq);
        assert!(results.has_reviewer);
        assert_eq!(results.score_part, 60.0);
    }

    #[test]
    fn organization_needs_same_as() {
        let results = scan(&[r#"{"@graph": [{"@type": "Organization", "name": "ACME"}, {"@type": "WebPage"}]}"#]);
        assert_eq!(results.found_types.len(), 1);
        assert_eq!(results.issues, vec!["Organization (block 1, item 1) has no sameAs entity link".to_string()]);
        assert!(!results.entity_links_valid);
    }

    #[test]
    fn blank_same_as_counts_as_missing() {
        let results = scan(&[
            r#"{"@type": "Organization", "name": "ACME", "sameAs": ""}"#,
            r#"{"@type": "Person", "name": "Ana", "sameAs": [""]}"#,
        ]);
        assert_eq!(
            results.issues,
            vec![
                "Organization (block 1, item 1) has no sameAs entity link".to_string(),
                "Person (block 2, item 1) has no sameAs entity link".to_string(),
            ]
        );
        assert_eq!(results.score_part, 40.0);
    }

    #[test]
    fn same_item_in_two_blocks_gets_distinct_issues() {
        let results = scan(&[r#"{"@type": "Organization", "name": "A"}"#, r#"{"@type": "Organization", "name": "B"}"#]);
        assert_eq!(results.issues.len(), 2);
        assert_ne!(results.issues[0], results.issues[1]);
    }

    #[test]
    fn date_modified_presence_ignores_its_type() {
        let results = scan(&[
            r#"{"@type": "Article", "author": {"name": "A", "url": "https://a.example"}, "dateModified": ""}"#,
            r#"{"@type": "Article", "author": {"name": "B", "url": "https://b.example"}, "dateModified": {"@value": "2025-05-20"}}"#,
        ]);
        assert_eq!(results.issues, vec!["Article (block 1, item 1) is missing dateModified".to_string()]);
        assert!(!results.freshness_valid);
    }

    #[test]
    fn no_schema_scores_zero() {
        let results = scan(&[]);
        assert_eq!(results.score_part, 0.0);
        assert!(results.found_types.is_empty());
    }

    #[test]
    fn date_formats() {
        assert!(parse_schema_date("2025-05-20T08:00:00+02:00").is_some());
        assert!(parse_schema_date("2025-05-20T08:00:00").is_some());
        assert!(parse_schema_date("2025-05-20").is_some());
        assert!(parse_schema_date("May 2025").is_none());
    }
}
