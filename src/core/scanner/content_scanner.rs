// src/core/scanner/content_scanner.rs

use crate::core::document::{element_text, Document};
use crate::core::models::ContentResults;
use crate::core::score::ScorePolicy;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::info;

static MAIN: Lazy<Selector> = Lazy::new(|| Selector::parse(r#"main, [role="main"]"#).unwrap());
static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// Subtrees that never count as primary content.
const BOILERPLATE_TAGS: &[&str] = &[
    "nav", "header", "footer", "script", "style", "noscript", "iframe", "aside",
];

/// Picks the primary content container and reports its name.
fn primary_container<'a>(doc: &'a Document<'_>) -> (ElementRef<'a>, &'static str, bool) {
    let html = doc.html();
    if let Some(main) = html.select(&MAIN).next() {
        return (main, "main", true);
    }
    if let Some(article) = html.select(&ARTICLE).next() {
        return (article, "article", true);
    }
    match html.select(&BODY).next() {
        Some(body) => (body, "body", false),
        None => (html.root_element(), "body", false),
    }
}

/// Text-to-markup ratio in percent, rounded to two decimals.
pub fn text_ratio(text_len: usize, markup_len: usize) -> f64 {
    if markup_len == 0 {
        return 0.0;
    }
    let ratio = text_len as f64 / markup_len as f64 * 100.0;
    (ratio * 100.0).round() / 100.0
}

/// Measures how much of the page is primary content.
pub fn run_content_scan(doc: &Document<'_>, policy: &ScorePolicy) -> ContentResults {
    info!(url = %doc.url(), "Starting content scan.");
    let (container, name, has_semantic_marker) = primary_container(doc);
    let text = element_text(container, BOILERPLATE_TAGS);

    let text_length = text.chars().count();
    let markup_length = doc.raw().chars().count();
    let ratio = text_ratio(text_length, markup_length);
    let page_bytes = doc.page_bytes();
    let oversized = page_bytes > policy.thresholds.page_size_ceiling;

    let mut issues = Vec::new();
    if !has_semantic_marker {
        issues.push("No <main> or <article> element marks the primary content".to_string());
    }
    if ratio <= policy.thresholds.text_ratio_floor {
        issues.push(format!(
            "Low text-to-markup ratio: {:.2}% (floor {}%)",
            ratio, policy.thresholds.text_ratio_floor
        ));
    }
    if oversized {
        issues.push(format!("Page weighs {} bytes", page_bytes));
    }

    let score_part = if ratio > policy.thresholds.text_ratio_floor && has_semantic_marker {
        100.0
    } else {
        50.0
    };

    info!(container = name, ratio, page_bytes, "Content scan finished.");
    ContentResults {
        container: name.to_string(),
        has_semantic_marker,
        text_length,
        markup_length,
        text_ratio: ratio,
        page_bytes,
        oversized,
        score_part,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::test_support::page;

    #[test]
    fn main_wins_over_article_and_skips_boilerplate() {
        let p = page(
            "https://example.com",
            "<html><body><nav>Menu items</nav><article>ignored</article><main><header>Top</header><p>Real content here</p><aside>Ad</aside></main></body></html>",
        );
        let results = run_content_scan(&Document::parse(&p), &ScorePolicy::v2());
        assert_eq!(results.container, "main");
        assert_eq!(results.text_length, "Real content here".len());
        assert!(results.has_semantic_marker);
    }

    #[test]
    fn role_main_counts_as_main() {
        let p = page("https://example.com", r#"<html><body><div role="main">Texto</div></body></html>"#);
        assert_eq!(run_content_scan(&Document::parse(&p), &ScorePolicy::v2()).container, "main");
    }

    #[test]
    fn text_heavy_article_scores_full() {
        let body = "palavra ".repeat(200);
        let p = page("https://example.com", &format!("<html><body><article><p>{body}</p></article></body></html>"));
        let results = run_content_scan(&Document::parse(&p), &ScorePolicy::v2());
        assert_eq!(results.container, "article");
        assert!(results.text_ratio > 10.0);
        assert_eq!(results.score_part, 100.0);
        assert!(results.issues.is_empty());
    }

    #[test]
    fn body_fallback_scores_half() {
        let body = "palavra ".repeat(200);
        let p = page("https://example.com", &format!("<html><body><div>{body}</div></body></html>"));
        let results = run_content_scan(&Document::parse(&p), &ScorePolicy::v2());
        assert_eq!(results.container, "body");
        assert!(!results.has_semantic_marker);
        assert_eq!(results.score_part, 50.0);
    }

    #[test]
    fn ratio_rounding_and_empty_markup() {
        assert_eq!(text_ratio(1, 3), 33.33);
        assert_eq!(text_ratio(5, 0), 0.0);
    }

    #[test]
    fn oversized_page_is_flagged() {
        let mut p = page("https://example.com", "<html><body><main>x</main></body></html>");
        p.bytes = 600_000;
        let results = run_content_scan(&Document::parse(&p), &ScorePolicy::v2());
        assert!(results.oversized);
    }
}
