//! End-to-end audits against local mock servers.

use chrono::{Duration as ChronoDuration, Utc};
use geo_audit::core::config::{AuditConfig, SearchConfig, SummaryConfig};
use geo_audit::core::models::{AuthorityStatus, ProbeMethod};
use geo_audit::core::providers::{
    AuthorityProvider, Capabilities, GoogleSearchAuthority, OpenAiSummary, SummaryProvider,
};
use geo_audit::core::scanner::AuditPipeline;
use geo_audit::AuditError;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALLOW_ALL_ROBOTS: &str = "User-agent: *\nDisallow:\n";

fn capsule() -> String {
    vec!["resposta"; 45].join(" ")
}

fn article_page(links: &[String]) -> String {
    let modified = (Utc::now() - ChronoDuration::days(10)).to_rfc3339();
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{l}">fonte</a>"#))
        .collect();
    format!(
        r#"<!doctype html>
<html lang="pt">
<head>
  <title>Guia de Rust</title>
  <script type="application/ld+json">
  {{
    "@context": "https://schema.org",
    "@type": "Article",
    "headline": "Guia de Rust",
    "author": {{"@type": "Person", "name": "Ana Lima", "sameAs": "https://www.wikidata.org/wiki/Q42"}},
    "dateModified": "{modified}"
  }}
  </script>
</head>
<body>
  <main>
    <h1>Guia de Rust</h1>
    <section id="o-que-e">
      <h2>O que é X?</h2>
      <p>{capsule}</p>
    </section>
    <p>{anchors}</p>
  </main>
</body>
</html>"#,
        capsule = capsule(),
    )
}

fn fast_config() -> AuditConfig {
    AuditConfig {
        page_timeout_secs: 5,
        robots_timeout_secs: 2,
        probe_timeout_secs: 2,
        ..AuditConfig::default()
    }
}

async fn mount_page(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn well_formed_page_passes_core_checks() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL_ROBOTS).await;
    mount_page(&server, article_page(&[])).await;

    let started = Utc::now();
    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let report = pipeline.run(&format!("{}/article", server.uri())).await.unwrap();
    assert!(report.timestamp >= started && report.timestamp <= Utc::now(), "stamped at fetch time");

    let modules = &report.modules;
    assert_eq!(modules.robots.score_part, 100.0);
    assert!(modules.robots.bots.iter().all(|b| b.allowed));
    assert_eq!(modules.structure.h1_count, 1);
    assert!(modules.structure.question_headers_count >= 1);
    assert!(modules.structure.answer_capsules_count >= 1);
    assert_eq!(modules.structure.fragment_anchors_count, 1);
    assert!(modules.schema.issues.is_empty(), "{:?}", modules.schema.issues);
    assert!(modules.schema.freshness_valid);
    assert!(modules.schema.found_types.contains("Article"));
    assert_eq!(modules.content.container, "main");
    assert_eq!(modules.links.total_external, 0);
    assert_eq!(modules.links.score_part, 100.0);

    assert!((0.0..=100.0).contains(&report.geo_score));
    assert_eq!(report.score_policy, "v2");
    assert_eq!(report.topic.as_deref(), Some("Guia de Rust"));
    assert_eq!(report.authority, AuthorityStatus::Disabled);
    assert!(report.qualitative_summary.is_none());
    assert!(!report.recommendations.iter().any(|r| r.code == "ROBOTS_BOTS_BLOCKED"));
}

#[tokio::test]
async fn blocked_bots_lead_the_recommendations() {
    let server = MockServer::start().await;
    mount_robots(&server, "User-agent: GPTBot\nDisallow: /\n\nUser-agent: *\nAllow: /\n").await;
    mount_page(&server, article_page(&[])).await;

    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let report = pipeline.run(&format!("{}/article", server.uri())).await.unwrap();

    assert_eq!(report.modules.robots.blocked_bots(), vec!["GPTBot"]);
    assert_eq!(report.modules.robots.score_part, 80.0);
    assert_eq!(report.recommendations[0].code, "ROBOTS_BOTS_BLOCKED");
}

#[tokio::test]
async fn missing_robots_is_degraded_not_fatal() {
    let server = MockServer::start().await;
    mount_page(&server, article_page(&[])).await;

    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let report = pipeline.run(&format!("{}/article", server.uri())).await.unwrap();

    assert_eq!(report.modules.robots.score_part, 0.0);
    assert!(report.modules.robots.error.is_some());
    assert!(report.recommendations.iter().any(|r| r.code == "ROBOTS_UNREACHABLE"));
}

#[tokio::test]
async fn broken_external_links_cost_ten_points_each() {
    let site = MockServer::start().await;
    let external = MockServer::start().await;
    mount_robots(&site, ALLOW_ALL_ROBOTS).await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&external)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&external)
        .await;

    let links = vec![
        format!("{}/ok", external.uri()),
        format!("{}/dead#section", external.uri()),
        format!("{}/dead", external.uri()),
    ];
    mount_page(&site, article_page(&links)).await;

    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let report = pipeline.run(&format!("{}/article", site.uri())).await.unwrap();

    let results = &report.modules.links;
    assert_eq!(results.total_external, 2, "fragment variants collapse");
    assert_eq!(results.sampled, 2);
    assert_eq!(results.broken_count, 1);
    assert_eq!(results.score_part, 90.0);
    let dead = results.broken_links().next().unwrap();
    assert_eq!(dead.status, Some(404));
    assert_eq!(dead.method, ProbeMethod::Head);
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.code == "LINKS_BROKEN" && r.message.starts_with("Fix 1 broken external links")));
}

#[tokio::test]
async fn page_fetch_is_retried_once() {
    let server = MockServer::start().await;
    mount_robots(&server, ALLOW_ALL_ROBOTS).await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, article_page(&[])).await;

    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let report = pipeline.run(&format!("{}/article", server.uri())).await;
    assert!(report.is_ok());
}

#[tokio::test]
async fn second_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let err = pipeline.run(&format!("{}/article", server.uri())).await.unwrap_err();
    assert!(matches!(err, AuditError::Status { status: 500, .. }));
    assert!(err.is_network());
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let pipeline = AuditPipeline::with_capabilities(fast_config(), Capabilities::offline()).unwrap();
    let err = pipeline.run("   ").await.unwrap_err();
    assert!(matches!(err, AuditError::InvalidUrl(_)));
}

#[tokio::test]
async fn providers_report_inline() {
    let site = MockServer::start().await;
    let apis = MockServer::start().await;
    mount_robots(&site, ALLOW_ALL_ROBOTS).await;
    mount_page(&site, article_page(&[])).await;

    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("key", "search-key"))
        .and(query_param("cx", "engine"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "searchInformation": {"totalResults": "1230"},
            "items": [{}, {}]
        })))
        .mount(&apis)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&apis)
        .await;

    let search = SearchConfig {
        api_key: Some("search-key".into()),
        engine_id: Some("engine".into()),
        endpoint: format!("{}/customsearch/v1", apis.uri()),
        timeout_secs: 5,
    };
    let summary = SummaryConfig {
        api_key: Some("sk-test".into()),
        endpoint: format!("{}/v1/chat/completions", apis.uri()),
        timeout_secs: 5,
        ..SummaryConfig::default()
    };
    let mut capabilities = Capabilities::offline();
    let authority: Arc<dyn AuthorityProvider> = Arc::new(GoogleSearchAuthority::from_config(&search).unwrap());
    let summary_provider: Arc<dyn SummaryProvider> = Arc::new(OpenAiSummary::from_config(&summary).unwrap());
    capabilities.authority = Some(authority);
    capabilities.summary = Some(summary_provider);

    let pipeline = AuditPipeline::with_capabilities(fast_config(), capabilities).unwrap();
    let report = pipeline.run(&format!("{}/article", site.uri())).await.unwrap();

    match &report.authority {
        AuthorityStatus::Available(snapshot) => {
            assert_eq!(snapshot.indexed_pages, 1230);
            assert_eq!(snapshot.sample_results, 2);
        }
        other => panic!("unexpected authority status: {other:?}"),
    }
    let summary = report.qualitative_summary.unwrap();
    assert!(summary.starts_with("Summary unavailable"), "{summary}");
}
