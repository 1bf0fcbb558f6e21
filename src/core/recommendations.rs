// src/core/recommendations.rs

use crate::core::knowledge_base::get_finding_detail;
use crate::core::models::{ModuleResults, ReadingLevel, Recommendation};
use crate::core::score::ScorePolicy;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Below this many numbers/percentages the text is flagged as data-poor.
const MIN_STATS: usize = 3;
/// Links listed inline in the broken-links message.
const BROKEN_LINKS_LISTED: usize = 5;

#[derive(Default)]
struct Collector {
    items: Vec<Recommendation>,
}

impl Collector {
    fn add(&mut self, code: &str, message: String) {
        match get_finding_detail(code) {
            Some(detail) => self.items.push(Recommendation {
                code: detail.code.to_string(),
                category: detail.category,
                severity: detail.severity,
                message,
            }),
            None => warn!(code, "Recommendation code missing from the knowledge base."),
        }
    }
}

/// Derives the ordered, deduplicated action list from the module results.
pub fn generate_recommendations(modules: &ModuleResults, policy: &ScorePolicy) -> Vec<Recommendation> {
    let mut out = Collector::default();
    let thresholds = &policy.thresholds;

    // Robots
    let robots = &modules.robots;
    if let Some(error) = &robots.error {
        out.add(
            "ROBOTS_UNREACHABLE",
            format!("Publish a reachable robots.txt at {} ({}).", robots.robots_url, error),
        );
    }
    let blocked = robots.blocked_bots();
    if !blocked.is_empty() {
        out.add(
            "ROBOTS_BOTS_BLOCKED",
            format!("Unblock the following bots in robots.txt: {}.", blocked.join(", ")),
        );
    }

    // Structure
    let structure = &modules.structure;
    if !structure.issues.is_empty() {
        out.add(
            "STRUCTURE_HIERARCHY",
            format!("Fix the heading hierarchy: {}.", structure.issues.join("; ")),
        );
    }
    if structure.question_headers_count == 0 {
        out.add(
            "STRUCTURE_NO_QUESTIONS",
            "Phrase H2/H3 headings as questions (e.g. 'What is ...?') to match conversational queries.".to_string(),
        );
    }
    if structure.answer_capsules_count == 0 {
        out.add(
            "STRUCTURE_NO_CAPSULES",
            "Add answer capsules: a 40-60 word paragraph right after each question header.".to_string(),
        );
    }
    if structure.fragment_anchors_count == 0 {
        out.add(
            "STRUCTURE_NO_ANCHORS",
            "Give each H2 section a unique id on its <section> or <div> so engines can deep-link to it.".to_string(),
        );
    }
    let hard_to_read = structure
        .readability
        .filter(|r| matches!(r.level, ReadingLevel::Hard | ReadingLevel::VeryHard));
    if let Some(readability) = hard_to_read {
        out.add(
            "STRUCTURE_HARD_TO_READ",
            format!(
                "Simplify the text: Flesch Reading Ease is {:.1} ({}).",
                readability.flesch_reading_ease, readability.level
            ),
        );
    }

    // Schema
    let schema = &modules.schema;
    if schema.found_types.is_empty() {
        out.add(
            "SCHEMA_MISSING",
            "Add JSON-LD for Organization, Article, FAQPage or Product.".to_string(),
        );
    }
    for issue in &schema.issues {
        out.add("SCHEMA_VALIDATION", format!("Fix structured data: {}.", issue));
    }
    if !schema.found_types.is_empty() && !schema.entity_links_valid {
        out.add(
            "SCHEMA_NO_KNOWLEDGE_GRAPH",
            "Add 'sameAs' links to Wikidata or the Knowledge Graph in your Organization/Person schema.".to_string(),
        );
    }
    if schema.has_article && !schema.freshness_valid {
        out.add(
            "SCHEMA_STALE",
            format!(
                "Update the article and its dateModified; it is missing, unparsable or older than {} days.",
                thresholds.freshness_days
            ),
        );
    }

    // Content
    let content = &modules.content;
    if !content.has_semantic_marker {
        out.add(
            "CONTENT_NO_SEMANTIC_MARKER",
            "Wrap the primary content in a <main> or <article> element.".to_string(),
        );
    }
    if content.text_ratio <= thresholds.text_ratio_floor {
        out.add(
            "CONTENT_LOW_TEXT_RATIO",
            format!(
                "Increase the share of readable text: the text-to-markup ratio is {:.2}% (target above {}%).",
                content.text_ratio, thresholds.text_ratio_floor
            ),
        );
    }

    // E-E-A-T
    let eeat = &modules.eeat;
    if !eeat.has_author_bio {
        out.add(
            "EEAT_NO_AUTHOR",
            "Add an author bio linking to LinkedIn or ORCID to establish expertise.".to_string(),
        );
    }
    if eeat.stats_density < MIN_STATS {
        out.add(
            "EEAT_LOW_STATS",
            "Enrich the content with statistics (percentages, figures) to strengthen factual reliability.".to_string(),
        );
    }
    if eeat.citation_count <= 2 {
        out.add(
            "EEAT_FEW_CITATIONS",
            format!("Cite more external sources: only {} found.", eeat.citation_count),
        );
    }

    // Entities
    let entities = &modules.entities;
    if entities.entities.is_empty() {
        out.add(
            "ENTITIES_NONE",
            "Name the organisations, people and places the page is about.".to_string(),
        );
    } else if !entities.topic_relevant {
        let top: Vec<&str> = entities.entities.iter().take(3).map(|e| e.text.as_str()).collect();
        out.add(
            "ENTITIES_OFF_TOPIC",
            format!(
                "Align the title with the main entities ({}) or refocus the text on '{}'.",
                top.join(", "),
                entities.topic.as_deref().unwrap_or("the page topic")
            ),
        );
    }

    // Links
    let links = &modules.links;
    if links.broken_count > 0 {
        let listed: Vec<&str> = links
            .broken_links()
            .take(BROKEN_LINKS_LISTED)
            .map(|c| c.candidate.url.as_str())
            .collect();
        out.add(
            "LINKS_BROKEN",
            format!("Fix {} broken external links: {}.", links.broken_count, listed.join(", ")),
        );
    }
    if links.total_external > 0 && links.tiers.authoritative() == 0 {
        out.add(
            "LINKS_NO_AUTHORITY",
            "Cite at least one .gov, .edu or .org source.".to_string(),
        );
    }

    // Size
    if content.oversized {
        out.add(
            "SIZE_OVERSIZED",
            format!(
                "Reduce the HTML weight: {} bytes exceeds {} bytes.",
                content.page_bytes, thresholds.page_size_ceiling
            ),
        );
    }

    let mut items = out.items;
    items.sort_by_key(|r| r.category);
    let mut seen = HashSet::new();
    items.retain(|r| seen.insert(r.message.clone()));
    debug!(count = items.len(), "Recommendations generated.");
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::knowledge_base::FindingCategory;
    use crate::core::models::*;

    fn healthy() -> ModuleResults {
        let mut m = ModuleResults::default();
        m.robots.bots = vec![BotAccess { bot: "GPTBot".into(), allowed: true }];
        m.structure.question_headers_count = 1;
        m.structure.answer_capsules_count = 1;
        m.structure.fragment_anchors_count = 1;
        m.schema.found_types.insert("Article".into());
        m.schema.has_article = true;
        m.schema.freshness_valid = true;
        m.schema.entity_links_valid = true;
        m.content.has_semantic_marker = true;
        m.content.text_ratio = 25.0;
        m.eeat.has_author_bio = true;
        m.eeat.stats_density = 10;
        m.eeat.citation_count = 5;
        m.entities.entities = vec![Entity { text: "rust".into(), label: None, count: 3 }];
        m.entities.topic_relevant = true;
        m
    }

    #[test]
    fn healthy_page_needs_nothing() {
        assert!(generate_recommendations(&healthy(), &ScorePolicy::v2()).is_empty());
    }

    #[test]
    fn blocked_bots_come_first_and_are_critical() {
        let mut m = healthy();
        m.content.oversized = true;
        m.structure.question_headers_count = 0;
        m.robots.bots.push(BotAccess { bot: "ClaudeBot".into(), allowed: false });

        let recs = generate_recommendations(&m, &ScorePolicy::v2());
        assert_eq!(recs[0].code, "ROBOTS_BOTS_BLOCKED");
        assert_eq!(recs[0].severity, Severity::Critical);
        assert_eq!(recs[0].message, "Unblock the following bots in robots.txt: ClaudeBot.");
        assert_eq!(recs.last().unwrap().category, FindingCategory::Size);
    }

    #[test]
    fn ordering_follows_category_priority() {
        let mut m = ModuleResults::default();
        m.links.broken_count = 1;
        m.links.checks = vec![LinkCheckResult {
            candidate: LinkCandidate { url: "https://dead.example/".into(), tier: AuthorityTier::Generic },
            broken: true,
            method: ProbeMethod::Head,
            status: Some(404),
        }];
        let recs = generate_recommendations(&m, &ScorePolicy::v2());
        let categories: Vec<FindingCategory> = recs.iter().map(|r| r.category).collect();
        let mut sorted = categories.clone();
        sorted.sort();
        assert_eq!(categories, sorted);
        assert!(recs.iter().any(|r| r.message == "Fix 1 broken external links: https://dead.example/."));
    }

    #[test]
    fn messages_never_repeat() {
        let mut m = healthy();
        m.schema.issues = vec!["Article (block 1, item 1) is missing author".into(); 2];
        let recs = generate_recommendations(&m, &ScorePolicy::v2());
        let validation: Vec<_> = recs.iter().filter(|r| r.code == "SCHEMA_VALIDATION").collect();
        assert_eq!(validation.len(), 1);
    }

    #[test]
    fn same_type_in_two_blocks_keeps_both_validation_items() {
        use crate::core::document::{test_support::page, Document};
        use crate::core::scanner::schema_scanner::run_schema_scan;

        let html = r#"<html><head>
            <script type="application/ld+json">{"@type": "Organization", "name": "A"}</script>
            <script type="application/ld+json">{"@type": "Organization", "name": "B"}</script>
            </head><body></body></html>"#;
        let fetched = page("https://example.com/", html);
        let mut m = healthy();
        m.schema = run_schema_scan(&Document::parse(&fetched), &ScorePolicy::v2(), chrono::Utc::now());

        let recs = generate_recommendations(&m, &ScorePolicy::v2());
        let validation: Vec<_> = recs.iter().filter(|r| r.code == "SCHEMA_VALIDATION").collect();
        assert_eq!(validation.len(), 2);
    }

    #[test]
    fn every_emitted_code_is_catalogued() {
        let mut m = ModuleResults::default();
        m.robots.error = Some("HTTP 404".into());
        m.robots.bots = vec![BotAccess { bot: "GPTBot".into(), allowed: false }];
        m.structure.issues = vec!["Missing H1".into()];
        m.structure.readability = Some(Readability {
            flesch_reading_ease: 10.0,
            level: ReadingLevel::VeryHard,
            language: Language::English,
        });
        m.schema.issues = vec!["Malformed JSON-LD block #1".into()];
        m.content.oversized = true;
        m.entities.entities = vec![Entity { text: "x".into(), label: None, count: 1 }];
        m.links.total_external = 2;
        let recs = generate_recommendations(&m, &ScorePolicy::v2());
        assert!(recs.len() >= 12);
        for rec in &recs {
            assert!(get_finding_detail(&rec.code).is_some(), "{}", rec.code);
        }
    }
}
