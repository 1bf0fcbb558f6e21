//! The static catalogue of every finding the recommendation engine can emit.
//! Each entry carries a human-readable explanation of why the finding matters
//! to generative answer engines and the steps to fix it. The UI looks entries
//! up by code when the user selects a recommendation.

use crate::core::models::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// High-level groups of findings.
///
/// The declaration order is the recommendation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// Crawler access granted by robots.txt.
    Robots,
    /// Headings, question headers, answer capsules, anchors and readability.
    Structure,
    /// JSON-LD structured data.
    Schema,
    /// Primary content density and semantic markup.
    Content,
    /// Experience, expertise, authority and trust signals.
    Credibility,
    /// Named entities and topical focus.
    Entities,
    /// Outbound link health and citation authority.
    Links,
    /// Page weight.
    Size,
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::Robots => write!(f, "AI Crawler Access"),
            FindingCategory::Structure => write!(f, "Content Structure"),
            FindingCategory::Schema => write!(f, "Structured Data"),
            FindingCategory::Content => write!(f, "Main Content"),
            FindingCategory::Credibility => write!(f, "E-E-A-T Signals"),
            FindingCategory::Entities => write!(f, "Entities & Topic"),
            FindingCategory::Links => write!(f, "Outbound Links"),
            FindingCategory::Size => write!(f, "Page Weight"),
        }
    }
}

/// Everything the UI shows about one finding.
pub struct FindingDetail {
    /// Machine-readable identifier (e.g. "SCHEMA_MISSING").
    pub code: &'static str,
    pub title: &'static str,
    pub category: FindingCategory,
    pub severity: Severity,
    /// Why the finding hurts visibility in generative answers.
    pub description: &'static str,
    /// Concrete steps to fix it.
    pub remediation: &'static str,
}

static FINDINGS: &[FindingDetail] = &[
    // --- Robots ---
    FindingDetail {
        code: "ROBOTS_BOTS_BLOCKED",
        title: "AI Crawlers Blocked",
        category: FindingCategory::Robots,
        severity: Severity::Critical,
        description: "robots.txt forbids one or more AI crawlers from fetching this page. Answer engines that honour robots.txt cannot read, quote or cite content they are not allowed to crawl.",
        remediation: "Add 'Allow' rules (or remove the 'Disallow' rules) for GPTBot, ClaudeBot, PerplexityBot, GoogleOther and Applebot-Extended in the groups that currently block them."
    },
    FindingDetail {
        code: "ROBOTS_UNREACHABLE",
        title: "robots.txt Unreachable",
        category: FindingCategory::Robots,
        severity: Severity::Warning,
        description: "The site's robots.txt could not be retrieved. Crawlers treat a failing robots.txt inconsistently; some back off from the whole host.",
        remediation: "Serve a robots.txt at the root of the host with HTTP 200, even if it only contains 'User-agent: *' and an empty 'Disallow:'."
    },
    // --- Structure ---
    FindingDetail {
        code: "STRUCTURE_HIERARCHY",
        title: "Broken Heading Hierarchy",
        category: FindingCategory::Structure,
        severity: Severity::Warning,
        description: "The page does not have exactly one H1, or it skips heading levels. Engines use the heading outline to split a page into quotable sections.",
        remediation: "Keep a single H1 for the page subject and nest H2/H3 without skipping levels (H2 → H3, never H2 → H4)."
    },
    FindingDetail {
        code: "STRUCTURE_NO_QUESTIONS",
        title: "No Question Headers",
        category: FindingCategory::Structure,
        severity: Severity::Warning,
        description: "No H2/H3 is phrased as a question. Conversational queries are matched most easily against headings that mirror them.",
        remediation: "Rephrase key H2/H3 headings as the questions your readers ask, e.g. 'What is ...?' or 'O que é ...?'."
    },
    FindingDetail {
        code: "STRUCTURE_NO_CAPSULES",
        title: "No Answer Capsules",
        category: FindingCategory::Structure,
        severity: Severity::Warning,
        description: "No question header is followed directly by a 40 to 60 word paragraph. Short self-contained answers are what generative engines lift into their responses.",
        remediation: "Right after each question header, add one paragraph of 40 to 60 words that answers it completely before going into detail."
    },
    FindingDetail {
        code: "STRUCTURE_NO_ANCHORS",
        title: "No Fragment Anchors",
        category: FindingCategory::Structure,
        severity: Severity::Info,
        description: "No section carries an id next to its H2, so answer engines cannot deep-link to the part of the page they cite.",
        remediation: "Wrap each H2 section in a <section> or <div> with a unique, descriptive id attribute."
    },
    FindingDetail {
        code: "STRUCTURE_HARD_TO_READ",
        title: "Hard-to-Read Text",
        category: FindingCategory::Structure,
        severity: Severity::Info,
        description: "The Flesch Reading Ease of the paragraphs is low. Long sentences and long words make passages harder to summarise faithfully.",
        remediation: "Shorten sentences, prefer common words and split dense paragraphs."
    },
    // --- Schema ---
    FindingDetail {
        code: "SCHEMA_MISSING",
        title: "No Relevant Structured Data",
        category: FindingCategory::Schema,
        severity: Severity::Critical,
        description: "No JSON-LD block declares Organization, Person, FAQPage, Article, BlogPosting, NewsArticle or Product. Structured data is the most direct way to tell an engine what the page is about and who stands behind it.",
        remediation: "Add a <script type=\"application/ld+json\"> block describing the page (Article/FAQPage/Product) and its publisher (Organization/Person)."
    },
    FindingDetail {
        code: "SCHEMA_VALIDATION",
        title: "Incomplete Structured Data",
        category: FindingCategory::Schema,
        severity: Severity::Warning,
        description: "A JSON-LD item lacks a property that answer engines rely on, such as an article author, its dateModified or an entity's sameAs links, or the block does not parse.",
        remediation: "Fill in the property named in the recommendation and validate the markup with a structured-data testing tool."
    },
    FindingDetail {
        code: "SCHEMA_NO_KNOWLEDGE_GRAPH",
        title: "No Knowledge-Graph Links",
        category: FindingCategory::Schema,
        severity: Severity::Info,
        description: "No 'sameAs' points at Wikidata, Wikipedia or the Google Knowledge Graph, so engines cannot reconcile your organisation or authors with entities they already know.",
        remediation: "Add 'sameAs' URLs for Wikidata/Wikipedia/Knowledge Graph entries to your Organization and Person items."
    },
    FindingDetail {
        code: "SCHEMA_STALE",
        title: "Stale Article Date",
        category: FindingCategory::Schema,
        severity: Severity::Info,
        description: "The article's dateModified is older than the freshness window or cannot be parsed. Engines favour recently maintained sources.",
        remediation: "Review the content and update dateModified (ISO 8601) whenever it changes materially."
    },
    // --- Content ---
    FindingDetail {
        code: "CONTENT_NO_SEMANTIC_MARKER",
        title: "No Main Content Marker",
        category: FindingCategory::Content,
        severity: Severity::Warning,
        description: "Neither <main> nor <article> wraps the primary content, so extractors have to guess which text matters.",
        remediation: "Wrap the primary content in a single <main> (or <article>) element and keep navigation and sidebars outside it."
    },
    FindingDetail {
        code: "CONTENT_LOW_TEXT_RATIO",
        title: "Low Text-to-Markup Ratio",
        category: FindingCategory::Content,
        severity: Severity::Warning,
        description: "Very little of the page is readable text compared with its markup and scripts. Thin or script-heavy pages are often skipped or truncated.",
        remediation: "Render the main text server-side, remove unused markup and inline scripts, and expand thin content."
    },
    // --- Credibility ---
    FindingDetail {
        code: "EEAT_NO_AUTHOR",
        title: "No Author Identification",
        category: FindingCategory::Credibility,
        severity: Severity::Warning,
        description: "The page names no author and links no professional profile, which weakens its experience and expertise signals.",
        remediation: "Add an author bio with links to LinkedIn or ORCID profiles."
    },
    FindingDetail {
        code: "EEAT_LOW_STATS",
        title: "Few Factual Data Points",
        category: FindingCategory::Credibility,
        severity: Severity::Info,
        description: "The text contains few numbers or percentages. Concrete figures make a passage more quotable and verifiable.",
        remediation: "Support the main claims with statistics, dates and measured values, with their sources."
    },
    FindingDetail {
        code: "EEAT_FEW_CITATIONS",
        title: "Few External Citations",
        category: FindingCategory::Credibility,
        severity: Severity::Info,
        description: "The page links to few external sources, so its claims cannot be cross-checked.",
        remediation: "Cite primary sources with direct links where facts are stated."
    },
    // --- Entities ---
    FindingDetail {
        code: "ENTITIES_NONE",
        title: "No Entities Detected",
        category: FindingCategory::Entities,
        severity: Severity::Info,
        description: "No named entities were found in the text. Engines anchor answers on people, organisations, places and products.",
        remediation: "Name the concrete organisations, people, places and products the page is about."
    },
    FindingDetail {
        code: "ENTITIES_OFF_TOPIC",
        title: "Entities Do Not Match Topic",
        category: FindingCategory::Entities,
        severity: Severity::Info,
        description: "The most frequent entities do not appear in the page title or H1, which blurs what the page is about.",
        remediation: "Align the title/H1 with the main entity of the text, or refocus the text on the subject the title announces."
    },
    // --- Links ---
    FindingDetail {
        code: "LINKS_BROKEN",
        title: "Broken External Links",
        category: FindingCategory::Links,
        severity: Severity::Warning,
        description: "Some sampled outbound links return an error or do not respond. Broken citations signal neglect and waste crawl budget.",
        remediation: "Update or remove the listed links."
    },
    FindingDetail {
        code: "LINKS_NO_AUTHORITY",
        title: "No Authoritative Citations",
        category: FindingCategory::Links,
        severity: Severity::Info,
        description: "No outbound link points at a government, academic or non-profit domain.",
        remediation: "Reference official statistics, research papers or institutional sources where relevant."
    },
    // --- Size ---
    FindingDetail {
        code: "SIZE_OVERSIZED",
        title: "Heavy HTML Document",
        category: FindingCategory::Size,
        severity: Severity::Info,
        description: "The HTML document is larger than the size ceiling. Crawlers may truncate large documents before reaching the main content.",
        remediation: "Move inline scripts, styles and data blobs to external files and paginate very long pages."
    },
];

/// Looks up a finding by its code.
pub fn get_finding_detail(code: &str) -> Option<&'static FindingDetail> {
    FINDINGS.iter().find(|f| f.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<&str> = FINDINGS.iter().map(|f| f.code).collect();
        assert_eq!(codes.len(), FINDINGS.len());
    }

    #[test]
    fn lookup_by_code() {
        let detail = get_finding_detail("ROBOTS_BOTS_BLOCKED").unwrap();
        assert_eq!(detail.category, FindingCategory::Robots);
        assert!(get_finding_detail("NOPE").is_none());
    }

    #[test]
    fn categories_sort_by_priority() {
        assert!(FindingCategory::Robots < FindingCategory::Structure);
        assert!(FindingCategory::Credibility < FindingCategory::Entities);
        assert!(FindingCategory::Links < FindingCategory::Size);
    }
}
