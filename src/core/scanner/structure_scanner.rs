// src/core/scanner/structure_scanner.rs

use crate::core::document::{normalize_whitespace, Document};
use crate::core::models::StructureResults;
use crate::core::readability::{detect_language, flesch_reading_ease};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use tracing::{debug, info};

static HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static ANCHOR_CANDIDATES: Lazy<Selector> =
    Lazy::new(|| Selector::parse("section[id], div[id]").unwrap());

/// Interrogative openers, Portuguese and English.
const QUESTION_STARTERS: &[&str] = &[
    "como", "o que", "por que", "quando", "onde", "qual", "quem", "how", "what", "why", "when",
    "where", "which", "who",
];

/// Tags that end the search for an answer paragraph after a question header.
const STRUCTURAL_CONTAINERS: &[&str] = &[
    "div", "section", "article", "main", "aside", "nav", "header", "footer",
];

/// Word-count window of an answer capsule.
const CAPSULE_WORDS: std::ops::RangeInclusive<usize> = 40..=60;

const HIERARCHY_FLOOR: f64 = 50.0;
const H1_VIOLATION_CAP: f64 = 40.0;

/// One element in the flattened sibling sequence that follows a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Paragraph { words: usize },
    Heading(u8),
    Container,
    Other,
}

impl Block {
    fn from_element(el: ElementRef<'_>) -> Self {
        let name = el.value().name();
        if name == "p" {
            let text = el.text().collect::<String>();
            Block::Paragraph {
                words: text.split_whitespace().count(),
            }
        } else if let Some(level) = heading_level(name) {
            Block::Heading(level)
        } else if STRUCTURAL_CONTAINERS.contains(&name) {
            Block::Container
        } else {
            Block::Other
        }
    }
}

/// Flattens the element siblings that follow `el` (text nodes are skipped).
pub fn following_blocks(el: ElementRef<'_>) -> Vec<Block> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .map(Block::from_element)
        .collect()
}

/// Word count of the first paragraph reached before any heading or
/// structural container.
pub fn next_paragraph_words(blocks: &[Block]) -> Option<usize> {
    for block in blocks {
        match block {
            Block::Paragraph { words } => return Some(*words),
            Block::Heading(_) | Block::Container => return None,
            Block::Other => continue,
        }
    }
    None
}

pub fn is_answer_capsule(blocks: &[Block]) -> bool {
    next_paragraph_words(blocks).is_some_and(|w| CAPSULE_WORDS.contains(&w))
}

fn heading_level(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// True when the text ends in `?` or opens with an interrogative word.
pub fn is_question_header(text: &str) -> bool {
    let text = text.trim();
    if text.ends_with('?') {
        return true;
    }
    let lower = text.to_lowercase();
    QUESTION_STARTERS.iter().any(|starter| {
        lower
            .strip_prefix(starter)
            .is_some_and(|rest| rest.chars().next().is_none_or(|c| !c.is_alphanumeric()))
    })
}

/// Validates an ordered heading-level sequence.
///
/// Returns the hierarchy score and the issues found.
pub fn check_hierarchy(levels: &[u8]) -> (f64, Vec<String>) {
    let mut issues = Vec::new();
    let h1_count = levels.iter().filter(|&&l| l == 1).count();
    let h1_violation = match h1_count {
        1 => false,
        0 => {
            issues.push("Missing H1".to_string());
            true
        }
        _ => {
            issues.push("Multiple H1s".to_string());
            true
        }
    };

    for pair in levels.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next > prev + 1 {
            issues.push(format!("Header Jump: H{} → H{}", prev, next));
        }
    }

    if issues.is_empty() {
        return (100.0, issues);
    }
    let mut score = (100.0 - 10.0 * issues.len() as f64).max(HIERARCHY_FLOOR);
    if h1_violation {
        score = score.min(H1_VIOLATION_CAP);
    }
    (score, issues)
}

/// Runs the heading, question/capsule, fragment-anchor and readability checks.
pub fn run_structure_scan(doc: &Document<'_>) -> StructureResults {
    info!(url = %doc.url(), "Starting structure scan.");

    let headings: Vec<(u8, ElementRef<'_>)> = doc
        .html()
        .select(&HEADINGS)
        .filter_map(|el| heading_level(el.value().name()).map(|level| (level, el)))
        .collect();
    let levels: Vec<u8> = headings.iter().map(|(level, _)| *level).collect();
    let (hierarchy_score, issues) = check_hierarchy(&levels);

    let mut question_headers = Vec::new();
    let mut answer_capsules_count = 0;
    for (level, el) in headings.iter().filter(|(level, _)| matches!(level, 2 | 3)) {
        let text = normalize_whitespace(&el.text().collect::<String>());
        if !is_question_header(&text) {
            continue;
        }
        let blocks = following_blocks(*el);
        if is_answer_capsule(&blocks) {
            answer_capsules_count += 1;
        }
        debug!(level, header = %text, "Question header found.");
        question_headers.push(text);
    }

    let fragment_anchors_count = doc
        .html()
        .select(&ANCHOR_CANDIDATES)
        .filter(|el| {
            el.children()
                .filter_map(ElementRef::wrap)
                .any(|child| child.value().name() == "h2")
        })
        .count();

    let paragraph_text = doc.paragraphs().join(" ");
    let language = detect_language(doc.lang().as_deref(), &paragraph_text);
    let readability = flesch_reading_ease(&paragraph_text, language);

    let mut score_part = 0.4 * hierarchy_score;
    if !question_headers.is_empty() {
        score_part += 20.0;
    }
    if answer_capsules_count > 0 {
        score_part += 20.0;
    }
    if fragment_anchors_count > 0 {
        score_part += 20.0;
    }

    let results = StructureResults {
        h1_count: levels.iter().filter(|&&l| l == 1).count(),
        hierarchy_score,
        question_headers_count: question_headers.len(),
        question_headers,
        answer_capsules_count,
        fragment_anchors_count,
        readability,
        score_part: score_part.min(100.0),
        issues,
    };
    info!(
        issues = results.issues.len(),
        questions = results.question_headers_count,
        capsules = results.answer_capsules_count,
        "Structure scan finished."
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::test_support::page;

    fn words(n: usize) -> String {
        vec!["palavra"; n].join(" ")
    }

    #[test]
    fn clean_hierarchy_scores_100() {
        assert_eq!(check_hierarchy(&[1, 2, 3, 2, 3, 3, 2]), (100.0, vec![]));
        // Going back up any number of levels is fine.
        assert_eq!(check_hierarchy(&[1, 2, 3, 4, 2]).0, 100.0);
    }

    #[test]
    fn header_jump_is_reported() {
        let (score, issues) = check_hierarchy(&[1, 2, 4]);
        assert_eq!(issues, vec!["Header Jump: H2 → H4".to_string()]);
        assert_eq!(score, 90.0);
    }

    #[test]
    fn many_issues_hit_the_floor() {
        let (score, issues) = check_hierarchy(&[1, 3, 1, 3, 1, 3, 1, 3]);
        assert_eq!(issues.len(), 5, "one Multiple H1s plus four jumps");
        assert!(score <= H1_VIOLATION_CAP, "multiple H1s cap the score");

        let (score, _) = check_hierarchy(&[1, 3, 2, 4, 3, 5, 4, 6, 2, 4, 2, 4]);
        assert_eq!(score, HIERARCHY_FLOOR);
    }

    #[test]
    fn missing_h1_caps_below_floor() {
        let (score, issues) = check_hierarchy(&[2, 3]);
        assert_eq!(issues, vec!["Missing H1".to_string()]);
        assert_eq!(score, H1_VIOLATION_CAP);
    }

    #[test]
    fn question_detection_is_bilingual() {
        assert!(is_question_header("O que é GEO?"));
        assert!(is_question_header("Como funciona o robots.txt"));
        assert!(is_question_header("What's new"));
        assert!(is_question_header("Pricing?"));
        assert!(!is_question_header("Comodidades do hotel"));
        assert!(!is_question_header("Overview"));
    }

    #[test]
    fn lookahead_skips_other_blocks_and_stops_at_structure() {
        let capsule = [Block::Other, Block::Paragraph { words: 45 }];
        assert!(is_answer_capsule(&capsule));

        let blocked = [Block::Container, Block::Paragraph { words: 45 }];
        assert!(!is_answer_capsule(&blocked));

        let too_short = [Block::Paragraph { words: 12 }];
        assert!(!is_answer_capsule(&too_short));

        let after_heading = [Block::Heading(3), Block::Paragraph { words: 50 }];
        assert_eq!(next_paragraph_words(&after_heading), None);
    }

    #[test]
    fn scan_counts_questions_capsules_and_anchors() {
        let html = format!(
            r#"<html lang="pt"><body>
            <h1>Guia</h1>
            <section id="intro">
              <h2>O que é X?</h2>
              <p>{}</p>
              <h3>Detalhes</h3>
              <p>Texto curto.</p>
            </section>
            <h2>Por que usar X</h2>
            <div>wrapper</div>
            <p>{}</p>
            </body></html>"#,
            words(45),
            words(45)
        );
        let page = page("https://example.com/x", &html);
        let doc = Document::parse(&page);
        let results = run_structure_scan(&doc);

        assert_eq!(results.h1_count, 1);
        assert_eq!(results.hierarchy_score, 100.0);
        assert_eq!(results.question_headers_count, 2);
        assert_eq!(results.answer_capsules_count, 1, "the div stops the second lookahead");
        assert_eq!(results.fragment_anchors_count, 1);
        assert!(results.readability.is_some());
        assert_eq!(results.score_part, 100.0);
    }
}
