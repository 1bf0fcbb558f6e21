// src/core/scanner/entity_scanner.rs

//! Entity extraction as an ordered chain of strategies.
//!
//! The first strategy that returns a non-empty list wins. The default chain
//! runs the proper-noun recognizer first and falls back to counting
//! capitalized words.

use crate::core::document::Document;
use crate::core::models::{Entity, EntityLabel, EntityMethod, EntityResults};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info};

/// Only the first characters of the page text are handed to a recognizer.
pub const RECOGNIZER_TEXT_LIMIT: usize = 100_000;
pub const TOP_ENTITIES: usize = 10;

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\p{Lu}\p{Ll}+\b").unwrap());
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}][\p{L}\p{N}'’.-]*").unwrap());

/// Sentence-initial function words (pt + en) that are capitalized but never entities.
const STOP_WORDS: &[&str] = &[
    "O", "A", "Os", "As", "Um", "Uma", "E", "Em", "No", "Na", "De", "Do", "Da", "Para", "Por",
    "Com", "Se", "Que", "Como", "Mas", "Este", "Esta", "Isso", "Ele", "Ela", "The", "An", "And",
    "In", "On", "At", "Of", "For", "With", "This", "That", "It", "We", "You", "They", "He", "She",
    "But", "Or", "If", "When", "What", "Why", "How", "Our", "Your", "There", "Here", "To", "From",
    "By", "Is", "Are",
];

/// Lower-case words allowed inside a multi-token name ("Banco do Brasil").
const CONNECTORS: &[&str] = &["de", "da", "do", "dos", "das", "of"];

const ORG_SUFFIXES: &[&str] = &[
    "Inc", "Ltd", "Ltda", "Corp", "SA", "Group", "University", "Universidade", "Instituto",
    "Institute", "Company", "Foundation", "Fundação", "Bank", "Banco", "Agency", "Ministry",
    "Ministério",
];

/// Prepositions that mark the following name as a place.
const LOCATION_CUES: &[&str] = &["in", "em", "at", "near", "from", "para"];

/// One labelled mention found by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub text: String,
    pub label: EntityLabel,
}

/// Named-entity recognizer plugged into [`RecognizerStrategy`].
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Mention>;
}

/// One step of the extraction chain.
pub trait EntityStrategy: Send + Sync {
    fn method(&self) -> EntityMethod;
    fn extract(&self, text: &str) -> Vec<Entity>;
}

/// Counts items and ranks them by frequency, ties broken by first occurrence.
fn rank<K, I>(items: I) -> Vec<(K, usize)>
where
    K: std::hash::Hash + Eq + Clone,
    I: IntoIterator<Item = K>,
{
    let mut counts: HashMap<K, (usize, usize)> = HashMap::new();
    for (position, item) in items.into_iter().enumerate() {
        counts.entry(item).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(K, usize, usize)> = counts
        .into_iter()
        .map(|(k, (count, first))| (k, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(TOP_ENTITIES)
        .map(|(k, count, _)| (k, count))
        .collect()
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Runs an [`EntityRecognizer`] and keeps labelled mentions longer than two characters.
pub struct RecognizerStrategy {
    recognizer: Box<dyn EntityRecognizer>,
}

impl RecognizerStrategy {
    pub fn new(recognizer: Box<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }
}

impl Default for RecognizerStrategy {
    fn default() -> Self {
        Self::new(Box::new(ProperNounRecognizer))
    }
}

impl EntityStrategy for RecognizerStrategy {
    fn method(&self) -> EntityMethod {
        EntityMethod::Recognizer
    }

    fn extract(&self, text: &str) -> Vec<Entity> {
        let text = truncate_chars(text, RECOGNIZER_TEXT_LIMIT);
        let mentions = self
            .recognizer
            .recognize(text)
            .into_iter()
            .filter(|m| m.text.chars().count() > 2)
            .map(|m| (m.text, m.label));
        rank(mentions)
            .into_iter()
            .map(|((text, label), count)| Entity {
                text,
                label: Some(label),
                count,
            })
            .collect()
    }
}

/// Counts capitalized words outside the stop list, lower-cased.
pub struct CapitalizationStrategy;

impl EntityStrategy for CapitalizationStrategy {
    fn method(&self) -> EntityMethod {
        EntityMethod::Capitalization
    }

    fn extract(&self, text: &str) -> Vec<Entity> {
        let words = CAPITALIZED_WORD
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|w| !STOP_WORDS.contains(w))
            .map(str::to_lowercase);
        rank(words)
            .into_iter()
            .map(|(text, count)| Entity {
                text,
                label: None,
                count,
            })
            .collect()
    }
}

/// Heuristic recognizer: groups runs of capitalized tokens (allowing lower-case
/// connectors inside) and labels each run.
///
/// - a run opening or closing with an organization word is `ORG`;
/// - a run right after a location preposition is `LOC`;
/// - a two- or three-token run without connectors is `PERSON`;
/// - anything else multi-token is `MISC`.
///
/// Stop words never open a run, so a sentence-initial "The" or "Como" is
/// skipped while a sentence-initial name is kept.
pub struct ProperNounRecognizer;

impl ProperNounRecognizer {
    fn label(run: &[&str], after_location_cue: bool) -> EntityLabel {
        let has_connector = run.iter().any(|t| CONNECTORS.contains(t));
        let org_marker = run
            .first()
            .into_iter()
            .chain(run.last())
            .any(|t| ORG_SUFFIXES.contains(t));
        if org_marker {
            EntityLabel::Org
        } else if after_location_cue {
            EntityLabel::Loc
        } else if (2..=3).contains(&run.len()) && !has_connector {
            EntityLabel::Person
        } else {
            EntityLabel::Misc
        }
    }
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(char::is_uppercase)
}

impl EntityRecognizer for ProperNounRecognizer {
    fn recognize(&self, text: &str) -> Vec<Mention> {
        let mut mentions = Vec::new();
        for sentence in text.split(['.', '!', '?', '\n', ';', ':']) {
            let tokens: Vec<&str> = TOKEN
                .find_iter(sentence)
                .map(|m| m.as_str().trim_end_matches(['.', '-', '\'', '’']))
                .collect();
            let mut i = 0;
            while i < tokens.len() {
                if !is_capitalized(tokens[i]) || STOP_WORDS.contains(&tokens[i]) {
                    i += 1;
                    continue;
                }
                let start = i;
                let mut end = i + 1;
                while end < tokens.len() {
                    if is_capitalized(tokens[end]) && !STOP_WORDS.contains(&tokens[end]) {
                        end += 1;
                    } else if CONNECTORS.contains(&tokens[end])
                        && tokens.get(end + 1).is_some_and(|t| is_capitalized(t))
                    {
                        end += 2;
                    } else {
                        break;
                    }
                }
                let run = &tokens[start..end];
                let after_cue = start > 0 && LOCATION_CUES.contains(&tokens[start - 1].to_lowercase().as_str());
                mentions.push(Mention {
                    text: run.join(" "),
                    label: Self::label(run, after_cue),
                });
                i = end;
            }
        }
        mentions
    }
}

/// The default chain: recognizer (when enabled), then capitalization.
pub fn default_strategies(use_recognizer: bool) -> Vec<Box<dyn EntityStrategy>> {
    let mut chain: Vec<Box<dyn EntityStrategy>> = Vec::new();
    if use_recognizer {
        chain.push(Box::new(RecognizerStrategy::default()));
    }
    chain.push(Box::new(CapitalizationStrategy));
    chain
}

/// Lower-cased topic tokens. Single characters are dropped since they match
/// almost any entity.
pub fn topic_tokens(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

pub fn is_topic_relevant(topic: Option<&str>, entities: &[Entity]) -> bool {
    let Some(topic) = topic else {
        return false;
    };
    let names: Vec<String> = entities.iter().map(|e| e.text.to_lowercase()).collect();
    topic_tokens(topic)
        .iter()
        .any(|token| names.iter().any(|name| name.contains(token.as_str())))
}

/// Extracts the page's main entities and checks them against its topic.
pub fn run_entity_scan(doc: &Document<'_>, strategies: &[Box<dyn EntityStrategy>]) -> EntityResults {
    info!(url = %doc.url(), "Starting entity scan.");
    let text = doc.plain_text();
    let topic = doc.topic();

    let mut results = EntityResults {
        topic: topic.clone(),
        ..Default::default()
    };
    for strategy in strategies {
        let entities = strategy.extract(&text);
        debug!(method = %strategy.method(), found = entities.len(), "Entity strategy ran.");
        if !entities.is_empty() {
            results.method = Some(strategy.method());
            results.entities = entities;
            break;
        }
    }

    results.topic_relevant = is_topic_relevant(topic.as_deref(), &results.entities);
    results.score_part = if results.entities.is_empty() {
        results.issues.push("No entities detected in the page text".to_string());
        0.0
    } else if results.topic_relevant {
        100.0
    } else {
        results
            .issues
            .push("Main entities do not match the page topic".to_string());
        50.0
    };

    info!(
        method = ?results.method,
        entities = results.entities.len(),
        relevant = results.topic_relevant,
        "Entity scan finished."
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::test_support::page;

    struct Silent;
    impl EntityRecognizer for Silent {
        fn recognize(&self, _text: &str) -> Vec<Mention> {
            Vec::new()
        }
    }

    #[test]
    fn capitalization_counts_and_lowercases() {
        let entities = CapitalizationStrategy.extract("Maria visitou o Brasil. Maria adorou o Brasil.");
        assert_eq!(
            entities,
            vec![
                Entity { text: "maria".into(), label: None, count: 2 },
                Entity { text: "brasil".into(), label: None, count: 2 },
            ]
        );
    }

    #[test]
    fn stop_words_are_not_entities() {
        let entities = CapitalizationStrategy.extract("The cat. Como assim? Rust is great.");
        let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["rust"]);
    }

    #[test]
    fn recognizer_labels_runs() {
        let mentions = ProperNounRecognizer.recognize(
            "A Ana Souza falou com o Banco do Brasil. A reunião foi em Lisboa com a Acme Corp.",
        );
        let find = |t: &str| mentions.iter().find(|m| m.text == t).map(|m| m.label);
        assert_eq!(find("Ana Souza"), Some(EntityLabel::Person));
        assert_eq!(find("Banco do Brasil"), Some(EntityLabel::Org));
        assert_eq!(find("Lisboa"), Some(EntityLabel::Loc));
        assert_eq!(find("Acme Corp"), Some(EntityLabel::Org));
    }

    #[test]
    fn recognizer_strategy_drops_short_mentions_and_ranks() {
        struct Fixed;
        impl EntityRecognizer for Fixed {
            fn recognize(&self, _text: &str) -> Vec<Mention> {
                let m = |t: &str, l| Mention { text: t.to_string(), label: l };
                vec![
                    m("UK", EntityLabel::Loc),
                    m("Acme", EntityLabel::Org),
                    m("Lisboa", EntityLabel::Loc),
                    m("Lisboa", EntityLabel::Loc),
                ]
            }
        }
        let entities = RecognizerStrategy::new(Box::new(Fixed)).extract("irrelevant");
        let names: Vec<&str> = entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["Lisboa", "Acme"]);
        assert_eq!(entities[0].count, 2);
    }

    #[test]
    fn chain_falls_back_when_recognizer_is_empty() {
        let p = page(
            "https://example.com",
            "<html><head><title>Guia do Brasil</title></head><body><p>Maria visitou o Brasil. Maria adorou o Brasil.</p></body></html>",
        );
        let chain: Vec<Box<dyn EntityStrategy>> = vec![
            Box::new(RecognizerStrategy::new(Box::new(Silent))),
            Box::new(CapitalizationStrategy),
        ];
        let results = run_entity_scan(&Document::parse(&p), &chain);
        assert_eq!(results.method, Some(EntityMethod::Capitalization));
        assert!(results.topic_relevant);
        assert_eq!(results.score_part, 100.0);
    }

    #[test]
    fn topic_tokens_skip_single_letters() {
        assert_eq!(topic_tokens("O que é GEO? Um guia"), vec!["que", "geo", "um", "guia"]);
        let entities = vec![Entity { text: "Oslo".into(), label: None, count: 1 }];
        assert!(!is_topic_relevant(Some("O guia"), &entities));
    }

    #[test]
    fn acronym_topics_can_match() {
        let entities = vec![Entity { text: "AI Act".into(), label: Some(EntityLabel::Misc), count: 1 }];
        assert!(is_topic_relevant(Some("AI"), &entities));
    }

    #[test]
    fn default_chain_keeps_sentence_initial_names() {
        let p = page(
            "https://example.com",
            "<html><head><title>Guia do Brasil</title></head><body><p>Maria visitou o Brasil. Maria adorou o Brasil.</p></body></html>",
        );
        let results = run_entity_scan(&Document::parse(&p), &default_strategies(true));
        assert_eq!(results.method, Some(EntityMethod::Recognizer));
        let names: Vec<&str> = results.entities.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(names, vec!["Maria", "Brasil"]);
        assert!(results.entities.iter().all(|e| e.count == 2));
        assert!(results.topic_relevant);
    }

    #[test]
    fn empty_page_scores_zero() {
        let p = page("https://example.com", "<html><body><p>tudo minúsculo aqui</p></body></html>");
        let results = run_entity_scan(&Document::parse(&p), &default_strategies(true));
        assert!(results.entities.is_empty());
        assert_eq!(results.score_part, 0.0);
        assert_eq!(results.method, None);
    }
}
