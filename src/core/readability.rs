// src/core/readability.rs

//! Flesch Reading Ease with the Portuguese adaptation.
//!
//! English: `206.835 - 1.015 * ASL - 84.6 * ASW`
//! Portuguese: `248.835 - 1.015 * ASL - 84.6 * ASW`
//!
//! where ASL is the average sentence length in words and ASW the average
//! number of syllables per word.

use crate::core::models::{Language, Readability, ReadingLevel};

/// Function words used to guess the language when `<html lang>` is absent.
const PT_MARKERS: &[&str] = &[
    "que", "não", "uma", "para", "com", "por", "mais", "como", "dos", "das", "são", "também", "você",
];
const EN_MARKERS: &[&str] = &[
    "the", "and", "that", "with", "for", "this", "are", "from", "have", "which", "you", "not", "was",
];

const VOWELS: &[char] = &[
    'a', 'e', 'i', 'o', 'u', 'y', 'á', 'à', 'â', 'ã', 'é', 'ê', 'í', 'ó', 'ô', 'õ', 'ú', 'ü',
];

/// Picks the formula language from the page's `lang` attribute, falling back
/// to a function-word vote over the text.
pub fn detect_language(lang_attr: Option<&str>, text: &str) -> Language {
    if let Some(lang) = lang_attr {
        if lang.starts_with("pt") {
            return Language::Portuguese;
        }
        if lang.starts_with("en") {
            return Language::English;
        }
    }
    let (mut pt, mut en) = (0usize, 0usize);
    for word in text.split_whitespace() {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if PT_MARKERS.contains(&word.as_str()) {
            pt += 1;
        } else if EN_MARKERS.contains(&word.as_str()) {
            en += 1;
        }
    }
    if pt > en {
        Language::Portuguese
    } else {
        Language::English
    }
}

/// Scores `text`, or returns `None` when it holds no words.
pub fn flesch_reading_ease(text: &str, language: Language) -> Option<Readability> {
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() {
        return None;
    }
    let sentences = count_sentences(text);
    let syllables: usize = words.iter().map(|w| count_word_syllables(w)).sum();

    let asl = words.len() as f64 / sentences as f64;
    let asw = syllables as f64 / words.len() as f64;
    let base = match language {
        Language::English => 206.835,
        Language::Portuguese => 248.835,
    };
    let score = (base - 1.015 * asl - 84.6 * asw).clamp(0.0, 100.0);
    let score = (score * 10.0).round() / 10.0;

    Some(Readability {
        flesch_reading_ease: score,
        level: reading_level(score),
        language,
    })
}

pub fn reading_level(score: f64) -> ReadingLevel {
    if score >= 75.0 {
        ReadingLevel::VeryEasy
    } else if score >= 50.0 {
        ReadingLevel::EasyMedium
    } else if score >= 25.0 {
        ReadingLevel::Hard
    } else {
        ReadingLevel::VeryHard
    }
}

/// Sentence count (heuristic: runs of `.`, `!`, `?` end a sentence).
fn count_sentences(text: &str) -> usize {
    let mut count = 0;
    let mut in_terminator = false;
    for c in text.chars() {
        let is_terminator = matches!(c, '.' | '!' | '?');
        if is_terminator && !in_terminator {
            count += 1;
        }
        in_terminator = is_terminator;
    }
    // Trailing text without a terminator is still a sentence.
    let ends_open = text
        .trim_end()
        .chars()
        .last()
        .is_some_and(|c| !matches!(c, '.' | '!' | '?'));
    (count + usize::from(ends_open)).max(1)
}

/// Vowel-group syllable count; a silent trailing `e` is dropped for longer words.
fn count_word_syllables(word: &str) -> usize {
    let word: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    if word.is_empty() {
        return 0;
    }
    if word.chars().count() <= 3 {
        return 1;
    }

    let mut count = 0;
    let mut prev_vowel = false;
    for ch in word.chars() {
        let is_vowel = VOWELS.contains(&ch);
        if is_vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = is_vowel;
    }

    if word.ends_with('e') && count > 1 {
        count -= 1;
    }
    count.max(1)
}
