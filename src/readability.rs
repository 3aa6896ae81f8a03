//! Flesch reading-ease scoring.
//!
//! Higher scores mean easier text: 90-100 is very easy, 0-30 is very
//! difficult. Syllables are estimated from vowel groups, which is accurate
//! enough for English prose and a rough guide for other languages.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("word regex should be valid"));
static SENTENCE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence regex should be valid"));

const VOWELS: &str = "aeiouyáàâäéèêëíìîïıóòôöúùûüå";

/// Computes the Flesch reading-ease score of `text`, rounded to 2 decimals.
///
/// Text without any words scores 0.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let words = words(text);
    if words.is_empty() {
        return 0.0;
    }

    let sentences = sentence_count(text);
    let syllables: usize = words.iter().map(|word| count_syllables(word)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    (score * 100.0).round() / 100.0
}

/// Word tokens that contain at least one letter; bare numbers do not count.
fn words(text: &str) -> Vec<&str> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|word| word.chars().any(char::is_alphabetic))
        .collect()
}

fn sentence_count(text: &str) -> usize {
    SENTENCE_END_RE
        .split(text)
        .filter(|segment| segment.chars().any(char::is_alphabetic))
        .count()
        .max(1)
}

pub fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count = 0;
    let mut previous_was_vowel = false;

    for c in word.chars() {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    // Silent trailing "e" ("make"), but not the syllabic "-le" ("table")
    if count > 1 && word.ends_with('e') && !word.ends_with("le") {
        count -= 1;
    }

    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_syllables() {
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("make"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("readability"), 5);
        assert_eq!(count_syllables("rhythm"), 1);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(flesch_reading_ease(""), 0.0);
        assert_eq!(flesch_reading_ease("   42 17 "), 0.0);
    }

    #[test]
    fn test_simple_sentence_is_very_easy() {
        // 6 words, 1 sentence, 6 syllables
        let score = flesch_reading_ease("The cat sat on the mat.");
        assert!((score - 116.145).abs() < 0.01, "score was {}", score);
    }

    #[test]
    fn test_complex_text_scores_lower_than_simple_text() {
        let simple = flesch_reading_ease("I like it. We go now. It is fun.");
        let complex = flesch_reading_ease(
            "Comprehensive organizational methodologies necessitate interdisciplinary \
             collaboration between international institutions.",
        );
        assert!(simple > complex);
    }

    #[test]
    fn test_text_without_terminator_is_one_sentence() {
        assert_eq!(sentence_count("no punctuation here at all"), 1);
        assert_eq!(sentence_count("One. Two! Three?"), 3);
    }
}
