use std::sync::OnceLock;

use regex::Regex;

/// Characters that rarely appear on a correctly oriented ID card but are
/// common OCR artefacts of rotated text.
pub const DISALLOWED_SYMBOLS: &str = "/\\|@#%^&*()_+=[]{}<>";

const WORD_WEIGHT: f64 = 2.0;
const LENGTH_DIVISOR: f64 = 5.0;
const MIXED_CASE_PENALTY: f64 = 2.0;
const SYMBOL_PENALTY: f64 = 3.0;

fn mixed_case_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:[A-Z][a-z]|[a-z][A-Z]){3,}").expect("mixed-case pattern is valid")
    })
}

/// Heuristic quality score of an OCR transcript.
///
/// `2·words + Σlen/5 − 2·(words with ≥3 case transitions) − 3·(symbols)`.
/// Longer, cleanly cased, symbol-free text scores higher.
pub fn score_transcript(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();

    let word_count_score = words.len() as f64 * WORD_WEIGHT;
    let length_bonus =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / LENGTH_DIVISOR;
    let mixed_words = words
        .iter()
        .filter(|w| mixed_case_pattern().is_match(w))
        .count();
    let symbols = text
        .chars()
        .filter(|c| DISALLOWED_SYMBOLS.contains(*c))
        .count();

    word_count_score + length_bonus
        - mixed_words as f64 * MIXED_CASE_PENALTY
        - symbols as f64 * SYMBOL_PENALTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_empty_text_scores_zero() {
        assert_relative_eq!(score_transcript(""), 0.0);
        assert_relative_eq!(score_transcript("   \n\t "), 0.0);
    }

    #[test]
    fn test_word_count_and_length() {
        // 3 words * 2 + (4 + 5 + 4) / 5
        assert_relative_eq!(score_transcript("John Kumar 1990"), 6.0 + 13.0 / 5.0);
    }

    #[test]
    fn test_mixed_case_word_penalised() {
        // "aBcDeF" has alternating case; "Normal" does not
        let clean = score_transcript("Normal");
        let mixed = score_transcript("aBcDeF");
        assert_relative_eq!(clean - mixed, 2.0);
    }

    #[test]
    fn test_symbols_penalised_per_character() {
        // "a/b" -> 1 word, length 3, one symbol
        assert_relative_eq!(score_transcript("a/b"), 2.0 + 0.6 - 3.0);
        assert_relative_eq!(score_transcript("{x}"), 2.0 + 0.6 - 6.0);
    }

    #[test]
    fn test_unicode_length_counts_characters() {
        assert_relative_eq!(score_transcript("ÉÉÉÉÉ"), 2.0 + 1.0);
    }

    #[rstest]
    #[case::one_more_word("GOVERNMENT OF INDIA", "GOVERNMENT OF")]
    #[case::longer_text("Name John Kumar DOB", "Name John")]
    #[case::same_symbols("Male / Female extra", "Male / Female")]
    fn test_more_words_never_score_lower(#[case] longer: &str, #[case] shorter: &str) {
        assert!(score_transcript(longer) >= score_transcript(shorter));
    }

    #[test]
    fn test_rotated_garbage_scores_below_clean_text() {
        let clean = "GOVERNMENT OF INDIA John Kumar Smith DOB 01/01/1990 Male";
        let garbage = "|_ ]{ aBcDeFg <> ## ^^";
        assert!(score_transcript(clean) > score_transcript(garbage));
    }
}
