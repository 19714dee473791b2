use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Maximum number of words taken as the holder's name.
const NAME_WORDS: usize = 3;

/// Structured identity fields pulled from an OCR transcript.
///
/// Each field is `None` when its pattern did not match.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub id_number: Option<String>,
}

fn labelled_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"DOB[:\s]*(\d{2}/\d{2}/\d{4})").expect("labelled date pattern is valid")
    })
}

fn bare_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{2}/\d{2}/\d{4})").expect("date pattern is valid"))
}

/// Group 1 is the number; the leading group keeps a date's year from
/// starting a match.
fn id_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|[^/\d])(\d{4} \d{4} \d{4})\b").expect("id pattern is valid")
    })
}

pub fn extract_fields(transcript: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    // A labelled date of birth wins over any earlier unlabelled date.
    let date = labelled_date_pattern()
        .captures(transcript)
        .or_else(|| bare_date_pattern().captures(transcript));
    if let Some(caps) = date {
        // Group 0 starts at the label when one is present.
        let start = caps.get(0).map_or(0, |m| m.start());
        fields.date_of_birth = caps.get(1).map(|m| m.as_str().to_string());
        fields.name = name_before(&transcript[..start]);
    }

    fields.id_number = id_number_pattern()
        .captures(transcript)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    fields
}

/// Last (up to) three words of `prefix`, or `None` when it has no words.
fn name_before(prefix: &str) -> Option<String> {
    let words: Vec<&str> = prefix.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let from = words.len().saturating_sub(NAME_WORDS);
    Some(words[from..].join(" "))
}
