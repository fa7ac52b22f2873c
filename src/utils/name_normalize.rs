//! Name normalization shared by the deduplication engine (spec §4.4) and the
//! ordering service's whole-word priority match (spec §4.8).

use regex::Regex;
use std::sync::LazyLock;

/// Quality markers and other redundant tokens stripped during comparison.
/// Matched as whole words only, so e.g. "HDFS Network" is untouched.
const REDUNDANT_TOKENS: &[&str] =
    &["HD", "FHD", "UHD", "SD", "4K", "1080P", "720P", "480P", "FREE", "TV", "CHANNEL", "HQ"];

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\(][^\]\)]*[\]\)]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn token_regex(token: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(token))).unwrap()
}

static TOKEN_REGEXES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| REDUNDANT_TOKENS.iter().map(|t| token_regex(t)).collect());

/// Markers recognized in a raw channel name, in match-priority order. Used
/// by the source repositories to populate `Channel::quality` when no
/// explicit quality field is present (spec §4.4's redundant-token list
/// doubles as the quality signal stripped before name comparison).
static QUALITY_MARKERS: LazyLock<Vec<(Regex, crate::models::Quality)>> = LazyLock::new(|| {
    use crate::models::Quality::*;
    [
        ("4K", FourK),
        ("UHD", Uhd),
        ("FHD", Fhd),
        ("1080P", Fhd),
        ("HD", Hd),
        ("720P", Hd),
        ("SD", Sd),
        ("480P", Sd),
    ]
    .iter()
    .map(|(token, quality)| (token_regex(token), *quality))
    .collect()
});

/// Scan a raw channel name for a whole-word quality marker (`HD`, `FHD`,
/// `UHD`, `4K`, `SD`, or a resolution token like `1080P`). Returns `None`
/// when no marker is present, leaving the caller's default (`Unknown`) in
/// place.
pub fn detect_quality_marker(name: &str) -> Option<crate::models::Quality> {
    QUALITY_MARKERS.iter().find(|(re, _)| re.is_match(name)).map(|(_, quality)| *quality)
}

/// Lowercase, strip accent marks, drop bracketed annotations and quality
/// markers, and collapse whitespace. Used purely for *comparison* — display
/// names go through [`crate::enrichment::name_clean`] instead, which
/// preserves casing.
pub fn normalize_name(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let no_brackets = BRACKETED.replace_all(&ascii, " ");
    let mut stripped = no_brackets.into_owned();
    for re in TOKEN_REGEXES.iter() {
        stripped = re.replace_all(&stripped, " ").into_owned();
    }
    let lower = stripped.to_lowercase();
    WHITESPACE.replace_all(lower.trim(), " ").into_owned()
}

/// Strip punctuation and collapse whitespace, without removing quality
/// markers — used by the ordering service's "whole-word match after
/// punctuation stripping" rule (spec §4.8), which must still match "ESPN HD"
/// against a configured priority name of "ESPN HD".
pub fn strip_punctuation(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let cleaned: String = ascii
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    WHITESPACE.replace_all(cleaned.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quality_markers_as_whole_words() {
        assert_eq!(normalize_name("ESPN HD"), "espn");
        assert_eq!(normalize_name("ESPN"), "espn");
        assert_eq!(normalize_name("HDFS Network"), "hdfs network");
    }

    #[test]
    fn strips_brackets_and_accents() {
        assert_eq!(normalize_name("Café [Backup]"), "cafe");
        assert_eq!(normalize_name("  Multi   Space  Name "), "multi space name");
    }

    #[test]
    fn strip_punctuation_preserves_quality_markers() {
        assert_eq!(strip_punctuation("ESPN-HD!"), "espn hd");
    }
}
