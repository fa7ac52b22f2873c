//! Name cleaning (spec §4.7 step 1): strip redundant tokens and normalize
//! separators for the *display* name, preserving `originalName` when a
//! change occurs. Falls back to the original when cleaning would leave
//! nothing usable.

use std::sync::LazyLock;

use regex::Regex;

const REDUNDANT_TOKENS: &[&str] = &["HD", "FHD", "UHD", "SD", "4K", "FREE", "TV"];

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\[\(][^\]\)]*[\]\)]").unwrap());
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[_\-\.]+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9]").unwrap());

static TOKEN_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REDUNDANT_TOKENS
        .iter()
        .map(|t| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(t))).unwrap())
        .collect()
});

/// Clean a display name: drop bracketed annotations and redundant quality
/// markers, normalize separators to spaces, collapse whitespace. Returns the
/// original `name` unchanged if the result would be empty or alphanumeric-free.
pub fn clean_name(name: &str) -> String {
    let no_brackets = BRACKETED.replace_all(name, " ");
    let separators_normalized = SEPARATORS.replace_all(&no_brackets, " ");

    let mut stripped = separators_normalized.into_owned();
    for re in TOKEN_REGEXES.iter() {
        stripped = re.replace_all(&stripped, " ").into_owned();
    }

    let collapsed = WHITESPACE.replace_all(stripped.trim(), " ").into_owned();

    if collapsed.is_empty() || !ALPHANUMERIC.is_match(&collapsed) {
        name.to_string()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_quality_markers_and_brackets() {
        assert_eq!(clean_name("ESPN HD [Backup]"), "ESPN");
        assert_eq!(clean_name("Disney_Channel-HD"), "Disney Channel");
    }

    #[test]
    fn keeps_original_when_cleaning_empties_the_name() {
        assert_eq!(clean_name("HD"), "HD");
        assert_eq!(clean_name("[HD]"), "[HD]");
    }

    #[test]
    fn leaves_ordinary_names_untouched() {
        assert_eq!(clean_name("CNN International"), "CNN International");
    }
}
