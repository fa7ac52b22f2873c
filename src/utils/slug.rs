//! Filename-safe slugification for synthesized artwork and per-channel
//! playlist fragments (spec §4.7, §4.9).

use std::sync::LazyLock;

use regex::Regex;

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Lowercase, transliterate, and collapse runs of non-alphanumeric
/// characters into a single hyphen. Never returns an empty string; falls
/// back to `"channel"` so callers can always append a hash suffix safely.
pub fn slugify(input: &str) -> String {
    let ascii = deunicode::deunicode(input).to_lowercase();
    let collapsed = NON_SLUG.replace_all(&ascii, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        "channel".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_names() {
        assert_eq!(slugify("ESPN HD!"), "espn-hd");
        assert_eq!(slugify("Café Münster"), "cafe-munster");
    }

    #[test]
    fn falls_back_on_empty_input() {
        assert_eq!(slugify("***"), "channel");
        assert_eq!(slugify(""), "channel");
    }
}
