//! Deterministic genre classifier keyed off name tokens (spec §4.7 step 2).
//! Falls back to `"General"` when no rule matches.

const RULES: &[(&str, &[&str])] = &[
    ("Sports", &["espn", "sport", "fox sport", "bein", "motogp", "nba", "nfl", "uefa", "golf"]),
    ("News", &["news", "cnn", "bbc", "msnbc", "al jazeera", "fox news"]),
    ("Kids", &["kids", "cartoon", "disney", "nick", "junior", "toon"]),
    ("Movies", &["movie", "cinema", "film", "hbo", "showtime"]),
    ("Music", &["music", "mtv", "vh1", "hits"]),
    ("Documentary", &["discovery", "history", "nat geo", "national geographic", "documentary"]),
];

/// Classify a (already-cleaned) display name into a primary genre tag.
pub fn infer_genre(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    for (genre, keywords) in RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return genre.to_string();
        }
    }
    "General".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_keywords() {
        assert_eq!(infer_genre("ESPN HD"), "Sports");
        assert_eq!(infer_genre("BBC World News"), "News");
        assert_eq!(infer_genre("Cartoon Network"), "Kids");
    }

    #[test]
    fn falls_back_to_general() {
        assert_eq!(infer_genre("Local Community Channel"), "General");
    }
}
