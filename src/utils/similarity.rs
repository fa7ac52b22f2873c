//! Similarity scoring used by the deduplication engine (spec §4.4) to cluster
//! near-duplicate channels: Jaccard similarity over name tokens, and
//! character n-gram similarity over URLs.

use std::collections::HashSet;

/// Jaccard similarity between the whitespace-split token sets of two
/// already-normalized names. `1.0` for two empty sets (treated as identical).
pub fn jaccard_token_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = a.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 1.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Character n-gram (default trigram) Jaccard similarity, used to compare
/// stream URLs where near-duplicates share a path but differ in query
/// string or a load-balancer host prefix.
pub fn ngram_similarity(a: &str, b: &str) -> f64 {
    const N: usize = 3;
    let grams_a = char_ngrams(a, N);
    let grams_b = char_ngrams(b, N);

    if grams_a.is_empty() && grams_b.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }

    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn char_ngrams(s: &str, n: usize) -> HashSet<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        if chars.is_empty() {
            return HashSet::new();
        }
        return HashSet::from([chars.iter().collect()]);
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jaccard_identical_names_is_one() {
        assert_eq!(jaccard_token_similarity("espn news", "espn news"), 1.0);
    }

    #[test]
    fn jaccard_disjoint_names_is_zero() {
        assert_eq!(jaccard_token_similarity("espn news", "cnn world"), 0.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let score = jaccard_token_similarity("espn news east", "espn news west");
        assert!(score > 0.3 && score < 0.6, "score was {score}");
    }

    #[test]
    fn ngram_catches_near_identical_urls() {
        let score = ngram_similarity(
            "http://cdn1.example.com/stream/espn.m3u8",
            "http://cdn2.example.com/stream/espn.m3u8",
        );
        assert!(score > 0.8, "score was {score}");
    }

    #[test]
    fn ngram_low_for_unrelated_urls() {
        let score = ngram_similarity("http://a.example.com/x", "http://totally-different.net/y");
        assert!(score < 0.5, "score was {score}");
    }
}
