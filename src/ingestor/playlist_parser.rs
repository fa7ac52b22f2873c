//! Extended-playlist text parsing (spec §4.2). Input: a `#EXTM3U` header
//! followed by alternating `#EXTINF:` / URL line pairs. Attributes
//! (`tvg-id`, `tvg-logo`, `tvg-language`, `tvg-country`, `group-title`) are
//! lifted to named [`Channel`] fields; everything else lands in `metadata`.

use std::collections::HashMap;

use tracing::warn;

use crate::errors::ParseError;
use crate::models::Channel;
use crate::utils::name_normalize::detect_quality_marker;
use crate::utils::UrlUtils;

/// Parse playlist text into channels, tagging each with `source_tag` and
/// continuing `original_index` from `start_index` (so a hybrid aggregation
/// can parse several playlists while preserving a single insertion order).
/// Lines that can't be attached to a preceding `#EXTINF:` are skipped and
/// reported in the returned warning list rather than dropped silently.
pub fn parse_playlist(
    text: &str,
    source_tag: &str,
    start_index: usize,
) -> (Vec<Channel>, Vec<ParseError>) {
    let mut channels = Vec::new();
    let mut warnings = Vec::new();
    let mut pending: Option<PendingChannel> = None;
    let mut next_index = start_index;

    for (line_no, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line == "#EXTM3U" {
            continue;
        }

        if let Some(rest) = line.strip_prefix("#EXTINF:") {
            pending = Some(parse_extinf(rest));
        } else if line.starts_with('#') {
            continue;
        } else {
            match pending.take() {
                Some(meta) => {
                    let url = UrlUtils::normalize(line);
                    let id = meta
                        .attributes
                        .get("tvg-id")
                        .cloned()
                        .filter(|s| !s.is_empty())
                        .unwrap_or_else(|| format!("{source_tag}_{next_index}"));

                    let mut channel = Channel::new(id, meta.title, url, source_tag, next_index);
                    channel.logo = meta.attributes.get("tvg-logo").cloned();
                    channel.country = meta.attributes.get("tvg-country").cloned();
                    channel.language = meta.attributes.get("tvg-language").cloned();
                    channel.genre = meta.attributes.get("group-title").cloned();
                    channel.quality = detect_quality_marker(&channel.name).unwrap_or_default();
                    channel.metadata = meta.attributes;
                    channels.push(channel);
                    next_index += 1;
                }
                None => {
                    let err = ParseError::MalformedLine {
                        line: line_no + 1,
                        message: "playlist line has no preceding #EXTINF".to_string(),
                    };
                    warn!(error = %err, "playlist line skipped");
                    warnings.push(err);
                }
            }
        }
    }

    (channels, warnings)
}

struct PendingChannel {
    title: String,
    attributes: HashMap<String, String>,
}

/// Parse `duration[ attr="value"...],title` into title + attribute map.
fn parse_extinf(rest: &str) -> PendingChannel {
    let Some(comma) = rest.find(',') else {
        return PendingChannel { title: String::new(), attributes: HashMap::new() };
    };
    let (duration_and_attrs, title_part) = rest.split_at(comma);
    let title = title_part.trim_start_matches(',').trim().to_string();
    let attrs_text = duration_and_attrs
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest)
        .unwrap_or("");
    PendingChannel { title, attributes: parse_attributes(attrs_text) }
}

/// Hand-rolled `key="value"` attribute scanner, tolerant of both quoted and
/// bare values separated by whitespace.
fn parse_attributes(text: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut chars = text.chars().peekable();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_quotes = false;
    let mut reading_value = false;

    while let Some(ch) = chars.next() {
        match ch {
            '=' if !reading_value => {
                reading_value = true;
                if chars.peek() == Some(&'"') {
                    chars.next();
                    in_quotes = true;
                }
            }
            '"' if reading_value && in_quotes => {
                in_quotes = false;
                attributes.insert(std::mem::take(&mut key), std::mem::take(&mut value));
                reading_value = false;
            }
            c if c.is_whitespace() && !in_quotes => {
                if reading_value && !key.is_empty() {
                    attributes.insert(std::mem::take(&mut key), std::mem::take(&mut value));
                }
                reading_value = false;
            }
            c if reading_value => value.push(c),
            c => key.push(c),
        }
    }
    if reading_value && !key.is_empty() {
        attributes.insert(key, value);
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "#EXTM3U\n#EXTINF:-1 tvg-id=\"espn\" tvg-logo=\"http://x/logo.png\" group-title=\"Sports\",ESPN HD\nHTTP://A/B\n";

    #[test]
    fn parses_extinf_with_attributes() {
        let (channels, warnings) = parse_playlist(SAMPLE, "remote", 0);
        assert_eq!(channels.len(), 1);
        assert!(warnings.is_empty());
        let ch = &channels[0];
        assert_eq!(ch.id, "espn");
        assert_eq!(ch.name, "ESPN HD");
        assert_eq!(ch.stream_url, "http://a/b");
        assert_eq!(ch.logo.as_deref(), Some("http://x/logo.png"));
        assert_eq!(ch.genre.as_deref(), Some("Sports"));
    }

    #[test]
    fn skips_url_without_preceding_extinf() {
        let text = "#EXTM3U\nhttp://a/b\n";
        let (channels, warnings) = parse_playlist(text, "remote", 0);
        assert!(channels.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ParseError::MalformedLine { line: 2, .. }));
    }

    #[test]
    fn derives_quality_from_name_marker() {
        let (channels, _) = parse_playlist(SAMPLE, "remote", 0);
        assert_eq!(channels[0].quality, crate::models::Quality::Hd);
    }

    #[test]
    fn synthesizes_id_when_tvg_id_missing() {
        let text = "#EXTM3U\n#EXTINF:-1,Plain Name\nhttp://a/b\n";
        let (channels, _) = parse_playlist(text, "remote", 5);
        assert_eq!(channels[0].id, "remote_5");
        assert_eq!(channels[0].original_index, 5);
    }
}
