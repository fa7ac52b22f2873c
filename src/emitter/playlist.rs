//! Extended-playlist formatting (spec §4.9, §6). Pure formatting; I/O lives
//! in [`super::Emitter`].

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Channel;

static SANITIZE_TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s\-.()\[\]]").unwrap());

pub fn format_playlist(channels: &[Channel]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for channel in channels {
        out.push_str(&format_entry(channel));
    }
    out
}

fn format_entry(channel: &Channel) -> String {
    let attrs = format_attributes(channel);
    let title = sanitize_title(&channel.name);
    format!("#EXTINF:-1{attrs}, {title}\n{url}\n", url = channel.stream_url)
}

/// Attribute order: `group-title`, `tvg-logo`, `tvg-id`, `tvg-language`,
/// `tvg-country` (spec §6).
fn format_attributes(channel: &Channel) -> String {
    let mut attrs = String::new();
    if let Some(genre) = &channel.genre {
        attrs.push_str(&format!(" group-title=\"{genre}\""));
    }
    if let Some(logo) = &channel.logo {
        attrs.push_str(&format!(" tvg-logo=\"{logo}\""));
    }
    attrs.push_str(&format!(" tvg-id=\"{}\"", channel.id));
    if let Some(language) = &channel.language {
        attrs.push_str(&format!(" tvg-language=\"{language}\""));
    }
    if let Some(country) = &channel.country {
        attrs.push_str(&format!(" tvg-country=\"{country}\""));
    }
    attrs
}

/// Keep word chars, spaces, `-`, `.`, `()`, `[]` (spec §4.9).
fn sanitize_title(name: &str) -> String {
    SANITIZE_TITLE.replace_all(name, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_header_and_entry() {
        let mut channel = Channel::new("1".into(), "ESPN!".into(), "http://a".into(), "r", 0);
        channel.genre = Some("Sports".to_string());
        let formatted = format_playlist(&[channel]);
        assert!(formatted.starts_with("#EXTM3U\n"));
        assert!(formatted.contains("group-title=\"Sports\""));
        assert!(formatted.contains("ESPN"));
        assert!(!formatted.contains("ESPN!"));
    }
}
