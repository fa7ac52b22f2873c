//! Per-channel playlist fragment formatting and filename assignment
//! (spec §4.9). Pure logic; I/O lives in [`super::Emitter`].

use std::collections::HashSet;

use crate::models::Channel;
use crate::utils::{slugify, UrlUtils};

/// `#EXTM3U\n#EXTINF:-1 <attrs>, <title>\n<lowercase-url>\n` (spec §4.9,
/// §6). Attribute order matches [`super::playlist::format_playlist`].
pub fn format_fragment(channel: &Channel) -> String {
    let mut attrs = String::new();
    if let Some(genre) = &channel.genre {
        attrs.push_str(&format!(" group-title=\"{genre}\""));
    }
    if let Some(logo) = &channel.logo {
        attrs.push_str(&format!(" tvg-logo=\"{logo}\""));
    }
    attrs.push_str(&format!(" tvg-id=\"{}\"", channel.id));

    format!(
        "#EXTM3U\n#EXTINF:-1{attrs}, {title}\n{url}\n",
        title = channel.name,
        url = UrlUtils::normalize(&channel.stream_url),
    )
}

/// `<slug(name)>_<slug(id)>.m3u8`, uniquified with a `_2`, `_3`, … suffix on
/// collision (spec §4.9).
pub fn fragment_filename(channel: &Channel, seen: &mut HashSet<String>) -> String {
    let base = format!("{}_{}", slugify(&channel.name), slugify(&channel.id));
    let mut candidate = format!("{base}.m3u8");
    let mut suffix = 2;
    while seen.contains(&candidate) {
        candidate = format!("{base}_{suffix}.m3u8");
        suffix += 1;
    }
    seen.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniquifies_colliding_filenames() {
        let mut seen = HashSet::new();
        let a = Channel::new("1".into(), "ESPN".into(), "http://a".into(), "r", 0);
        let b = Channel::new("2".into(), "ESPN".into(), "http://b".into(), "r", 1);
        let name_a = fragment_filename(&a, &mut seen);
        let name_b = fragment_filename(&b, &mut seen);
        assert_ne!(name_a, name_b);
        assert!(name_b.ends_with("_2.m3u8") || name_b != name_a);
    }

    #[test]
    fn fragment_lowercases_url() {
        let channel = Channel::new("1".into(), "ESPN".into(), "HTTP://A/B".into(), "r", 0);
        let fragment = format_fragment(&channel);
        assert!(fragment.contains("http://a/b"));
    }
}
