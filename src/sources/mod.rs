//! Source-fusion repository family (spec §4.1). A `Source` tagged enum
//! selects the variant; a single `Repository` capability trait is shared by
//! all of them — no base class, matching the Design Notes (spec §9).

mod factory;
mod hybrid;
mod local_playlist;
mod remote_playlist;
mod tabular;
mod traits;

pub use factory::build_repository;
pub use hybrid::HybridRepository;
pub use local_playlist::LocalPlaylistRepository;
pub use remote_playlist::RemotePlaylistRepository;
pub use tabular::TabularRepository;
pub use traits::Repository;

use serde::{Deserialize, Serialize};

/// The concrete origin of a repository, selected by `ConfigView::channels_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Tabular,
    RemotePlaylist,
    LocalPlaylist,
    Hybrid,
    /// The configured source string was itself a URL; behaves as
    /// [`SourceKind::RemotePlaylist`] (spec §4.1 "direct URL source").
    DirectUrl,
}

impl SourceKind {
    /// Parse the `channelsSource` configuration value. `automatic` resolves
    /// to [`SourceKind::Hybrid`], the most permissive variant. A bare URL
    /// literal resolves to [`SourceKind::DirectUrl`].
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "tabular" => SourceKind::Tabular,
            "remote_playlist" | "remote_m3u" => SourceKind::RemotePlaylist,
            "local_playlist" => SourceKind::LocalPlaylist,
            "hybrid" | "automatic" => SourceKind::Hybrid,
            _ if raw.starts_with("http://") || raw.starts_with("https://") => {
                SourceKind::DirectUrl
            }
            _ => SourceKind::Hybrid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        assert_eq!(SourceKind::parse("tabular"), SourceKind::Tabular);
        assert_eq!(SourceKind::parse("REMOTE_PLAYLIST"), SourceKind::RemotePlaylist);
        assert_eq!(SourceKind::parse("automatic"), SourceKind::Hybrid);
    }

    #[test]
    fn parses_url_literal_as_direct() {
        assert_eq!(SourceKind::parse("https://example.com/list.m3u"), SourceKind::DirectUrl);
    }
}
