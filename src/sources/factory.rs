//! Repository factory: selects the concrete variant from `ConfigView`,
//! matching the teacher's `SourceHandlerFactory` match-dispatch pattern —
//! there is no base class, just a tagged [`super::SourceKind`] and this one
//! dispatch point.

use std::sync::Arc;

use crate::config::ConfigView;
use crate::errors::{AppResult, SourceError};

use super::hybrid::resolve_path;
use super::{HybridRepository, LocalPlaylistRepository, RemotePlaylistRepository, Repository, SourceKind, TabularRepository};

/// Build the repository selected by `config.channels_source`.
pub fn build_repository(config: Arc<ConfigView>) -> AppResult<Box<dyn Repository>> {
    let kind = SourceKind::parse(&config.channels_source);
    match kind {
        SourceKind::Tabular => {
            let raw = config.channels_file.as_ref().ok_or_else(|| {
                SourceError::InvalidConfiguration("tabular source requires channelsFile".to_string())
            })?;
            let path = resolve_path(&config, &raw.display().to_string());
            Ok(Box::new(TabularRepository::new(path, "tabular")))
        }
        SourceKind::RemotePlaylist => {
            let url = config.playlist_urls.first().cloned().ok_or_else(|| {
                SourceError::InvalidConfiguration(
                    "remote_playlist source requires at least one playlistUrls entry".to_string(),
                )
            })?;
            Ok(Box::new(RemotePlaylistRepository::new(url, "remote_playlist", config.remote_fetch_timeout)))
        }
        SourceKind::LocalPlaylist => {
            let raw = config.local_playlist_files.first().cloned().ok_or_else(|| {
                SourceError::InvalidConfiguration(
                    "local_playlist source requires at least one localPlaylistFiles entry".to_string(),
                )
            })?;
            let path = resolve_path(&config, &raw);
            Ok(Box::new(LocalPlaylistRepository::new(path, "local_playlist")))
        }
        SourceKind::DirectUrl => Ok(Box::new(RemotePlaylistRepository::new(
            config.channels_source.clone(),
            "remote_playlist",
            config.remote_fetch_timeout,
        ))),
        SourceKind::Hybrid => Ok(Box::new(HybridRepository::new(config))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn defaults_to_hybrid() {
        let view = ConfigView::from_config(&Config::default()).unwrap();
        let repo = build_repository(view).unwrap();
        assert_eq!(repo.get_channels_count(), Some(0));
    }

    #[test]
    fn tabular_without_channels_file_errors() {
        let mut config = Config::default();
        config.channels_source = "tabular".to_string();
        let view = ConfigView::from_config(&config).unwrap();
        assert!(build_repository(view).is_err());
    }
}
