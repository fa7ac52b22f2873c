//! Hybrid aggregation repository (spec §4.1 "hybrid"): concurrently fetches
//! zero or more remote playlist URLs, zero or more local playlist files, and
//! one optional tabular file, concatenating results in declared order with
//! per-source provenance tags.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tracing::warn;

use crate::config::ConfigView;
use crate::errors::{AppResult, ParseError, SourceError};
use crate::models::Channel;

use super::local_playlist::LocalPlaylistRepository;
use super::remote_playlist::RemotePlaylistRepository;
use super::tabular::TabularRepository;
use super::traits::Repository;

pub struct HybridRepository {
    config: Arc<ConfigView>,
    channels: Vec<Channel>,
    warnings: Vec<ParseError>,
}

impl HybridRepository {
    pub fn new(config: Arc<ConfigView>) -> Self {
        Self { config, channels: Vec::new(), warnings: Vec::new() }
    }
}

/// Paths beginning with `data/` resolve against the project root instead of
/// the configured base directory (spec §4.1).
pub(crate) fn resolve_path(config: &ConfigView, raw: &str) -> PathBuf {
    if raw.starts_with("data/") {
        config.project_root.join(raw)
    } else {
        resolve_against(&config.base_dir, raw)
    }
}

fn resolve_against(base: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

#[async_trait]
impl Repository for HybridRepository {
    async fn initialize(&mut self) -> AppResult<()> {
        let mut next_index = 0usize;
        let mut merged = Vec::new();
        let mut warnings = Vec::new();
        let mut succeeded = 0usize;
        let mut attempted = 0usize;

        let remote_results = join_all(self.config.playlist_urls.iter().map(|url| {
            let timeout = self.config.remote_fetch_timeout;
            let url = url.clone();
            async move {
                let mut repo = RemotePlaylistRepository::new(url.clone(), "remote_playlist", timeout);
                let result = repo.initialize().await;
                (url, repo, result)
            }
        }))
        .await;

        for (url, repo, result) in remote_results {
            attempted += 1;
            match result {
                Ok(()) => {
                    succeeded += 1;
                    let mut channels = repo.get_all_channels().await?;
                    for ch in &mut channels {
                        ch.original_index = next_index;
                        next_index += 1;
                    }
                    warnings.extend(repo.warnings());
                    merged.extend(channels);
                }
                Err(err) => warn!(url = %url, error = %err, "remote playlist source failed, skipping"),
            }
        }

        for raw_path in &self.config.local_playlist_files {
            attempted += 1;
            let path = resolve_path(&self.config, raw_path);
            let mut repo = LocalPlaylistRepository::new(path.clone(), "local_playlist");
            match repo.initialize().await {
                Ok(()) => {
                    succeeded += 1;
                    let mut channels = repo.get_all_channels().await?;
                    for ch in &mut channels {
                        ch.original_index = next_index;
                        next_index += 1;
                    }
                    warnings.extend(repo.warnings());
                    merged.extend(channels);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "local playlist source failed, skipping")
                }
            }
        }

        if let Some(raw_path) = &self.config.channels_file {
            attempted += 1;
            let path = resolve_path(&self.config, &raw_path.display().to_string());
            let mut repo = TabularRepository::new(path.clone(), "tabular");
            match repo.initialize().await {
                Ok(()) => {
                    succeeded += 1;
                    let mut channels = repo.get_all_channels().await?;
                    for ch in &mut channels {
                        ch.original_index = next_index;
                        next_index += 1;
                    }
                    warnings.extend(repo.warnings());
                    merged.extend(channels);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "tabular source failed, skipping")
                }
            }
        }

        if attempted > 0 && succeeded == 0 {
            return Err(SourceError::AllSourcesFailed.into());
        }

        self.channels = merged;
        self.warnings = warnings;
        Ok(())
    }

    async fn get_all_channels(&self) -> AppResult<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    fn get_channels_count(&self) -> Option<usize> {
        Some(self.channels.len())
    }

    fn warnings(&self) -> Vec<ParseError> {
        self.warnings.clone()
    }
}
