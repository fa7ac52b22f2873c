//! Writes the three canonical output artifacts (spec §4.9): the tabular
//! catalog, the aggregated playlist, and per-channel playlist fragments.
//! File writes go through `sandboxed_file_manager::SandboxedManager` for
//! path-traversal-safe resolution; atomicity ("emit to temp path,
//! rename-on-success", spec §5) is implemented with a same-directory
//! `tokio::fs::rename` over the manager's resolved path, since the
//! manager's own `write()` is not itself atomic.

mod fragments;
mod playlist;
mod tabular;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sandboxed_file_manager::SandboxedManager;

use crate::config::ConfigView;
use crate::errors::{AppResult, FilesystemError};
use crate::models::Channel;

pub struct Emitter {
    config: Arc<ConfigView>,
    catalog_dir: SandboxedManager,
    playlist_dir: SandboxedManager,
    fragment_dir: SandboxedManager,
}

impl Emitter {
    pub async fn new(config: Arc<ConfigView>) -> AppResult<Self> {
        let catalog_dir = build_manager(parent_or_dot(&config.validated_catalog_path)).await?;
        let playlist_dir = build_manager(parent_or_dot(&config.playlist_output_path)).await?;
        let fragment_dir = build_manager(&config.per_channel_playlist_dir).await?;
        Ok(Self { config, catalog_dir, playlist_dir, fragment_dir })
    }

    /// Write all three artifacts. Channels must already be in final emission
    /// order (the [`crate::ordering::OrderingService`] output).
    pub async fn emit(&self, channels: &[Channel]) -> AppResult<()> {
        self.emit_catalog(channels).await?;
        self.emit_playlist(channels).await?;
        self.emit_fragments(channels).await?;
        Ok(())
    }

    async fn emit_catalog(&self, channels: &[Channel]) -> AppResult<()> {
        let filename = file_name(&self.config.validated_catalog_path);
        if self.config.enable_backup {
            self.backup_if_exists(&self.catalog_dir, &filename).await?;
        }
        let content = tabular::format_catalog(channels);
        write_atomic(&self.catalog_dir, &filename, content.as_bytes()).await
    }

    async fn emit_playlist(&self, channels: &[Channel]) -> AppResult<()> {
        let filename = file_name(&self.config.playlist_output_path);
        let content = playlist::format_playlist(channels);
        write_atomic(&self.playlist_dir, &filename, content.as_bytes()).await
    }

    async fn emit_fragments(&self, channels: &[Channel]) -> AppResult<()> {
        self.fragment_dir.remove_dir_all("").await.ok();
        self.fragment_dir.create_dir_all("").await.map_err(|source| FilesystemError::Sandbox {
            path: self.config.per_channel_playlist_dir.display().to_string(),
            message: source.to_string(),
        })?;

        let mut seen = HashSet::new();
        for channel in channels {
            let filename = fragments::fragment_filename(channel, &mut seen);
            let content = fragments::format_fragment(channel);
            write_atomic(&self.fragment_dir, &filename, content.as_bytes()).await?;
        }
        Ok(())
    }

    async fn backup_if_exists(&self, manager: &SandboxedManager, filename: &str) -> AppResult<()> {
        let exists = manager.exists(filename).await.unwrap_or(false);
        if !exists {
            return Ok(());
        }
        let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
        let backup_name = format!("{filename}.{timestamp}.bak");
        manager.copy(filename, &backup_name).await.map_err(|source| FilesystemError::Sandbox {
            path: backup_name,
            message: source.to_string(),
        })?;
        Ok(())
    }
}

async fn build_manager(dir: impl AsRef<Path>) -> AppResult<SandboxedManager> {
    SandboxedManager::builder()
        .base_directory(dir.as_ref().to_path_buf())
        .build()
        .await
        .map_err(|source| {
            FilesystemError::Sandbox { path: dir.as_ref().display().to_string(), message: source.to_string() }
                .into()
        })
}

fn parent_or_dot(path: &Path) -> PathBuf {
    path.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "output".to_string())
}

/// Write to `<name>.tmp` inside the sandbox, then rename over `<name>` —
/// readers never observe a partially-written file (spec §5).
async fn write_atomic(manager: &SandboxedManager, name: &str, content: &[u8]) -> AppResult<()> {
    let tmp_name = format!("{name}.tmp");
    manager.write(&tmp_name, content).await.map_err(|source| FilesystemError::Sandbox {
        path: tmp_name.clone(),
        message: source.to_string(),
    })?;

    let tmp_path = manager.get_full_path(&tmp_name).map_err(|source| FilesystemError::Sandbox {
        path: tmp_name.clone(),
        message: source.to_string(),
    })?;
    let final_path = manager.get_full_path(name).map_err(|source| FilesystemError::Sandbox {
        path: name.to_string(),
        message: source.to_string(),
    })?;

    tokio::fs::rename(&tmp_path, &final_path)
        .await
        .map_err(|source| FilesystemError::Write { path: final_path.display().to_string(), source })?;
    Ok(())
}
