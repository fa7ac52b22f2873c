//! Local playlist file source (spec §4.1 "local playlist").

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::{AppResult, ParseError, SourceError};
use crate::ingestor::parse_playlist;
use crate::models::Channel;

use super::traits::Repository;

pub struct LocalPlaylistRepository {
    path: PathBuf,
    source_tag: String,
    channels: Vec<Channel>,
    warnings: Vec<ParseError>,
}

impl LocalPlaylistRepository {
    pub fn new(path: PathBuf, source_tag: impl Into<String>) -> Self {
        Self { path, source_tag: source_tag.into(), channels: Vec::new(), warnings: Vec::new() }
    }
}

#[async_trait]
impl Repository for LocalPlaylistRepository {
    async fn initialize(&mut self) -> AppResult<()> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io { path: self.path.display().to_string(), source })?;
        let (mut channels, warnings) = parse_playlist(&text, &self.source_tag, 0);
        let path_tag = self.path.display().to_string();
        for channel in &mut channels {
            channel.metadata.insert(crate::filter::SOURCE_FILE_KEY.to_string(), path_tag.clone());
        }
        self.channels = channels;
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
