//! Remote playlist source (spec §4.1 "remote playlist" / "direct URL").
//! Fetches a text resource over HTTP with a bounded timeout and streams the
//! body into the [`crate::ingestor`] parser.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::errors::{AppResult, ParseError, SourceError};
use crate::ingestor::parse_playlist;
use crate::models::Channel;

use super::traits::Repository;

pub struct RemotePlaylistRepository {
    url: String,
    source_tag: String,
    timeout: Duration,
    channels: Vec<Channel>,
    warnings: Vec<ParseError>,
}

impl RemotePlaylistRepository {
    pub fn new(url: impl Into<String>, source_tag: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            source_tag: source_tag.into(),
            timeout,
            channels: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[async_trait]
impl Repository for RemotePlaylistRepository {
    async fn initialize(&mut self) -> AppResult<()> {
        let client = Client::builder().timeout(self.timeout).build().map_err(|e| {
            SourceError::ConnectionFailed { name: self.url.clone(), message: e.to_string() }
        })?;

        let response = client.get(&self.url).send().await.map_err(|e| {
            SourceError::ConnectionFailed { name: self.url.clone(), message: e.to_string() }
        })?;
        let text = response.text().await.map_err(|e| SourceError::ConnectionFailed {
            name: self.url.clone(),
            message: e.to_string(),
        })?;

        let (channels, warnings) = parse_playlist(&text, &self.source_tag, 0);
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
