//! HTTPS-to-HTTP conversion (spec §4.5). For each `https://` channel, emits
//! a parallel `http://` candidate; optionally probes it before swapping the
//! record's `streamUrl`. Never drops a channel on its own.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ConfigView;
use crate::models::Channel;
use crate::utils::UrlUtils;

pub struct HttpsToHttpConverter {
    config: Arc<ConfigView>,
    client: Client,
}

impl HttpsToHttpConverter {
    pub fn new(config: Arc<ConfigView>) -> Self {
        let client = Client::builder()
            .timeout(config.http_conversion_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    /// Returns a full-set copy of `channels` with `https://` URLs replaced
    /// by their `http://` equivalent where validation (if enabled) confirmed
    /// reachability. When `convert_https_to_http` is disabled, returns the
    /// input unchanged (passthrough, per spec §4.10's non-critical-failure
    /// fallback).
    pub async fn convert(&self, channels: Vec<Channel>) -> Vec<Channel> {
        if !self.config.convert_https_to_http {
            return channels;
        }

        let semaphore = Arc::new(Semaphore::new(self.config.http_conversion_max_concurrency));
        let mut tasks = FuturesUnordered::new();

        for (index, channel) in channels.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let validate = self.config.validate_http_conversion;
            let timeout = self.config.http_conversion_timeout;
            tasks.push(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                let converted = convert_one(channel, &client, validate, timeout).await;
                (index, converted)
            });
        }

        let mut results: Vec<Option<Channel>> = std::iter::repeat_with(|| None)
            .take(tasks.len())
            .collect();
        while let Some((index, channel)) = tasks.next().await {
            results[index] = Some(channel);
        }
        results.into_iter().flatten().collect()
    }
}

async fn convert_one(
    mut channel: Channel,
    client: &Client,
    validate: bool,
    timeout: Duration,
) -> Channel {
    let Some(candidate) = UrlUtils::https_to_http(&channel.stream_url) else {
        return channel;
    };

    if !validate {
        channel.stream_url = candidate;
        return channel;
    }

    match tokio::time::timeout(timeout, client.head(&candidate).send()).await {
        Ok(Ok(response)) if response.status().is_success() || response.status().is_redirection() => {
            channel.stream_url = candidate;
        }
        Ok(Ok(response)) => {
            debug!(url = %candidate, status = %response.status(), "https->http candidate rejected");
        }
        Ok(Err(err)) => debug!(url = %candidate, error = %err, "https->http probe failed"),
        Err(_) => debug!(url = %candidate, "https->http probe timed out"),
    }
    channel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn passthrough_when_disabled() {
        let config = ConfigView::from_config(&Config::default()).unwrap();
        let converter = HttpsToHttpConverter::new(config);
        let channels = vec![Channel::new("a".into(), "X".into(), "https://h/p".into(), "r", 0)];
        let result = converter.convert(channels).await;
        assert_eq!(result[0].stream_url, "https://h/p");
    }

    #[tokio::test]
    async fn rewrites_without_validation() {
        let mut config = Config::default();
        config.convert_https_to_http = true;
        let view = ConfigView::from_config(&config).unwrap();
        let converter = HttpsToHttpConverter::new(view);
        let channels = vec![Channel::new("a".into(), "X".into(), "https://h/p".into(), "r", 0)];
        let result = converter.convert(channels).await;
        assert_eq!(result[0].stream_url, "http://h/p");
    }
}
