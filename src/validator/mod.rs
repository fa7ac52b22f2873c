//! Parallel stream validator (spec §4.6): bounded-concurrency HEAD (falling
//! back to a small ranged GET) reachability probing with a shared TTL cache.

mod cache;

pub use cache::ReachabilityCache;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ConfigView;
use crate::errors::NetworkError;
use crate::models::{Channel, ValidationVerdict};

/// Content types recognized as "this is a stream", consulted only when the
/// probe response carries one (spec §4.6).
const STREAMING_CONTENT_TYPES: &[&str] = &[
    "application/vnd.apple.mpegurl",
    "application/x-mpegurl",
    "audio/mpegurl",
    "application/octet-stream",
    "video/mp2t",
    "video/mp4",
    "application/dash+xml",
];

pub struct StreamValidator {
    config: Arc<ConfigView>,
    client: Client,
    cache: ReachabilityCache,
}

impl StreamValidator {
    pub fn new(config: Arc<ConfigView>) -> Self {
        let client = Client::builder().build().unwrap_or_else(|_| Client::new());
        let cache =
            ReachabilityCache::new(config.reachability_cache_size, config.reachability_cache_ttl);
        Self { config, client, cache }
    }

    /// Probe every channel's stream URL, in fixed-size batches to cap
    /// simultaneous sockets (spec §5 "Backpressure"). Returns the channels
    /// (with `is_active` updated) and a `channel.id -> reachable` map the
    /// deduplication engine consults for its "prioritize working" tie-break.
    /// When `enable_stream_validation` is off, returns `channels` unchanged
    /// and an empty map (passthrough).
    pub async fn validate(&self, channels: Vec<Channel>) -> (Vec<Channel>, HashMap<String, bool>) {
        if !self.config.enable_stream_validation {
            return (channels, HashMap::new());
        }

        let semaphore = Arc::new(Semaphore::new(self.config.validation_concurrency));
        let mut reachable = HashMap::with_capacity(channels.len());
        let mut validated = Vec::with_capacity(channels.len());

        for batch in channels.chunks(self.config.validation_batch_size.max(1)) {
            let mut tasks = FuturesUnordered::new();
            for channel in batch.iter().cloned() {
                // A cache hit short-circuits before the probe is even
                // dispatched, fulfilling spec §4.6's "cache hits skip the
                // probe" without a network round-trip.
                if let Some(verdict) = self.cache.get(&channel.stream_url, "HEAD").await {
                    reachable.insert(channel.id.clone(), verdict.is_reachable());
                    validated.push(apply_verdict(
                        channel,
                        verdict,
                        self.config.remove_invalid_streams,
                    ));
                    continue;
                }

                let semaphore = semaphore.clone();
                let client = self.client.clone();
                let timeout = self.config.stream_validation_timeout;
                let retries = self.config.validation_retries;
                let retry_delay = self.config.validation_retry_delay;
                tasks.push(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                    let verdict =
                        probe_with_retries(&client, &channel.stream_url, timeout, retries, retry_delay)
                            .await;
                    (channel, verdict)
                });
            }

            while let Some((channel, verdict)) = tasks.next().await {
                self.cache.insert(&channel.stream_url, "HEAD", verdict.clone()).await;
                reachable.insert(channel.id.clone(), verdict.is_reachable());
                validated.push(apply_verdict(channel, verdict, self.config.remove_invalid_streams));
            }
        }

        let validated: Vec<Channel> = if self.config.remove_invalid_streams {
            validated.into_iter().flatten().collect()
        } else {
            validated.into_iter().map(|c| c.expect("retained when not dropping")).collect()
        };

        (validated, reachable)
    }
}

fn apply_verdict(
    mut channel: Channel,
    verdict: ValidationVerdict,
    remove_invalid: bool,
) -> Option<Channel> {
    if verdict.is_reachable() {
        channel.is_active = true;
        Some(channel)
    } else if remove_invalid {
        None
    } else {
        channel.is_active = false;
        Some(channel)
    }
}

async fn probe_with_retries(
    client: &Client,
    url: &str,
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
) -> ValidationVerdict {
    let mut attempt = 0;
    loop {
        let verdict = probe_once(client, url, timeout).await;
        if verdict.is_reachable() || attempt >= retries {
            return verdict;
        }
        attempt += 1;
        tokio::time::sleep(retry_delay).await;
    }
}

/// HEAD the URL; if the server disallows HEAD (405/501), fall back to a
/// small ranged GET (spec §4.6).
async fn probe_once(client: &Client, url: &str, timeout: Duration) -> ValidationVerdict {
    let started = Instant::now();

    let head_result = tokio::time::timeout(timeout, client.head(url).send()).await;
    match head_result {
        Ok(Ok(response)) if matches!(response.status(), StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED) => {
            probe_ranged_get(client, url, timeout, started).await
        }
        Ok(Ok(response)) => verdict_from_response(&response, started.elapsed()),
        Ok(Err(err)) => verdict_from_error(&err, started.elapsed()),
        Err(_) => ValidationVerdict::timeout(started.elapsed()),
    }
}

async fn probe_ranged_get(
    client: &Client,
    url: &str,
    timeout: Duration,
    started: Instant,
) -> ValidationVerdict {
    let request = client.get(url).header("Range", "bytes=0-1023");
    match tokio::time::timeout(timeout, request.send()).await {
        Ok(Ok(response)) => verdict_from_response(&response, started.elapsed()),
        Ok(Err(err)) => verdict_from_error(&err, started.elapsed()),
        Err(_) => ValidationVerdict::timeout(started.elapsed()),
    }
}

fn verdict_from_response(response: &reqwest::Response, elapsed: Duration) -> ValidationVerdict {
    let status = response.status();
    let content_type_ok = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| STREAMING_CONTENT_TYPES.iter().any(|known| ct.starts_with(known)))
        .unwrap_or(true);

    if (status.is_success() || status.is_redirection()) && content_type_ok {
        ValidationVerdict::reachable(elapsed)
    } else {
        let network_error = NetworkError::UnexpectedStatus(status.as_u16());
        debug!(error = %network_error, "probe returned an unusable response");
        ValidationVerdict::unreachable(elapsed, Some(status.as_u16()))
    }
}

/// Classify a transport failure, matching it onto the taxonomy spec §4.6
/// names (timeout / dns failure / tls failure / other).
fn classify_network_error(err: &reqwest::Error, elapsed: Duration) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout(elapsed)
    } else if err.is_connect() {
        let message = err.to_string();
        if message.to_ascii_lowercase().contains("tls")
            || message.to_ascii_lowercase().contains("certificate")
        {
            NetworkError::TlsFailure(message)
        } else {
            NetworkError::DnsFailure(message)
        }
    } else {
        NetworkError::Other(err.to_string())
    }
}

fn verdict_from_error(err: &reqwest::Error, elapsed: Duration) -> ValidationVerdict {
    let network_error = classify_network_error(err, elapsed);
    debug!(error = %network_error, "probe failed");
    match network_error {
        NetworkError::Timeout(_) => ValidationVerdict::timeout(elapsed),
        NetworkError::TlsFailure(_) => ValidationVerdict::tls_failure(elapsed),
        NetworkError::DnsFailure(_) => ValidationVerdict::dns_failure(elapsed),
        NetworkError::UnexpectedStatus(_) | NetworkError::Other(_) => {
            ValidationVerdict::unreachable(elapsed, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn passthrough_when_disabled() {
        let mut config = Config::default();
        config.enable_stream_validation = false;
        let view = ConfigView::from_config(&config).unwrap();
        let validator = StreamValidator::new(view);
        let channels = vec![Channel::new("a".into(), "X".into(), "http://x".into(), "r", 0)];
        let (result, reachable) = validator.validate(channels).await;
        assert_eq!(result.len(), 1);
        assert!(reachable.is_empty());
    }

    /// A URL already probed (and cached) in an earlier `validate()` call on
    /// the same validator is not probed again.
    #[tokio::test]
    async fn cache_hit_skips_probe() {
        let mock_server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = Config::default();
        config.enable_stream_validation = true;
        let view = ConfigView::from_config(&config).unwrap();
        let validator = StreamValidator::new(view);

        let url = mock_server.uri();
        let first = vec![Channel::new("a".into(), "A".into(), url.clone(), "r", 0)];
        let (result, _) = validator.validate(first).await;
        assert!(result[0].is_active);

        let second = vec![Channel::new("b".into(), "B".into(), url, "r", 0)];
        let (result, _) = validator.validate(second).await;
        assert!(result[0].is_active, "cached verdict should still mark the channel active");
    }
}
