//! Chunked enrichment pipeline (spec §4.7): name cleaning, genre inference,
//! and artwork synthesis, run over bounded-parallel chunks of the channel
//! list. Per-chunk failures never abort the run; a failing channel simply
//! retains its pre-enrichment fields.

mod artwork;
mod genre;
mod name_clean;

pub use artwork::ArtworkGenerator;
pub use genre::infer_genre;
pub use name_clean::clean_name;

use std::sync::Arc;

use futures::stream::{FuturesOrdered, StreamExt};
use tokio::sync::Semaphore;

use crate::config::ConfigView;
use crate::models::Channel;

pub struct EnrichmentPipeline {
    config: Arc<ConfigView>,
    artwork: ArtworkGenerator,
}

impl EnrichmentPipeline {
    pub fn new(config: Arc<ConfigView>) -> Self {
        let artwork = ArtworkGenerator::new(config.project_root.join("data").join("artwork"));
        Self { config, artwork }
    }

    /// Partition `channels` into `chunk_size`-sized groups, run groups
    /// concurrently under a `max_concurrency` semaphore, and enrich each
    /// channel sequentially within its chunk (spec §4.7).
    pub async fn enrich(&self, channels: Vec<Channel>) -> Vec<Channel> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut chunk_tasks = FuturesOrdered::new();

        for chunk in channels.chunks(self.config.chunk_size.max(1)) {
            let chunk = chunk.to_vec();
            let semaphore = semaphore.clone();
            let artwork = &self.artwork;
            chunk_tasks.push_back(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
                let mut enriched = Vec::with_capacity(chunk.len());
                for channel in chunk {
                    enriched.push(enrich_one(channel, artwork).await);
                }
                enriched
            });
        }

        let mut results = Vec::with_capacity(channels.len());
        let mut collected: Vec<_> = chunk_tasks.collect().await;
        for chunk in collected.drain(..) {
            results.extend(chunk);
        }
        results
    }
}

async fn enrich_one(mut channel: Channel, artwork: &ArtworkGenerator) -> Channel {
    let cleaned = clean_name(&channel.name);
    if cleaned != channel.name && !cleaned.is_empty() {
        channel.original_name = Some(channel.name.clone());
        channel.name = cleaned;
    }

    if channel.genre.is_none() {
        channel.genre = Some(infer_genre(&channel.name));
    }

    match artwork.synthesize_all(&channel).await {
        Ok(paths) => {
            channel.logo.get_or_insert(paths.logo);
            channel.background = Some(paths.background);
            channel.poster = Some(paths.poster);
        }
        Err(err) => {
            tracing::warn!(channel = %channel.id, error = %err, "artwork synthesis failed, channel retains prior fields");
        }
    }

    channel
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn enrichment_preserves_count_and_order() {
        let config = ConfigView::from_config(&Config::default()).unwrap();
        let pipeline = EnrichmentPipeline::new(config);
        let channels = vec![
            Channel::new("a".into(), "ESPN HD".into(), "http://a".into(), "r", 0),
            Channel::new("b".into(), "CNN".into(), "http://b".into(), "r", 1),
        ];
        let enriched = pipeline.enrich(channels).await;
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].id, "a");
        assert_eq!(enriched[1].id, "b");
    }
}
