//! Concrete [`super::traits::PipelineStage`] implementations, one per named
//! phase in spec §4.10 (excluding `service-init` and `summary`, which the
//! coordinator runs directly since their job is to *produce* the
//! dependencies these stages are constructed with, not to transform
//! [`PipelineState`]).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::ConfigView;
use crate::convert::HttpsToHttpConverter;
use crate::dedup::DeduplicationEngine;
use crate::emitter::Emitter;
use crate::enrichment::EnrichmentPipeline;
use crate::filter::{FilterEngine, RuleSet};
use crate::ordering::OrderingService;
use crate::sources::Repository;
use crate::validator::StreamValidator;

use super::error::PipelineError;
use super::phase::PhaseWarning;
use super::state::PipelineState;
use super::traits::PipelineStage;

/// `data-loading`: initializes the selected repository and loads every
/// channel it can produce. Critical — an empty or erroring source is the one
/// failure this engine cannot reasonably paper over.
pub struct DataLoadingStage {
    repository: Mutex<Box<dyn Repository>>,
}

impl DataLoadingStage {
    pub fn new(repository: Box<dyn Repository>) -> Self {
        Self { repository: Mutex::new(repository) }
    }
}

#[async_trait]
impl PipelineStage for DataLoadingStage {
    fn name(&self) -> &'static str {
        "data-loading"
    }

    fn critical(&self) -> bool {
        true
    }

    async fn execute(&self, mut state: PipelineState) -> Result<PipelineState, PipelineError> {
        let mut repository = self.repository.lock().await;
        repository
            .initialize()
            .await
            .map_err(|err| PipelineError::stage_error_with_source(self.name(), err.to_string(), err))?;
        let channels = repository
            .get_all_channels()
            .await
            .map_err(|err| PipelineError::stage_error_with_source(self.name(), err.to_string(), err))?;

        state.warnings.extend(
            repository
                .warnings()
                .into_iter()
                .map(|error| PhaseWarning { phase: self.name(), error }),
        );
        state.loaded_count = channels.len();
        state.channels = channels;
        Ok(state)
    }
}

/// `preparation`: runs the compiled [`RuleSet`] over every loaded channel.
pub struct PreparationStage {
    rules: RuleSet,
}

impl PreparationStage {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl PipelineStage for PreparationStage {
    fn name(&self) -> &'static str {
        "preparation"
    }

    fn critical(&self) -> bool {
        false
    }

    async fn execute(&self, mut state: PipelineState) -> Result<PipelineState, PipelineError> {
        let engine = FilterEngine::new(&self.rules);
        let filtered = engine.filter(state.channels);
        state.filtered_count = filtered.len();
        state.channels = filtered;
        Ok(state)
    }
}

/// `core-processing` (spec §4.10): deduplication and HTTPS-to-HTTP
/// conversion run concurrently over the same input; the conversion output's
/// URL updates are merged onto the deduplicated set by `id`; validation runs
/// last, over the merged set.
pub struct CoreProcessingStage {
    config: Arc<ConfigView>,
}

impl CoreProcessingStage {
    pub fn new(config: Arc<ConfigView>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PipelineStage for CoreProcessingStage {
    fn name(&self) -> &'static str {
        "core-processing"
    }

    fn critical(&self) -> bool {
        false
    }

    async fn execute(&self, mut state: PipelineState) -> Result<PipelineState, PipelineError> {
        let input = state.channels;
        let dedup_engine = DeduplicationEngine::new(&self.config);
        let converter = HttpsToHttpConverter::new(self.config.clone());

        let dedup_input = input.clone();
        let (dedup_result, converted) = tokio::join!(
            async move { dedup_engine.deduplicate(dedup_input, &HashMap::new()) },
            converter.convert(input),
        );
        let (deduped, metrics) = dedup_result;

        let converted_urls: HashMap<String, String> =
            converted.into_iter().map(|c| (c.id, c.stream_url)).collect();
        let mut merged = deduped;
        for channel in &mut merged {
            if let Some(url) = converted_urls.get(&channel.id) {
                channel.stream_url = url.clone();
            }
        }

        let validator = StreamValidator::new(self.config.clone());
        let (validated, reachable) = validator.validate(merged).await;

        state.dedup_metrics = Some(metrics);
        state.reachable = reachable;
        state.validated_count = validated.len();
        state.channels = validated;
        Ok(state)
    }
}

/// `chunk-enrichment`: name cleaning, genre inference, artwork synthesis.
pub struct ChunkEnrichmentStage {
    pipeline: EnrichmentPipeline,
}

impl ChunkEnrichmentStage {
    pub fn new(config: Arc<ConfigView>) -> Self {
        Self { pipeline: EnrichmentPipeline::new(config) }
    }
}

#[async_trait]
impl PipelineStage for ChunkEnrichmentStage {
    fn name(&self) -> &'static str {
        "chunk-enrichment"
    }

    fn critical(&self) -> bool {
        false
    }

    async fn execute(&self, mut state: PipelineState) -> Result<PipelineState, PipelineError> {
        let enriched = self.pipeline.enrich(state.channels).await;
        state.enriched_count = enriched.len();
        state.channels = enriched;
        Ok(state)
    }
}

/// `emission`: orders the final channel list and writes the three artifacts.
/// Critical — a failed write must abort the run rather than leave a partial
/// catalog on disk.
pub struct EmissionStage {
    config: Arc<ConfigView>,
    emitter: Emitter,
}

impl EmissionStage {
    pub fn new(config: Arc<ConfigView>, emitter: Emitter) -> Self {
        Self { config, emitter }
    }
}

#[async_trait]
impl PipelineStage for EmissionStage {
    fn name(&self) -> &'static str {
        "emission"
    }

    fn critical(&self) -> bool {
        true
    }

    async fn execute(&self, mut state: PipelineState) -> Result<PipelineState, PipelineError> {
        let ordering = OrderingService::new(&self.config);
        let ordered = ordering.order(state.channels);
        self.emitter
            .emit(&ordered)
            .await
            .map_err(|err| PipelineError::stage_error_with_source(self.name(), err.to_string(), err))?;
        state.channels = ordered;
        Ok(state)
    }
}
