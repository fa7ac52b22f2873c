//! `PipelineCoordinator` (spec §4.10, §4.11): runs the named phases in
//! order, times each one, and consolidates the result. Modeled on
//! `m3u_proxy::pipeline::core::orchestrator::PipelineOrchestrator`'s
//! `execute_pipeline` loop; `configuration`, `service-init`, and `summary`
//! are run directly by the coordinator rather than through the generic
//! stage loop, since their job is producing the dependencies the other
//! stages are built from (a validated config, a repository, a compiled rule
//! set, an emitter), not transforming a [`PipelineState`].

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigView};
use crate::emitter::Emitter;
use crate::filter::RuleSet;
use crate::sources::Repository;

use super::error::PipelineError;
use super::phase::{PhaseExecution, PhaseStatus, PipelineExecution, PipelineStatus};
use super::stages::{
    ChunkEnrichmentStage, CoreProcessingStage, DataLoadingStage, EmissionStage, PreparationStage,
};
use super::state::PipelineState;
use super::traits::PipelineStage;

pub struct PipelineCoordinator {
    config: Config,
    cancellation: CancellationToken,
}

impl PipelineCoordinator {
    pub fn new(config: Config) -> Self {
        Self { config, cancellation: CancellationToken::new() }
    }

    /// A clone of the token every suspension point should honor. `main.rs`
    /// wires this to Ctrl-C so an interrupt aborts in-flight probes within
    /// one probe-timeout instead of leaving partial artifacts (spec §5).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub async fn run(&self) -> Result<PipelineExecution, PipelineError> {
        let run_started = Instant::now();
        let mut execution = PipelineExecution::new();
        let mut state = PipelineState::new();

        let config_started = Instant::now();
        let config = match ConfigView::from_config(&self.config) {
            Ok(view) => view,
            Err(err) => {
                execution.record(PhaseExecution {
                    name: "configuration",
                    status: PhaseStatus::FailedCritical,
                    duration: config_started.elapsed(),
                    detail: err.to_string(),
                });
                execution.status = PipelineStatus::Failed;
                execution.total_duration = run_started.elapsed();
                return Err(PipelineError::stage_error_with_source(
                    "configuration",
                    err.to_string(),
                    err,
                ));
            }
        };
        execution.record(PhaseExecution {
            name: "configuration",
            status: PhaseStatus::Completed,
            duration: config_started.elapsed(),
            detail: "configuration validated".to_string(),
        });

        let init_started = Instant::now();
        let (repository, rules, emitter) = match self.service_init(&config).await {
            Ok(ready) => ready,
            Err(err) => {
                execution.record(PhaseExecution {
                    name: "service-init",
                    status: PhaseStatus::FailedCritical,
                    duration: init_started.elapsed(),
                    detail: err.to_string(),
                });
                execution.status = PipelineStatus::Failed;
                execution.total_duration = run_started.elapsed();
                return Err(err);
            }
        };
        execution.record(PhaseExecution {
            name: "service-init",
            status: PhaseStatus::Completed,
            duration: init_started.elapsed(),
            detail: "repository, rule set, and emitter ready".to_string(),
        });

        let stages: Vec<Box<dyn PipelineStage>> = vec![
            Box::new(DataLoadingStage::new(repository)),
            Box::new(PreparationStage::new(rules)),
            Box::new(CoreProcessingStage::new(config.clone())),
            Box::new(ChunkEnrichmentStage::new(config.clone())),
            Box::new(EmissionStage::new(config.clone(), emitter)),
        ];

        for stage in &stages {
            if self.cancellation.is_cancelled() {
                warn!(phase = stage.name(), "cancellation requested, aborting before phase start");
                execution.status = PipelineStatus::Failed;
                execution.total_duration = run_started.elapsed();
                return Err(PipelineError::Cancelled { stage: stage.name() });
            }

            let stage_started = Instant::now();
            info!(phase = stage.name(), "starting phase");

            match stage.execute(std::mem::take(&mut state)).await {
                Ok(next_state) => {
                    let duration = stage_started.elapsed();
                    info!(phase = stage.name(), elapsed = ?duration, "phase completed");
                    execution.record(PhaseExecution {
                        name: stage.name(),
                        status: PhaseStatus::Completed,
                        duration,
                        detail: format!("{} channels carried forward", next_state.channels.len()),
                    });
                    state = next_state;
                }
                Err(err) => {
                    let duration = stage_started.elapsed();
                    if stage.critical() {
                        error!(phase = stage.name(), error = %err, "critical phase failed, aborting run");
                        execution.record(PhaseExecution {
                            name: stage.name(),
                            status: PhaseStatus::FailedCritical,
                            duration,
                            detail: err.to_string(),
                        });
                        execution.status = PipelineStatus::Failed;
                        execution.total_duration = run_started.elapsed();
                        return Err(err);
                    }
                    warn!(phase = stage.name(), error = %err, "non-critical phase failed, passthrough");
                    execution.record(PhaseExecution {
                        name: stage.name(),
                        status: PhaseStatus::FailedNonCritical,
                        duration,
                        detail: err.to_string(),
                    });
                    // `state` keeps whatever the prior phase produced — the
                    // passthrough spec §4.10 calls for.
                }
            }
        }

        let summary_started = Instant::now();
        info!(
            loaded = state.loaded_count,
            filtered = state.filtered_count,
            validated = state.validated_count,
            emitted = state.channels.len(),
            "pipeline run summary",
        );
        execution.record(PhaseExecution {
            name: "summary",
            status: PhaseStatus::Completed,
            duration: summary_started.elapsed(),
            detail: format!("{} channels emitted", state.channels.len()),
        });

        execution.warnings = state.warnings;
        execution.status = PipelineStatus::Completed;
        execution.total_duration = run_started.elapsed();
        Ok(execution)
    }

    async fn service_init(
        &self,
        config: &Arc<ConfigView>,
    ) -> Result<(Box<dyn Repository>, RuleSet, Emitter), PipelineError> {
        let repository = crate::sources::build_repository(config.clone())
            .map_err(|err| PipelineError::stage_error_with_source("service-init", err.to_string(), err))?;
        let rules = RuleSet::from_config(config);
        let emitter = Emitter::new(config.clone())
            .await
            .map_err(|err| PipelineError::stage_error_with_source("service-init", err.to_string(), err))?;
        Ok((repository, rules, emitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn empty_hybrid_source_completes_with_zero_channels() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.base_dir = dir.path().display().to_string();
        config.validated_catalog_path =
            dir.path().join("catalog.csv").display().to_string();
        config.playlist_output_path = dir.path().join("playlist.m3u").display().to_string();
        config.per_channel_playlist_dir = dir.path().join("fragments").display().to_string();

        let coordinator = PipelineCoordinator::new(config);
        let execution = coordinator.run().await.unwrap();
        assert_eq!(execution.status, PipelineStatus::Completed);
    }
}
