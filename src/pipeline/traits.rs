//! `PipelineStage` (spec §4.11): the capability every named phase
//! implements, matching the teacher's `PipelineStage` trait collapsed to
//! this engine's single-state-value threading model.

use async_trait::async_trait;

use super::error::PipelineError;
use super::state::PipelineState;

#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Name used in log lines and [`super::phase::PhaseExecution`] records.
    fn name(&self) -> &'static str;

    /// Whether a failure here aborts the run (spec §4.10: configuration,
    /// service-init, and emission are critical; dedup, HTTPS conversion, and
    /// validation are not).
    fn critical(&self) -> bool;

    async fn execute(&self, state: PipelineState) -> Result<PipelineState, PipelineError>;
}
