//! Phase orchestration (spec §4.10, §4.11). Sequences
//! `configuration → service-init → data-loading → preparation →
//! core-processing → chunk-enrichment → emission → summary`, timing each
//! phase and deciding whether a failure aborts the run or falls back to a
//! passthrough, modeled on `m3u_proxy::pipeline::core::orchestrator`.

mod coordinator;
mod error;
mod phase;
mod stages;
mod state;
mod traits;

pub use coordinator::PipelineCoordinator;
pub use error::PipelineError;
pub use phase::{PhaseExecution, PhaseStatus, PhaseWarning, PipelineExecution, PipelineStatus};
pub use state::PipelineState;
pub use traits::PipelineStage;
