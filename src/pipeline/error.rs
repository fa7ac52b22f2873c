//! Pipeline error type (spec §7 "PipelineError mirrors the teacher's
//! hand-rolled stage-scoped error"). Kept hand-rolled rather than
//! `thiserror`-derived because it carries a non-`Error`-bound boxed source
//! field, exactly as in the teacher's `pipeline::error::PipelineError`.

use std::fmt;

#[derive(Debug)]
pub enum PipelineError {
    /// A critical-category phase (configuration, service-init, emission)
    /// failed outright; the run aborts.
    Stage {
        stage: &'static str,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The run-wide cancellation token fired mid-phase.
    Cancelled { stage: &'static str },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Stage { stage, message, .. } => {
                write!(f, "phase '{stage}' failed: {message}")
            }
            PipelineError::Cancelled { stage } => {
                write!(f, "phase '{stage}' aborted: cancellation requested")
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Stage { source: Some(e), .. } => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl PipelineError {
    pub fn stage_error_with_source(
        stage: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        PipelineError::Stage { stage, message: message.into(), source: Some(Box::new(source)) }
    }
}
