//! The single value threaded phase-to-phase (spec §4.11: "a single
//! `PipelineState` value... forward rather than opaque `PipelineArtifact`s",
//! since this engine has one artifact type, not many).

use std::collections::HashMap;

use crate::dedup::DedupMetrics;
use crate::models::Channel;

use super::phase::PhaseWarning;

#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    pub channels: Vec<Channel>,
    /// `channel.id -> reachable`, populated by core-processing's validation
    /// sub-step; consulted by summary logging only (dedup already consumed
    /// its own copy internally during core-processing).
    pub reachable: HashMap<String, bool>,
    /// Non-fatal per-record problems accumulated across every phase so far,
    /// carried forward the same way `channels` is.
    pub warnings: Vec<PhaseWarning>,
    pub loaded_count: usize,
    pub filtered_count: usize,
    pub dedup_metrics: Option<DedupMetrics>,
    pub validated_count: usize,
    pub enriched_count: usize,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }
}
