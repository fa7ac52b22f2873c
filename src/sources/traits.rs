//! The `Repository` capability trait shared by every source variant,
//! following the Interface Segregation principle the teacher's
//! `SourceHandler`/`ChannelIngestor` split demonstrates, collapsed here to
//! the single interface spec §4.1 actually names.

use async_trait::async_trait;

use crate::errors::{AppResult, ParseError};
use crate::models::Channel;

/// Capability every source variant implements. `initialize` performs any
/// one-time setup (fetching remote content, opening files) so that
/// `get_all_channels` can be infallible-shaped in the common case; failures
/// are still surfaced through the `AppResult` return type per spec §4.1's
/// "repositories must not throw on an individual source failing" rule —
/// callers (notably [`super::HybridRepository`]) decide whether a failure
/// is fatal.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Prepare the repository for reading; may perform network I/O.
    async fn initialize(&mut self) -> AppResult<()>;

    /// Load every channel this repository can produce, in source order.
    async fn get_all_channels(&self) -> AppResult<Vec<Channel>>;

    /// Cheap count, used for progress reporting; `None` when unknown ahead
    /// of a full load (e.g. a remote playlist whose body hasn't been
    /// fetched yet).
    fn get_channels_count(&self) -> Option<usize>;

    /// Per-record parse problems accumulated during `initialize`, which was
    /// skipped rather than failed outright. Empty for repositories with
    /// nothing to parse (e.g. a source with no malformed rows this run).
    fn warnings(&self) -> Vec<ParseError> {
        Vec::new()
    }
}
