//! Core data model for the channel curation engine (spec §3).

mod channel;

pub use channel::{Channel, ChannelGroup, PriorityEntry, Quality, ValidationVerdict, VerdictKind};

use std::collections::HashMap;

/// Opaque key/value attributes lifted from a playlist parser or tabular
/// source that don't map onto a named `Channel` field.
pub type Metadata = HashMap<String, String>;
