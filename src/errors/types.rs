//! Error type definitions for the channel curation engine.
//!
//! The hierarchy follows spec §7's error kinds directly: each kind is its own
//! `thiserror` enum, and `AppError` unifies them for callers that just need
//! to know "did the run fail, and why".

use thiserror::Error;

/// Top-level error type. Only fatal conditions (spec §7) are expected to
/// surface here; non-fatal conditions are captured as per-record annotations
/// and phase counters instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FilesystemError),

    #[error("internal invariant violated: {0}")]
    Invariant(#[from] InvariantError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

/// Malformed or missing required configuration. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required option: {0}")]
    MissingOption(String),

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("failed to load configuration from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: figment::Error,
    },
}

/// A source failed to load. Non-fatal if at least one source in a hybrid
/// aggregation succeeded; fatal otherwise (the coordinator decides which).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source type '{0}' is not supported")]
    UnsupportedSourceType(String),

    #[error("source configuration is invalid: {0}")]
    InvalidConfiguration(String),

    #[error("source '{name}' is not reachable: {message}")]
    ConnectionFailed { name: String, message: String },

    #[error("all configured sources failed to load")]
    AllSourcesFailed,

    #[error("failed to read local file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A malformed playlist or tabular line. Individual records are skipped; this
/// type exists so the parser can carry a reason into the phase's counters.
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("missing required field '{0}'")]
    MissingField(String),
}

/// Timeout, DNS failure, or TLS failure during a reachability probe.
/// Recorded on the channel's [`crate::models::ValidationVerdict`], never
/// propagated as a fatal error.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("dns resolution failed: {0}")]
    DnsFailure(String),

    #[error("tls handshake failed: {0}")]
    TlsFailure(String),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("{0}")]
    Other(String),
}

/// Emission could not write an artifact. Always fatal.
#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {message}")]
    Sandbox { path: String, message: String },
}

/// An internal postcondition was violated. This always indicates a bug in
/// the engine, not in the input data.
#[derive(Error, Debug)]
pub enum InvariantError {
    #[error("duplicate channel id after deduplication: {0}")]
    DuplicateId(String),

    #[error("duplicate stream url retained after deduplication: {0}")]
    DuplicateStreamUrl(String),

    #[error("priority channel '{name}' replicated {count} times (max 2)")]
    PriorityOverReplication { name: String, count: usize },

    #[error("{0}")]
    Other(String),
}
