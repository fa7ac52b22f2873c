use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Metadata;

/// Stream quality tier (spec §3). Ordered so `Uhd > Fhd > Hd > Sd > Unknown`
/// for the HD-upgrade dedup tie-break (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    Unknown,
    Sd,
    Hd,
    Fhd,
    Uhd,
    FourK,
}

impl Quality {
    /// Parse a free-form quality token (case-insensitive), matching the
    /// common markers stripped out during name normalization.
    pub fn parse(token: &str) -> Self {
        match token.to_ascii_uppercase().as_str() {
            "4K" | "UHD4K" => Quality::FourK,
            "UHD" => Quality::Uhd,
            "FHD" | "1080P" | "1080" => Quality::Fhd,
            "HD" | "720P" | "720" => Quality::Hd,
            "SD" | "480P" => Quality::Sd,
            _ => Quality::Unknown,
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::Unknown
    }
}

/// The core entity the whole pipeline operates on (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Stable within a run; derived from the source record id or synthesized
    /// as `channel_<timestamp>_<index>`.
    pub id: String,
    pub name: String,
    pub stream_url: String,
    pub logo: Option<String>,
    pub background: Option<String>,
    pub poster: Option<String>,
    pub genre: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    pub quality: Quality,
    /// At-rest constant; always `"live"`. Kept as a field (rather than
    /// omitted) because the tabular catalog's header names a `type` column.
    pub channel_type: &'static str,
    pub is_active: bool,
    /// Provenance tag: which repository produced this record.
    pub source: String,
    /// Insertion order in the merged stream; the stability anchor for every
    /// stage that must restore determinism after unordered parallel work.
    pub original_index: usize,
    /// Preserved when `name` has been cleaned by the enrichment stage.
    pub original_name: Option<String>,
    pub metadata: Metadata,
}

impl Channel {
    /// A freshly-ingested channel before any enrichment has touched it.
    pub fn new(
        id: String,
        name: String,
        stream_url: String,
        source: impl Into<String>,
        original_index: usize,
    ) -> Self {
        Self {
            id,
            name,
            stream_url,
            logo: None,
            background: None,
            poster: None,
            genre: None,
            country: None,
            language: None,
            quality: Quality::Unknown,
            channel_type: "live",
            is_active: true,
            source: source.into(),
            original_index,
            original_name: None,
            metadata: Metadata::new(),
        }
    }

    /// The stream URL is well-formed per spec §3's invariant:
    /// non-empty and scheme-matches `^https?://`.
    pub fn has_valid_stream_url(&self) -> bool {
        !self.stream_url.is_empty()
            && (self.stream_url.starts_with("http://") || self.stream_url.starts_with("https://"))
    }
}

/// A cluster of candidate duplicates discovered by the deduplication engine
/// (spec §3, dedup-internal).
#[derive(Debug, Clone)]
pub struct ChannelGroup {
    pub representative: Channel,
    pub rejected: Vec<(Channel, String)>,
}

/// Outcome of a reachability probe performed by the [`crate::validator`].
/// Spec §4.6's failure taxonomy: `reachable | unreachable(status) | timeout |
/// dns_failure | tls_failure`, plus `Skipped` for channels never probed
/// (validation disabled, or resolved from the reachability cache before the
/// engine existed this run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictKind {
    Reachable,
    Unreachable,
    Timeout,
    DnsFailure,
    TlsFailure,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub kind: VerdictKind,
    #[serde(with = "duration_millis")]
    pub probe_duration: Duration,
    /// Response status code, populated only for `Unreachable` verdicts.
    pub status: Option<u16>,
}

impl ValidationVerdict {
    pub fn reachable(probe_duration: Duration) -> Self {
        Self { kind: VerdictKind::Reachable, probe_duration, status: None }
    }

    pub fn unreachable(probe_duration: Duration, status: Option<u16>) -> Self {
        Self { kind: VerdictKind::Unreachable, probe_duration, status }
    }

    pub fn timeout(probe_duration: Duration) -> Self {
        Self { kind: VerdictKind::Timeout, probe_duration, status: None }
    }

    pub fn dns_failure(probe_duration: Duration) -> Self {
        Self { kind: VerdictKind::DnsFailure, probe_duration, status: None }
    }

    pub fn tls_failure(probe_duration: Duration) -> Self {
        Self { kind: VerdictKind::TlsFailure, probe_duration, status: None }
    }

    pub fn skipped() -> Self {
        Self { kind: VerdictKind::Skipped, probe_duration: Duration::ZERO, status: None }
    }

    pub fn is_reachable(&self) -> bool {
        self.kind == VerdictKind::Reachable
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}

/// An ordered, normalized priority name (configuration, spec §3).
#[derive(Debug, Clone)]
pub struct PriorityEntry {
    pub normalized_name: String,
    pub rank: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_parses_known_tokens() {
        assert_eq!(Quality::parse("hd"), Quality::Hd);
        assert_eq!(Quality::parse("FHD"), Quality::Fhd);
        assert_eq!(Quality::parse("4k"), Quality::FourK);
        assert_eq!(Quality::parse("potato"), Quality::Unknown);
    }

    #[test]
    fn quality_orders_hd_upgrade_direction() {
        assert!(Quality::Uhd > Quality::Fhd);
        assert!(Quality::Fhd > Quality::Hd);
        assert!(Quality::Hd > Quality::Sd);
        assert!(Quality::Sd > Quality::Unknown);
        assert!(Quality::FourK > Quality::Uhd);
    }

    #[test]
    fn stream_url_validation() {
        let mut ch = Channel::new("1".into(), "Test".into(), "http://x/y".into(), "m3u", 0);
        assert!(ch.has_valid_stream_url());
        ch.stream_url = "ftp://x".into();
        assert!(!ch.has_valid_stream_url());
        ch.stream_url = String::new();
        assert!(!ch.has_valid_stream_url());
    }
}
