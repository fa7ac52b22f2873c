//! Configuration loading: a two-layer system mirroring `m3u-proxy`'s
//! `config` module. [`Config`] is the raw, figment-deserialized surface;
//! [`ConfigView`] is the validated, defaulted, `Arc`-shared projection every
//! pipeline stage actually borrows.

pub mod defaults;

use std::path::PathBuf;
use std::sync::Arc;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use defaults::*;

/// Raw configuration surface, deserialized from a TOML file overlaid with
/// `CHANNEL_CURATOR_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_channels_source")]
    pub channels_source: String,
    pub channels_file: Option<String>,
    #[serde(default)]
    pub playlist_urls: Vec<String>,
    #[serde(default)]
    pub local_playlist_files: Vec<String>,
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    pub project_root: Option<String>,

    #[serde(default = "default_validated_catalog_path")]
    pub validated_catalog_path: String,
    #[serde(default = "default_playlist_output_path")]
    pub playlist_output_path: String,
    #[serde(default = "default_per_channel_playlist_dir")]
    pub per_channel_playlist_dir: String,
    #[serde(default)]
    pub enable_backup: bool,

    #[serde(default)]
    pub priority_channels: Vec<String>,
    #[serde(default)]
    pub category_order: Vec<String>,
    #[serde(default)]
    pub source_priority: Vec<String>,

    #[serde(default)]
    pub banned_names: Vec<String>,
    #[serde(default)]
    pub banned_urls: Vec<String>,
    #[serde(default)]
    pub banned_ips: Vec<String>,
    #[serde(default)]
    pub banned_ip_ranges: Vec<String>,
    #[serde(default)]
    pub banned_regex: Vec<String>,
    #[serde(default)]
    pub allowed_channels: Vec<String>,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    #[serde(default)]
    pub ignore_names_for_filtering: Vec<String>,
    #[serde(default)]
    pub ignore_ips_for_filtering: Vec<String>,
    #[serde(default)]
    pub ignore_urls_for_filtering: Vec<String>,
    #[serde(default)]
    pub ignore_files: Vec<String>,

    #[serde(default)]
    pub filter_religious_content: bool,
    #[serde(default)]
    pub filter_adult_content: bool,
    #[serde(default)]
    pub filter_political_content: bool,
    #[serde(default)]
    pub religious_keywords: Vec<String>,
    #[serde(default)]
    pub adult_keywords: Vec<String>,
    #[serde(default)]
    pub political_keywords: Vec<String>,

    #[serde(default = "default_true")]
    pub enable_stream_validation: bool,
    #[serde(default)]
    pub remove_invalid_streams: bool,
    #[serde(default = "default_stream_validation_timeout_secs")]
    pub stream_validation_timeout_sec: u64,
    #[serde(default = "default_validation_concurrency")]
    pub validation_concurrency: usize,
    #[serde(default = "default_validation_batch_size")]
    pub validation_batch_size: usize,
    #[serde(default = "default_validation_retries")]
    pub validation_retries: u32,
    #[serde(default = "default_validation_retry_delay_secs")]
    pub validation_retry_delay_secs: u64,
    #[serde(default = "default_reachability_cache_size")]
    pub reachability_cache_size: usize,
    #[serde(default = "default_reachability_cache_ttl_secs")]
    pub reachability_cache_ttl_secs: u64,

    #[serde(default)]
    pub convert_https_to_http: bool,
    #[serde(default)]
    pub validate_http_conversion: bool,
    #[serde(default = "default_http_conversion_timeout_secs")]
    pub http_conversion_timeout_sec: u64,
    #[serde(default = "default_http_conversion_max_concurrency")]
    pub http_conversion_max_concurrency: usize,

    #[serde(default = "default_name_similarity_threshold")]
    pub name_similarity_threshold: f64,
    #[serde(default = "default_url_similarity_threshold")]
    pub url_similarity_threshold: f64,
    #[serde(default = "default_true")]
    pub enable_hd_upgrade: bool,
    #[serde(default = "default_true")]
    pub preserve_source_priority: bool,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    #[serde(default = "default_remote_fetch_timeout_secs")]
    pub remote_fetch_timeout_sec: u64,
}

fn default_true() -> bool {
    true
}

fn default_base_dir() -> String {
    ".".to_string()
}

impl Config {
    /// Load from an optional TOML file path, overlaid with
    /// `CHANNEL_CURATOR_*` environment variables, matching `m3u-proxy`'s
    /// figment bootstrap.
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("CHANNEL_CURATOR_").split("__"));
        figment.extract().map_err(|source| ConfigError::Load {
            path: path.map(|p| p.display().to_string()).unwrap_or_else(|| "<env only>".to_string()),
            source,
        })
    }
}

/// Validated, defaulted, cheaply-clonable projection of [`Config`]. This is
/// what every pipeline stage and worker task actually holds.
#[derive(Debug, Clone)]
pub struct ConfigView {
    pub channels_source: String,
    pub channels_file: Option<PathBuf>,
    pub playlist_urls: Vec<String>,
    pub local_playlist_files: Vec<String>,
    pub base_dir: PathBuf,
    pub project_root: PathBuf,

    pub validated_catalog_path: PathBuf,
    pub playlist_output_path: PathBuf,
    pub per_channel_playlist_dir: PathBuf,
    pub enable_backup: bool,

    pub priority_channels: Vec<String>,
    pub category_order: Vec<String>,
    pub source_priority: Vec<String>,

    pub banned_names: Vec<String>,
    pub banned_urls: Vec<String>,
    pub banned_ips: Vec<String>,
    pub banned_ip_ranges: Vec<String>,
    pub banned_regex: Vec<String>,
    pub allowed_channels: Vec<String>,
    pub allowed_ips: Vec<String>,
    pub ignore_names_for_filtering: Vec<String>,
    pub ignore_ips_for_filtering: Vec<String>,
    pub ignore_urls_for_filtering: Vec<String>,
    pub ignore_files: Vec<String>,

    pub filter_religious_content: bool,
    pub filter_adult_content: bool,
    pub filter_political_content: bool,
    pub religious_keywords: Vec<String>,
    pub adult_keywords: Vec<String>,
    pub political_keywords: Vec<String>,

    pub enable_stream_validation: bool,
    pub remove_invalid_streams: bool,
    pub stream_validation_timeout: std::time::Duration,
    pub validation_concurrency: usize,
    pub validation_batch_size: usize,
    pub validation_retries: u32,
    pub validation_retry_delay: std::time::Duration,
    pub reachability_cache_size: usize,
    pub reachability_cache_ttl: std::time::Duration,

    pub convert_https_to_http: bool,
    pub validate_http_conversion: bool,
    pub http_conversion_timeout: std::time::Duration,
    pub http_conversion_max_concurrency: usize,

    pub name_similarity_threshold: f64,
    pub url_similarity_threshold: f64,
    pub enable_hd_upgrade: bool,
    pub preserve_source_priority: bool,

    pub chunk_size: usize,
    pub max_concurrency: usize,

    pub remote_fetch_timeout: std::time::Duration,
}

impl ConfigView {
    /// Validate cross-field invariants and project into the immutable view.
    /// `remote_m3U` is accepted here as a deprecated alias for
    /// `remote_m3u`, logging a deprecation warning and canonicalizing.
    pub fn from_config(config: &Config) -> Result<Arc<Self>, ConfigError> {
        let channels_source = canonicalize_source_name(&config.channels_source);

        if !(0.0..=1.0).contains(&config.name_similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "name_similarity_threshold".to_string(),
                message: "must be within [0.0, 1.0]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&config.url_similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                field: "url_similarity_threshold".to_string(),
                message: "must be within [0.0, 1.0]".to_string(),
            });
        }
        if config.validated_catalog_path.trim().is_empty() {
            return Err(ConfigError::MissingOption("validated_catalog_path".to_string()));
        }
        if config.playlist_output_path.trim().is_empty() {
            return Err(ConfigError::MissingOption("playlist_output_path".to_string()));
        }
        if config.per_channel_playlist_dir.trim().is_empty() {
            return Err(ConfigError::MissingOption("per_channel_playlist_dir".to_string()));
        }

        let base_dir = PathBuf::from(&config.base_dir);
        let project_root =
            config.project_root.as_ref().map(PathBuf::from).unwrap_or_else(|| base_dir.clone());

        Ok(Arc::new(Self {
            channels_source,
            channels_file: config.channels_file.as_ref().map(PathBuf::from),
            playlist_urls: config.playlist_urls.clone(),
            local_playlist_files: config.local_playlist_files.clone(),
            base_dir,
            project_root,

            validated_catalog_path: PathBuf::from(&config.validated_catalog_path),
            playlist_output_path: PathBuf::from(&config.playlist_output_path),
            per_channel_playlist_dir: PathBuf::from(&config.per_channel_playlist_dir),
            enable_backup: config.enable_backup,

            priority_channels: config.priority_channels.clone(),
            category_order: config.category_order.clone(),
            source_priority: config.source_priority.clone(),

            banned_names: config.banned_names.clone(),
            banned_urls: config.banned_urls.clone(),
            banned_ips: config.banned_ips.clone(),
            banned_ip_ranges: config.banned_ip_ranges.clone(),
            banned_regex: config.banned_regex.clone(),
            allowed_channels: config.allowed_channels.clone(),
            allowed_ips: config.allowed_ips.clone(),
            ignore_names_for_filtering: config.ignore_names_for_filtering.clone(),
            ignore_ips_for_filtering: config.ignore_ips_for_filtering.clone(),
            ignore_urls_for_filtering: config.ignore_urls_for_filtering.clone(),
            ignore_files: config.ignore_files.clone(),

            filter_religious_content: config.filter_religious_content,
            filter_adult_content: config.filter_adult_content,
            filter_political_content: config.filter_political_content,
            religious_keywords: config.religious_keywords.clone(),
            adult_keywords: config.adult_keywords.clone(),
            political_keywords: config.political_keywords.clone(),

            enable_stream_validation: config.enable_stream_validation,
            remove_invalid_streams: config.remove_invalid_streams,
            stream_validation_timeout: std::time::Duration::from_secs(
                config.stream_validation_timeout_sec,
            ),
            validation_concurrency: config.validation_concurrency.max(1),
            validation_batch_size: config.validation_batch_size.max(1),
            validation_retries: config.validation_retries,
            validation_retry_delay: std::time::Duration::from_secs(
                config.validation_retry_delay_secs,
            ),
            reachability_cache_size: config.reachability_cache_size.max(1),
            reachability_cache_ttl: std::time::Duration::from_secs(
                config.reachability_cache_ttl_secs,
            ),

            convert_https_to_http: config.convert_https_to_http,
            validate_http_conversion: config.validate_http_conversion,
            http_conversion_timeout: std::time::Duration::from_secs(
                config.http_conversion_timeout_sec,
            ),
            http_conversion_max_concurrency: config.http_conversion_max_concurrency.max(1),

            name_similarity_threshold: config.name_similarity_threshold,
            url_similarity_threshold: config.url_similarity_threshold,
            enable_hd_upgrade: config.enable_hd_upgrade,
            preserve_source_priority: config.preserve_source_priority,

            chunk_size: config.chunk_size.max(1),
            max_concurrency: config.max_concurrency.max(1),

            remote_fetch_timeout: std::time::Duration::from_secs(config.remote_fetch_timeout_sec),
        }))
    }
}

/// `remote_m3U` is a deprecated alias of `remote_m3u` (spec.md §9 Open
/// Questions resolution).
fn canonicalize_source_name(raw: &str) -> String {
    if raw.eq_ignore_ascii_case("remote_m3U") {
        tracing::warn!("channelsSource value 'remote_m3U' is deprecated, use 'remote_playlist'");
        "remote_playlist".to_string()
    } else {
        raw.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str("").expect("every field has a serde default or is Option")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_projects_cleanly() {
        let config = Config::default();
        let view = ConfigView::from_config(&config).expect("defaults must validate");
        assert_eq!(view.chunk_size, 15);
        assert_eq!(view.validation_concurrency, 15);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let mut config = Config::default();
        config.name_similarity_threshold = 1.5;
        assert!(ConfigView::from_config(&config).is_err());
    }

    #[test]
    fn canonicalizes_deprecated_source_alias() {
        let mut config = Config::default();
        config.channels_source = "remote_m3U".to_string();
        let view = ConfigView::from_config(&config).unwrap();
        assert_eq!(view.channels_source, "remote_playlist");
    }
}
