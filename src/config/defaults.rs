//! Default values for [`super::Config`] fields, split out so the struct
//! definitions stay readable (mirrors `m3u-proxy`'s `config::defaults`).

pub fn default_channels_source() -> String {
    "hybrid".to_string()
}

pub fn default_validated_catalog_path() -> String {
    "data/tv.csv".to_string()
}

pub fn default_playlist_output_path() -> String {
    "data/channels.m3u".to_string()
}

pub fn default_per_channel_playlist_dir() -> String {
    "data/m3u8".to_string()
}

pub fn default_name_similarity_threshold() -> f64 {
    0.95
}

pub fn default_url_similarity_threshold() -> f64 {
    0.98
}

pub fn default_remote_fetch_timeout_secs() -> u64 {
    180
}

pub fn default_stream_validation_timeout_secs() -> u64 {
    45
}

pub fn default_http_conversion_timeout_secs() -> u64 {
    20
}

pub fn default_validation_concurrency() -> usize {
    15
}

pub fn default_validation_batch_size() -> usize {
    30
}

pub fn default_validation_retries() -> u32 {
    0
}

pub fn default_validation_retry_delay_secs() -> u64 {
    2
}

pub fn default_reachability_cache_size() -> usize {
    1000
}

pub fn default_reachability_cache_ttl_secs() -> u64 {
    3600
}

pub fn default_chunk_size() -> usize {
    15
}

pub fn default_max_concurrency() -> usize {
    4
}

pub fn default_http_conversion_max_concurrency() -> usize {
    15
}
