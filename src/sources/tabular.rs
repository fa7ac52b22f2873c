//! Delimited tabular source (spec §4.1 "tabular"). Reads a header row plus
//! data rows, tolerating quoted fields that embed the delimiter, and
//! normalizes column names onto [`Channel`] fields.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::{AppResult, ParseError, SourceError};
use crate::models::{Channel, Quality};
use crate::utils::name_normalize::detect_quality_marker;

use super::traits::Repository;

pub struct TabularRepository {
    path: PathBuf,
    source_tag: String,
    channels: Vec<Channel>,
    warnings: Vec<ParseError>,
}

impl TabularRepository {
    pub fn new(path: PathBuf, source_tag: impl Into<String>) -> Self {
        Self { path, source_tag: source_tag.into(), channels: Vec::new(), warnings: Vec::new() }
    }
}

#[async_trait]
impl Repository for TabularRepository {
    async fn initialize(&mut self) -> AppResult<()> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|source| {
            SourceError::Io { path: self.path.display().to_string(), source }
        })?;
        let (mut channels, warnings) = parse_tabular(&text, &self.source_tag);
        let path_tag = self.path.display().to_string();
        for channel in &mut channels {
            channel.metadata.insert(crate::filter::SOURCE_FILE_KEY.to_string(), path_tag.clone());
        }
        self.channels = channels;
        self.warnings = warnings;
        Ok(())
    }

    async fn get_all_channels(&self) -> AppResult<Vec<Channel>> {
        Ok(self.channels.clone())
    }

    fn get_channels_count(&self) -> Option<usize> {
        Some(self.channels.len())
    }

    fn warnings(&self) -> Vec<ParseError> {
        self.warnings.clone()
    }
}

/// Parse a delimited (comma) text body with a header row into channels.
/// Malformed rows (wrong field count, missing required fields) are skipped
/// and reported in the returned warning list, matching spec §4.1's "failure
/// semantics" for individual-record problems.
fn parse_tabular(text: &str, source_tag: &str) -> (Vec<Channel>, Vec<ParseError>) {
    let mut lines = text.lines();
    let Some(header_line) = lines.next() else {
        return (Vec::new(), Vec::new());
    };
    let header: Vec<String> =
        split_row(header_line).into_iter().map(|h| canonical_column(&h)).collect();

    let mut channels = Vec::new();
    let mut warnings = Vec::new();
    for (row_index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_row(line);
        if fields.len() != header.len() {
            let err = ParseError::MalformedLine {
                line: row_index + 2,
                message: format!("row has {} fields, expected {}", fields.len(), header.len()),
            };
            warn!(error = %err, "tabular row skipped");
            warnings.push(err);
            continue;
        }

        let mut id = None;
        let mut name = None;
        let mut stream_url = None;
        let mut logo = None;
        let mut genre = None;
        let mut country = None;
        let mut language = None;
        let mut quality = Quality::Unknown;
        let mut metadata = std::collections::HashMap::new();

        for (col, value) in header.iter().zip(fields.into_iter()) {
            match col.as_str() {
                "id" => id = Some(value),
                "name" => name = Some(value),
                "stream_url" => stream_url = Some(value),
                "logo" => logo = (!value.is_empty()).then_some(value),
                "genre" => genre = (!value.is_empty()).then_some(value),
                "country" => country = (!value.is_empty()).then_some(value),
                "language" => language = (!value.is_empty()).then_some(value),
                "quality" => quality = Quality::parse(&value),
                "type" | "is_active" => {}
                other => {
                    if !value.is_empty() {
                        metadata.insert(other.to_string(), value);
                    }
                }
            }
        }

        let (Some(name), Some(stream_url)) = (name, stream_url) else {
            let err = ParseError::MissingField("name or stream_url".to_string());
            warn!(row = row_index + 2, error = %err, "tabular row skipped");
            warnings.push(err);
            continue;
        };
        let id = id.filter(|s| !s.is_empty()).unwrap_or_else(|| format!("{source_tag}_{row_index}"));

        let mut channel = Channel::new(id, name, stream_url, source_tag, row_index);
        channel.logo = logo;
        channel.genre = genre;
        channel.country = country;
        channel.language = language;
        channel.quality = if quality == Quality::Unknown {
            detect_quality_marker(&channel.name).unwrap_or(Quality::Unknown)
        } else {
            quality
        };
        channel.metadata = metadata;
        channels.push(channel);
    }
    (channels, warnings)
}

/// Normalize a header column name: lowercase, snake_case, and fold the
/// `streamUrl`/`stream_url` alias pair onto one canonical name (spec §4.1).
fn canonical_column(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut snake = String::with_capacity(trimmed.len() + 4);
    for (i, ch) in trimmed.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.extend(ch.to_lowercase());
    }
    match snake.as_str() {
        "streamurl" | "stream_url" => "stream_url".to_string(),
        "isactive" | "is_active" => "is_active".to_string(),
        other => other.to_string(),
    }
}

/// Split one delimited row on commas, honoring double-quoted fields that may
/// embed a comma or an escaped (doubled) quote.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.clone());
                current.clear();
            }
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let text = "id,name,stream_url,quality\n1,ESPN,http://a/b,HD\n";
        let (channels, warnings) = parse_tabular(text, "tabular");
        assert_eq!(channels.len(), 1);
        assert!(warnings.is_empty());
        assert_eq!(channels[0].name, "ESPN");
        assert_eq!(channels[0].quality, Quality::Hd);
    }

    #[test]
    fn falls_back_to_name_marker_when_quality_column_absent() {
        let text = "id,name,stream_url\n1,ESPN HD,http://a/b\n";
        let (channels, _) = parse_tabular(text, "tabular");
        assert_eq!(channels[0].quality, Quality::Hd);
    }

    #[test]
    fn normalizes_stream_url_alias() {
        let text = "id,name,streamUrl\n1,ESPN,http://a/b\n";
        let (channels, _) = parse_tabular(text, "tabular");
        assert_eq!(channels[0].stream_url, "http://a/b");
    }

    #[test]
    fn honors_quoted_fields_with_embedded_comma() {
        let text = "id,name,stream_url\n1,\"ESPN, East\",http://a/b\n";
        let (channels, _) = parse_tabular(text, "tabular");
        assert_eq!(channels[0].name, "ESPN, East");
    }

    #[test]
    fn skips_malformed_rows() {
        let text = "id,name,stream_url\n1,ESPN\n2,CNN,http://a/c\n";
        let (channels, warnings) = parse_tabular(text, "tabular");
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].name, "CNN");
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], ParseError::MalformedLine { line: 2, .. }));
    }
}
