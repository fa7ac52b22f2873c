//! Tabular catalog formatting (spec §4.9, §6). Pure formatting; I/O lives in
//! [`super::Emitter`].

use crate::models::Channel;

pub const HEADER: &str = "id,name,streamUrl,logo,genre,country,language,quality,type,isActive";

pub fn format_catalog(channels: &[Channel]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for channel in channels {
        out.push_str(&format_row(channel));
        out.push('\n');
    }
    out
}

fn format_row(channel: &Channel) -> String {
    let fields = [
        channel.id.as_str(),
        channel.name.as_str(),
        channel.stream_url.as_str(),
        channel.logo.as_deref().unwrap_or(""),
        channel.genre.as_deref().unwrap_or(""),
        channel.country.as_deref().unwrap_or(""),
        channel.language.as_deref().unwrap_or(""),
        quality_label(channel.quality),
        channel.channel_type,
        if channel.is_active { "true" } else { "false" },
    ];
    fields.iter().map(|f| quote_field(f)).collect::<Vec<_>>().join(",")
}

fn quality_label(quality: crate::models::Quality) -> &'static str {
    use crate::models::Quality::*;
    match quality {
        Unknown => "unknown",
        Sd => "SD",
        Hd => "HD",
        Fhd => "FHD",
        Uhd => "UHD",
        FourK => "4K",
    }
}

/// Wrap in double quotes, doubling inner quotes, when the field contains a
/// comma or a double quote (spec §6).
fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
