//! Extended-playlist (`#EXTM3U`) parsing (spec §4.2).

mod playlist_parser;

pub use playlist_parser::parse_playlist;
