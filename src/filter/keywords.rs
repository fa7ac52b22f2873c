//! Built-in content-class keyword lists, used as a fallback when the
//! corresponding `ConfigView` list is empty but the category flag is set
//! (spec §4.3 "content-class keyword lists").

pub const RELIGIOUS: &[&str] =
    &["gospel", "church", "islam", "quran", "bible", "christian", "catholic", "sermon"];

pub const ADULT: &[&str] = &["xxx", "adult", "playboy", "redlight", "erotic"];

pub const POLITICAL: &[&str] = &["parliament", "senate", "election", "congress", "propaganda"];
