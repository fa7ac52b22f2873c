mod keywords;
mod rules;

pub use rules::{FilterEngine, RuleSet, SOURCE_FILE_KEY};
