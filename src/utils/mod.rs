pub mod name_normalize;
pub mod similarity;
pub mod slug;
pub mod url;

pub use name_normalize::normalize_name;
pub use similarity::{jaccard_token_similarity, ngram_similarity};
pub use slug::slugify;
pub use url::UrlUtils;
