pub mod google_news;

pub use google_news::GoogleNewsSource;

pub mod prelude {
    pub use super::GoogleNewsSource;
    pub use ns_core::{ArticleSource, RawArticle, Result};
}
