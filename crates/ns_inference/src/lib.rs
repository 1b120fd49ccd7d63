pub mod aggregate;
pub mod article;
pub mod extract;
pub mod models;
pub mod pacing;

pub use aggregate::AggregateAnalyzer;
pub use article::ArticleAnalyzer;
pub use models::GeminiModel;
pub use pacing::{FixedIntervalPacer, NoPacing, Pacer};

pub mod prelude {
    pub use super::{AggregateAnalyzer, ArticleAnalyzer, FixedIntervalPacer, NoPacing, Pacer};
    pub use ns_core::{ArticleAnalysis, LanguageModel, RawArticle, Result};
}
