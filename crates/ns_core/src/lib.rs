pub mod capabilities;
pub mod error;
pub mod storage;
pub mod types;

pub use capabilities::{ArticleSource, LanguageModel, SpeechSynthesizer, Translator};
pub use error::{Error, Result};
pub use storage::AnalysisStore;
pub use types::{
    cache_key, ArticleAnalysis, CompanyAnalysis, ComparativeAnalysis, CoverageDifference,
    RawArticle, Sentiment, SentimentDistribution, TopicOverlap,
};
