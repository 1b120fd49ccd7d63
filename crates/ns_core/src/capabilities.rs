use std::path::Path;
use async_trait::async_trait;
use crate::types::RawArticle;
use crate::Result;

/// Source of raw articles for a company. Best-effort: implementations
/// swallow per-article fetch failures and may return fewer than
/// `max_count` items, or none at all.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch(&self, company_name: &str, max_count: usize) -> Vec<RawArticle>;
}

/// A text-generation model. Used for both structured-extraction prompts
/// (parsed by the caller) and plain prose requests.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String>;
}

/// Speech synthesis capability. Writes an audio file at `output_path`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, lang: &str, output_path: &Path) -> Result<()>;
}
