use std::sync::Arc;
use serde::Deserialize;
use tracing::{debug, warn};
use ns_core::{ArticleAnalysis, LanguageModel, RawArticle, Sentiment};
use crate::extract::parse_embedded_json;
use crate::pacing::Pacer;

const FALLBACK_SUMMARY: &str = "No summary available.";
const ERROR_SUMMARY: &str = "Error analyzing article content.";

#[derive(Debug, Deserialize)]
struct ArticlePayload {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

/// Runs one article at a time through the language model and parses the
/// structured response. Never fails: malformed output and capability
/// errors both degrade to a neutral placeholder analysis so the rest of
/// the pipeline can proceed.
pub struct ArticleAnalyzer {
    model: Arc<dyn LanguageModel>,
    pacer: Arc<dyn Pacer>,
}

impl ArticleAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>, pacer: Arc<dyn Pacer>) -> Self {
        Self { model, pacer }
    }

    pub async fn analyze(&self, article: &RawArticle) -> ArticleAnalysis {
        self.pacer.pace().await;

        let prompt = format!(
            "Analyze the following news article:\n\n\
             Title: {}\n\
             Content: {}\n\n\
             Please provide:\n\
             1. A concise summary of the article (2-3 sentences)\n\
             2. The sentiment of the article (Positive, Negative, or Neutral)\n\
             3. A list of main topics covered in the article\n\n\
             Format your response as a JSON object with the following structure:\n\
             {{\n\
                 \"summary\": \"...\",\n\
                 \"sentiment\": \"...\",\n\
                 \"topics\": [\"topic1\", \"topic2\", ...]\n\
             }}",
            article.title, article.content
        );

        match self.model.generate(&prompt).await {
            Ok(response) => {
                debug!("Model response for {}: {} chars", article.url, response.len());
                match parse_embedded_json::<ArticlePayload>(&response) {
                    Some(payload) => ArticleAnalysis {
                        title: article.title.clone(),
                        url: article.url.clone(),
                        summary: payload
                            .summary
                            .unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
                        sentiment: payload
                            .sentiment
                            .map(|s| Sentiment::parse_lenient(&s))
                            .unwrap_or(Sentiment::Neutral),
                        topics: payload
                            .topics
                            .filter(|t| !t.is_empty())
                            .unwrap_or_else(|| vec!["Unknown".to_string()]),
                    },
                    None => {
                        warn!("Unparseable model response for article: {}", article.url);
                        ArticleAnalysis {
                            title: article.title.clone(),
                            url: article.url.clone(),
                            summary: FALLBACK_SUMMARY.to_string(),
                            sentiment: Sentiment::Neutral,
                            topics: vec!["Unknown".to_string()],
                        }
                    }
                }
            }
            Err(e) => {
                warn!("Error analyzing article {}: {}", article.url, e);
                ArticleAnalysis {
                    title: article.title.clone(),
                    url: article.url.clone(),
                    summary: ERROR_SUMMARY.to_string(),
                    sentiment: Sentiment::Neutral,
                    topics: vec!["Error".to_string()],
                }
            }
        }
    }
}
