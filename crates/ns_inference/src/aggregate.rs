use std::collections::BTreeMap;
use std::sync::Arc;
use serde::Deserialize;
use tracing::warn;
use ns_core::{
    ArticleAnalysis, ComparativeAnalysis, CoverageDifference, LanguageModel,
    SentimentDistribution, TopicOverlap,
};
use crate::extract::parse_embedded_json;

#[derive(Debug, Deserialize)]
struct ComparativePayload {
    #[serde(default)]
    coverage_differences: Vec<CoverageDifferencePayload>,
    #[serde(default)]
    topic_overlap: TopicOverlapPayload,
}

#[derive(Debug, Deserialize)]
struct CoverageDifferencePayload {
    #[serde(default)]
    comparison: String,
    #[serde(default)]
    impact: String,
}

#[derive(Debug, Default, Deserialize)]
struct TopicOverlapPayload {
    #[serde(default)]
    common_topics: Vec<String>,
    /// Keyed by 1-based article number as the prompt presents them.
    #[serde(default)]
    unique_topics: BTreeMap<String, Vec<String>>,
}

/// Cross-article comparison and the final verdict. The sentiment
/// distribution is counted locally and survives any model failure; only
/// the narrative portions fall back.
pub struct AggregateAnalyzer {
    model: Arc<dyn LanguageModel>,
}

impl AggregateAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn aggregate(
        &self,
        company_name: &str,
        articles: &[ArticleAnalysis],
    ) -> ComparativeAnalysis {
        // Comparison is undefined for fewer than two articles.
        if articles.len() < 2 {
            return ComparativeAnalysis::empty();
        }

        let distribution = SentimentDistribution::count(articles);

        let prompt = format!(
            "Analyze the following news articles about {} and provide a comparative analysis:\n\n\
             {}\n\n\
             Please provide:\n\
             1. Key coverage differences between the articles and their potential impact\n\
             2. Analysis of topic overlap (common topics and topics unique to each article)\n\n\
             Format your response as a JSON object with the following structure:\n\
             {{\n\
                 \"coverage_differences\": [\n\
                     {{\"comparison\": \"...\", \"impact\": \"...\"}},\n\
                     ...\n\
                 ],\n\
                 \"topic_overlap\": {{\n\
                     \"common_topics\": [\"topic1\", ...],\n\
                     \"unique_topics\": {{\"1\": [\"topic1\", ...], \"2\": [...], ...}}\n\
                 }}\n\
             }}",
            company_name,
            render_summaries(articles, true)
        );

        let narrative = match self.model.generate(&prompt).await {
            Ok(response) => parse_embedded_json::<ComparativePayload>(&response),
            Err(e) => {
                warn!("Error generating comparative analysis for {}: {}", company_name, e);
                None
            }
        };

        match narrative {
            Some(payload) => ComparativeAnalysis {
                sentiment_distribution: distribution,
                coverage_differences: payload
                    .coverage_differences
                    .into_iter()
                    .map(|d| CoverageDifference {
                        comparison: d.comparison,
                        impact: d.impact,
                    })
                    .collect(),
                topic_overlap: TopicOverlap {
                    common_topics: payload.topic_overlap.common_topics,
                    unique_topics: payload
                        .topic_overlap
                        .unique_topics
                        .into_iter()
                        .filter_map(|(number, topics)| {
                            let n: usize = number.trim().parse().ok()?;
                            Some((n.checked_sub(1)?, topics))
                        })
                        .collect(),
                },
            },
            // Keep the locally computed distribution even when the
            // narrative request fails.
            None => ComparativeAnalysis {
                sentiment_distribution: distribution,
                coverage_differences: vec![CoverageDifference {
                    comparison: "Failed to analyze coverage differences.".to_string(),
                    impact: "Unknown".to_string(),
                }],
                topic_overlap: TopicOverlap::default(),
            },
        }
    }

    /// Final plain-language verdict. Prose, not structured, so the raw
    /// response is used verbatim after trimming.
    pub async fn summarize(&self, company_name: &str, articles: &[ArticleAnalysis]) -> String {
        let prompt = format!(
            "Based on the following news articles about {}:\n\n\
             {}\n\n\
             Provide a concise final sentiment analysis in 2-3 sentences. Include:\n\
             1. The overall sentiment toward {} (positive, negative, or mixed)\n\
             2. Key factors driving this sentiment\n\
             3. Brief implications for the company\n\n\
             Respond with only the final sentiment analysis in 2-3 sentences.",
            company_name,
            render_summaries(articles, false),
            company_name
        );

        match self.model.generate(&prompt).await {
            Ok(response) => response.trim().to_string(),
            Err(e) => {
                warn!("Error generating final sentiment for {}: {}", company_name, e);
                format!(
                    "Unable to generate final sentiment analysis for {} due to an error.",
                    company_name
                )
            }
        }
    }
}

fn render_summaries(articles: &[ArticleAnalysis], include_topics: bool) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let mut block = format!(
                "Article {}: {}\nSummary: {}\nSentiment: {}",
                i + 1,
                article.title,
                article.summary,
                article.sentiment
            );
            if include_topics {
                block.push_str(&format!("\nTopics: {}", article.topics.join(", ")));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
