use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// An article as returned by a news source, before any analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawArticle {
    pub url: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse a sentiment label from model output. Unrecognized labels
    /// resolve to Neutral so a sloppy response never aborts analysis.
    pub fn parse_lenient(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Per-article analysis result. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
}

/// Counts per sentiment label. Field order is fixed (Positive, Negative,
/// Neutral) so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentDistribution {
    pub fn count(articles: &[ArticleAnalysis]) -> Self {
        let mut dist = Self::default();
        for article in articles {
            dist.record(article.sentiment);
        }
        dist
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Plain-language label for the dominant sentiment, "Unknown" when no
    /// articles were counted and "Mixed" when positive and negative tie.
    pub fn overall(&self) -> &'static str {
        if self.total() == 0 {
            return "Unknown";
        }
        if self.positive > self.negative && self.positive >= self.neutral {
            "Positive"
        } else if self.negative > self.positive && self.negative >= self.neutral {
            "Negative"
        } else if self.positive == self.negative && self.positive > 0 {
            "Mixed"
        } else {
            "Neutral"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageDifference {
    pub comparison: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicOverlap {
    pub common_topics: Vec<String>,
    /// Topics unique to a given article, keyed by its position in the
    /// article list.
    pub unique_topics: BTreeMap<usize, Vec<String>>,
}

/// Cross-article comparison. The distribution is always computed locally;
/// the narrative fields come from the language model and may be fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeAnalysis {
    pub sentiment_distribution: SentimentDistribution,
    pub coverage_differences: Vec<CoverageDifference>,
    pub topic_overlap: TopicOverlap,
}

impl ComparativeAnalysis {
    /// The comparison is undefined for fewer than two articles.
    pub fn empty() -> Self {
        Self {
            sentiment_distribution: SentimentDistribution::default(),
            coverage_differences: Vec::new(),
            topic_overlap: TopicOverlap::default(),
        }
    }
}

/// The persisted unit: one full analysis run for one company. Overwritten
/// wholesale on re-run, except the localization fields which may be
/// backfilled in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    pub company: String,
    pub ticker: Option<String>,
    pub articles: Vec<ArticleAnalysis>,
    pub comparative: ComparativeAnalysis,
    pub overall_sentiment: String,
    pub final_verdict: String,
    pub translated_verdict: Option<String>,
    pub audio_path: Option<String>,
    pub timestamp: String,
}

/// Canonical cache identity for a company name: lowercase, spaces to
/// underscores. Two spellings that normalize identically share one record;
/// that collision is the cache's documented identity function.
pub fn cache_key(company_name: &str) -> String {
    company_name.trim().to_lowercase().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse_lenient() {
        assert_eq!(Sentiment::parse_lenient("Positive"), Sentiment::Positive);
        assert_eq!(Sentiment::parse_lenient("  negative "), Sentiment::Negative);
        assert_eq!(Sentiment::parse_lenient("NEUTRAL"), Sentiment::Neutral);
        assert_eq!(Sentiment::parse_lenient("bullish"), Sentiment::Neutral);
    }

    #[test]
    fn test_distribution_totals_match_article_count() {
        let articles: Vec<ArticleAnalysis> = [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Positive,
        ]
        .iter()
        .map(|&sentiment| ArticleAnalysis {
            title: "t".to_string(),
            url: "u".to_string(),
            summary: "s".to_string(),
            sentiment,
            topics: vec![],
        })
        .collect();

        let dist = SentimentDistribution::count(&articles);
        assert_eq!(dist.total(), articles.len());
        assert_eq!(dist.positive, 2);
        assert_eq!(dist.negative, 1);
        assert_eq!(dist.neutral, 1);
        assert_eq!(dist.overall(), "Positive");
    }

    #[test]
    fn test_distribution_overall_labels() {
        assert_eq!(SentimentDistribution::default().overall(), "Unknown");
        let mixed = SentimentDistribution { positive: 2, negative: 2, neutral: 0 };
        assert_eq!(mixed.overall(), "Mixed");
        let neutral = SentimentDistribution { positive: 1, negative: 1, neutral: 3 };
        assert_eq!(neutral.overall(), "Neutral");
    }

    #[test]
    fn test_cache_key_normalization() {
        assert_eq!(cache_key("Tesla Inc"), "tesla_inc");
        assert_eq!(cache_key("tesla inc"), "tesla_inc");
        assert_eq!(cache_key("  Acme Corp "), "acme_corp");
    }
}
