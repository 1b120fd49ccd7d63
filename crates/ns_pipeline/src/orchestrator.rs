use std::sync::Arc;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};
use ns_core::{
    AnalysisStore, ArticleSource, CompanyAnalysis, ComparativeAnalysis, Error, Result,
    SentimentDistribution,
};
use ns_inference::{AggregateAnalyzer, ArticleAnalyzer};
use ns_speech::Localizer;
use crate::companies::CompanyRegistry;

const NO_ARTICLES_VERDICT: &str = "No articles found for analysis.";

/// Outcome of one company's pipeline run inside a batch.
pub struct RunOutcome {
    pub company: String,
    pub result: Result<CompanyAnalysis>,
}

/// Composes source, analyzers, localizer and store into the end-to-end
/// pipeline for one company, and fans out across companies under a
/// concurrency cap.
///
/// Each company's pipeline is sequential internally; model calls are
/// paced one at a time. Concurrent re-runs of the *same* company are not
/// serialized here and must be avoided by the caller.
pub struct Orchestrator {
    source: Arc<dyn ArticleSource>,
    analyzer: ArticleAnalyzer,
    aggregator: AggregateAnalyzer,
    localizer: Localizer,
    store: Arc<dyn AnalysisStore>,
    registry: Arc<CompanyRegistry>,
    max_articles: usize,
    concurrency: usize,
}

impl Orchestrator {
    pub fn new(
        source: Arc<dyn ArticleSource>,
        analyzer: ArticleAnalyzer,
        aggregator: AggregateAnalyzer,
        localizer: Localizer,
        store: Arc<dyn AnalysisStore>,
        registry: Arc<CompanyRegistry>,
    ) -> Self {
        Self {
            source,
            analyzer,
            aggregator,
            localizer,
            store,
            registry,
            max_articles: 10,
            concurrency: 3,
        }
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn AnalysisStore> {
        &self.store
    }

    pub fn registry(&self) -> &CompanyRegistry {
        &self.registry
    }

    /// Full pipeline for one company: fetch, analyze each article in
    /// order, aggregate, localize, persist. Analysis and localization
    /// failures degrade in place; only persistence errors propagate.
    pub async fn run(&self, company_name: &str) -> Result<CompanyAnalysis> {
        info!("🏁 Starting analysis for {}", company_name);

        let raw_articles = self.source.fetch(company_name, self.max_articles).await;

        if raw_articles.is_empty() {
            warn!("No articles found for {}", company_name);
            let analysis = CompanyAnalysis {
                company: company_name.to_string(),
                ticker: self.registry.ticker_for(company_name),
                articles: Vec::new(),
                comparative: ComparativeAnalysis::empty(),
                overall_sentiment: "Unknown".to_string(),
                final_verdict: NO_ARTICLES_VERDICT.to_string(),
                translated_verdict: None,
                audio_path: None,
                timestamp: Utc::now().to_rfc3339(),
            };
            self.store.save(company_name, &analysis).await?;
            return Ok(analysis);
        }

        info!("🤖 Analyzing {} articles for {}", raw_articles.len(), company_name);
        let mut articles = Vec::with_capacity(raw_articles.len());
        for raw_article in &raw_articles {
            // Degraded results still count as processed.
            articles.push(self.analyzer.analyze(raw_article).await);
        }

        let comparative = self.aggregator.aggregate(company_name, &articles).await;
        let final_verdict = self.aggregator.summarize(company_name, &articles).await;
        let overall_sentiment = SentimentDistribution::count(&articles).overall().to_string();

        info!("🗣️ Localizing verdict for {}", company_name);
        let localization = self.localizer.localize(&final_verdict, company_name).await;

        let analysis = CompanyAnalysis {
            company: company_name.to_string(),
            ticker: self.registry.ticker_for(company_name),
            articles,
            comparative,
            overall_sentiment,
            final_verdict,
            translated_verdict: Some(localization.translated_text),
            audio_path: localization
                .audio_path
                .map(|p| p.to_string_lossy().into_owned()),
            timestamp: Utc::now().to_rfc3339(),
        };

        self.store.save(company_name, &analysis).await?;
        info!("✅ Analysis completed and saved for {}", company_name);
        Ok(analysis)
    }

    /// Run the pipeline for many companies with at most `concurrency` in
    /// flight. One company's failure never aborts its siblings.
    pub async fn run_many(&self, companies: &[String]) -> Vec<RunOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let futures: Vec<_> = companies
            .iter()
            .map(|company| {
                let semaphore = semaphore.clone();
                async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            return RunOutcome {
                                company: company.clone(),
                                result: Err(Error::External(e.into())),
                            }
                        }
                    };
                    let result = self.run(company).await;
                    if let Err(e) = &result {
                        error!("Error processing {}: {}", company, e);
                    }
                    RunOutcome {
                        company: company.clone(),
                        result,
                    }
                }
            })
            .collect();

        let outcomes = join_all(futures).await;

        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!(
            "🏁 Batch completed: {} companies processed successfully, {} failed",
            succeeded,
            outcomes.len() - succeeded
        );
        outcomes
    }

    /// Re-run only the localization stage against a cached record,
    /// without re-scraping or re-analyzing. Skips work when translation
    /// and audio are already present unless `force` is set.
    pub async fn localize_cached(&self, company_name: &str, force: bool) -> Result<CompanyAnalysis> {
        let mut analysis = self
            .store
            .load(company_name)
            .await?
            .ok_or_else(|| Error::NotFound(format!("No analysis cached for {}", company_name)))?;

        // load() already drops audio paths whose file is gone, so
        // presence here means the artifact exists.
        if !force && analysis.translated_verdict.is_some() && analysis.audio_path.is_some() {
            return Ok(analysis);
        }

        let localization = self
            .localizer
            .localize(&analysis.final_verdict, company_name)
            .await;
        analysis.translated_verdict = Some(localization.translated_text);
        analysis.audio_path = localization
            .audio_path
            .map(|p| p.to_string_lossy().into_owned());

        self.store.save(company_name, &analysis).await?;
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use async_trait::async_trait;
    use ns_core::{
        cache_key, LanguageModel, RawArticle, Sentiment, SpeechSynthesizer, Translator,
    };
    use ns_inference::NoPacing;
    use ns_storage::MemoryStore;

    struct StubSource {
        articles: Vec<RawArticle>,
    }

    #[async_trait]
    impl ArticleSource for StubSource {
        async fn fetch(&self, _company_name: &str, max_count: usize) -> Vec<RawArticle> {
            self.articles.iter().take(max_count).cloned().collect()
        }
    }

    /// Answers per-article prompts with a positive JSON payload, the
    /// comparative prompt with a narrative payload, and anything else
    /// with a prose verdict.
    struct ScriptedModel;

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.starts_with("Analyze the following news article") {
                Ok(r#"{"summary": "Good news.", "sentiment": "Positive", "topics": ["Growth"]}"#
                    .to_string())
            } else if prompt.contains("comparative analysis") {
                Ok(r#"{
                    "coverage_differences": [{"comparison": "Broadly aligned.", "impact": "Low"}],
                    "topic_overlap": {"common_topics": ["Growth"], "unique_topics": {}}
                }"#
                .to_string())
            } else {
                Ok("Overall positive outlook for the company.".to_string())
            }
        }
    }

    struct StubTranslator(&'static str);

    #[async_trait]
    impl Translator for StubTranslator {
        async fn translate(&self, _text: &str, _target_lang: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FileWritingSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for FileWritingSynthesizer {
        async fn synthesize(&self, _text: &str, _lang: &str, output_path: &Path) -> Result<()> {
            if let Some(parent) = output_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(output_path, b"mp3").await?;
            Ok(())
        }
    }

    /// Fails saves for one blacklisted key; everything else goes to the
    /// wrapped store.
    struct FlakyStore {
        inner: MemoryStore,
        failing_key: String,
    }

    #[async_trait]
    impl AnalysisStore for FlakyStore {
        async fn load(&self, company_name: &str) -> Result<Option<CompanyAnalysis>> {
            self.inner.load(company_name).await
        }

        async fn save(&self, company_name: &str, analysis: &CompanyAnalysis) -> Result<()> {
            if cache_key(company_name) == self.failing_key {
                return Err(Error::Storage("disk full".to_string()));
            }
            self.inner.save(company_name, analysis).await
        }

        async fn list(&self) -> Result<Vec<String>> {
            self.inner.list().await
        }

        fn audio_dir(&self) -> std::path::PathBuf {
            self.inner.audio_dir()
        }
    }

    fn raw_article(n: usize) -> RawArticle {
        RawArticle {
            url: format!("https://news.example.com/{}", n),
            title: format!("Story {}", n),
            content: "Acme Corp posted strong results.".to_string(),
        }
    }

    fn orchestrator(
        articles: Vec<RawArticle>,
        store: Arc<dyn AnalysisStore>,
        audio_dir: &Path,
    ) -> Orchestrator {
        let model: Arc<dyn LanguageModel> = Arc::new(ScriptedModel);
        Orchestrator::new(
            Arc::new(StubSource { articles }),
            ArticleAnalyzer::new(model.clone(), Arc::new(NoPacing)),
            AggregateAnalyzer::new(model),
            Localizer::new(
                Arc::new(StubTranslator("ACME_HI")),
                Arc::new(FileWritingSynthesizer),
                audio_dir,
                "hi",
            ),
            store,
            Arc::new(CompanyRegistry::empty()),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_three_positive_articles() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(dir.path()));
        let orchestrator = orchestrator(
            vec![raw_article(1), raw_article(2), raw_article(3)],
            store.clone(),
            dir.path(),
        );

        let analysis = orchestrator.run("Acme Corp").await.unwrap();

        assert_eq!(analysis.articles.len(), 3);
        assert!(analysis
            .articles
            .iter()
            .all(|a| a.sentiment == Sentiment::Positive));
        let dist = &analysis.comparative.sentiment_distribution;
        assert_eq!((dist.positive, dist.negative, dist.neutral), (3, 0, 0));
        assert_eq!(analysis.overall_sentiment, "Positive");
        assert_eq!(analysis.final_verdict, "Overall positive outlook for the company.");
        assert_eq!(analysis.translated_verdict.as_deref(), Some("ACME_HI"));

        let audio_path = analysis.audio_path.as_deref().unwrap();
        assert!(audio_path.ends_with("acme_corp_hi.mp3"));
        assert!(Path::new(audio_path).exists());

        // Persisted record matches the returned one.
        let cached = store.load("Acme Corp").await.unwrap().unwrap();
        assert_eq!(cached.final_verdict, analysis.final_verdict);
        assert_eq!(cached.articles.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_fetch_produces_minimal_record() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(dir.path()));
        let orchestrator = orchestrator(vec![], store.clone(), dir.path());

        let analysis = orchestrator.run("Ghost Co").await.unwrap();

        assert!(analysis.articles.is_empty());
        assert_eq!(analysis.overall_sentiment, "Unknown");
        assert_eq!(analysis.final_verdict, NO_ARTICLES_VERDICT);
        assert!(analysis.translated_verdict.is_none());
        assert!(analysis.audio_path.is_none());
        assert!(store.load("Ghost Co").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_single_article_has_empty_comparative() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(dir.path()));
        let orchestrator = orchestrator(vec![raw_article(1)], store, dir.path());

        let analysis = orchestrator.run("Acme Corp").await.unwrap();
        assert_eq!(analysis.articles.len(), 1);
        assert_eq!(analysis.comparative.sentiment_distribution.total(), 0);
        assert!(analysis.comparative.coverage_differences.is_empty());
    }

    #[tokio::test]
    async fn test_run_many_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(FlakyStore {
            inner: MemoryStore::new(dir.path()),
            failing_key: "bad_llc".to_string(),
        });
        let orchestrator = orchestrator(vec![raw_article(1)], store.clone(), dir.path());

        let companies = vec!["Good Inc".to_string(), "Bad LLC".to_string()];
        let outcomes = orchestrator.run_many(&companies).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(store.load("Good Inc").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_localize_cached_requires_record() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(dir.path()));
        let orchestrator = orchestrator(vec![], store, dir.path());

        let result = orchestrator.localize_cached("Unknown Co", false).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_localize_cached_backfills_and_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(dir.path()));
        let orchestrator = orchestrator(vec![], store.clone(), dir.path());

        // Seed a record without localization.
        let mut seeded = orchestrator.run("Acme Corp").await.unwrap();
        seeded.final_verdict = "Strong quarter.".to_string();
        seeded.translated_verdict = None;
        seeded.audio_path = None;
        store.save("Acme Corp", &seeded).await.unwrap();

        let backfilled = orchestrator.localize_cached("Acme Corp", false).await.unwrap();
        assert_eq!(backfilled.translated_verdict.as_deref(), Some("ACME_HI"));
        assert!(backfilled.audio_path.is_some());
        // The rest of the record is untouched.
        assert_eq!(backfilled.final_verdict, "Strong quarter.");

        // Already localized, not forced: returned as-is.
        let skipped = orchestrator.localize_cached("Acme Corp", false).await.unwrap();
        assert_eq!(skipped.audio_path, backfilled.audio_path);
    }
}
