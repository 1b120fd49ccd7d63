use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use ns_core::{cache_key, Error};
use crate::AppState;

/// Maps core errors onto API responses: not-found outcomes become 404,
/// everything else a 500 with the error message.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}

fn not_found(detail: String) -> ApiError {
    ApiError(Error::NotFound(detail))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "News Sentiment Analysis API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API for extracting and analyzing news articles about companies"
    }))
}

pub async fn list_companies(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let companies: Vec<_> = state
        .orchestrator
        .registry()
        .entries()
        .iter()
        .map(|entry| json!({ "name": entry.name, "ticker": entry.ticker }))
        .collect();
    Json(json!({ "companies": companies }))
}

#[derive(Debug, Default, Deserialize)]
pub struct SentimentParams {
    /// Force regeneration of translation and audio even when present.
    #[serde(default)]
    pub refresh_tts: bool,
}

pub async fn get_sentiment(
    State(state): State<Arc<AppState>>,
    Path(company_name): Path<String>,
    Query(params): Query<SentimentParams>,
) -> Result<Response, ApiError> {
    if !state.orchestrator.registry().contains(&company_name) {
        return Err(not_found(format!("Company '{}' not found", company_name)));
    }

    // Backfills missing translation/audio on the way out; a no-op when
    // both are already present and no refresh was requested.
    let analysis = state
        .orchestrator
        .localize_cached(&company_name, params.refresh_tts)
        .await?;
    Ok(Json(analysis).into_response())
}

pub async fn get_audio(
    State(state): State<Arc<AppState>>,
    Path(company_name): Path<String>,
) -> Result<Response, ApiError> {
    if !state.orchestrator.registry().contains(&company_name) {
        return Err(not_found(format!("Company '{}' not found", company_name)));
    }

    // Regenerates the artifact when the cached record has lost it.
    let analysis = state.orchestrator.localize_cached(&company_name, false).await?;
    let audio_path = analysis
        .audio_path
        .ok_or_else(|| not_found("Audio file not found".to_string()))?;

    let audio = tokio::fs::read(&audio_path).await.map_err(Error::from)?;

    let headers = [
        (header::CONTENT_TYPE, "audio/mpeg".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"{}_sentiment.mp3\"",
                cache_key(&company_name)
            ),
        ),
    ];
    Ok((headers, audio).into_response())
}

pub async fn analyze_company(
    State(state): State<Arc<AppState>>,
    Path(company_name): Path<String>,
) -> Result<Response, ApiError> {
    let analysis = state.orchestrator.run(&company_name).await?;
    Ok(Json(analysis).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path as FsPath;
    use async_trait::async_trait;
    use ns_core::{
        AnalysisStore, ArticleSource, LanguageModel, RawArticle, Result, SpeechSynthesizer,
        Translator,
    };
    use ns_inference::{AggregateAnalyzer, ArticleAnalyzer, NoPacing};
    use ns_pipeline::{CompanyRegistry, Orchestrator};
    use ns_speech::Localizer;
    use ns_storage::MemoryStore;

    struct EmptySource;

    #[async_trait]
    impl ArticleSource for EmptySource {
        async fn fetch(&self, _company_name: &str, _max_count: usize) -> Vec<RawArticle> {
            Vec::new()
        }
    }

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok("{}".to_string())
        }
    }

    struct IdentityTranslator;

    #[async_trait]
    impl Translator for IdentityTranslator {
        async fn translate(&self, text: &str, _target_lang: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    struct NoopSynthesizer;

    #[async_trait]
    impl SpeechSynthesizer for NoopSynthesizer {
        async fn synthesize(&self, _text: &str, _lang: &str, output_path: &FsPath) -> Result<()> {
            if let Some(parent) = output_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(output_path, b"mp3").await?;
            Ok(())
        }
    }

    fn test_state(audio_dir: &FsPath, registry: CompanyRegistry) -> Arc<AppState> {
        let model: Arc<dyn LanguageModel> = Arc::new(EchoModel);
        let store: Arc<dyn AnalysisStore> = Arc::new(MemoryStore::new(audio_dir));
        let orchestrator = Orchestrator::new(
            Arc::new(EmptySource),
            ArticleAnalyzer::new(model.clone(), Arc::new(NoPacing)),
            AggregateAnalyzer::new(model),
            Localizer::new(
                Arc::new(IdentityTranslator),
                Arc::new(NoopSynthesizer),
                audio_dir,
                "hi",
            ),
            store,
            Arc::new(registry),
        );
        Arc::new(AppState {
            orchestrator: Arc::new(orchestrator),
        })
    }

    #[tokio::test]
    async fn test_get_sentiment_unknown_company_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), CompanyRegistry::empty());

        let response = get_sentiment(
            State(state),
            Path("Nobody".to_string()),
            Query(SentimentParams::default()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_sentiment_uncached_company_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            CompanyRegistry::from_reader("name,ticker\nAcme Corp,ACME\n".as_bytes()).unwrap();
        let state = test_state(dir.path(), registry);

        let response = get_sentiment(
            State(state),
            Path("Acme Corp".to_string()),
            Query(SentimentParams::default()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_analyze_then_get_sentiment_and_audio() {
        let dir = tempfile::tempdir().unwrap();
        let registry =
            CompanyRegistry::from_reader("name,ticker\nAcme Corp,ACME\n".as_bytes()).unwrap();
        let state = test_state(dir.path(), registry);

        let response = analyze_company(State(state.clone()), Path("Acme Corp".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let response = get_sentiment(
            State(state.clone()),
            Path("Acme Corp".to_string()),
            Query(SentimentParams::default()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        // Empty-source run produces a record whose verdict still
        // localizes, so audio becomes available on demand.
        let response = get_audio(State(state), Path("Acme Corp".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "audio/mpeg"
        );
    }
}
