use std::collections::HashMap;
use std::path::PathBuf;
use async_trait::async_trait;
use tokio::sync::RwLock;
use ns_core::{cache_key, AnalysisStore, CompanyAnalysis, Result};

/// In-memory store for tests and ephemeral runs. Keyed exactly like the
/// file backend.
pub struct MemoryStore {
    records: RwLock<HashMap<String, CompanyAnalysis>>,
    audio_dir: PathBuf,
}

impl MemoryStore {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            audio_dir: audio_dir.into(),
        }
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn load(&self, company_name: &str) -> Result<Option<CompanyAnalysis>> {
        let records = self.records.read().await;
        Ok(records.get(&cache_key(company_name)).cloned())
    }

    async fn save(&self, company_name: &str, analysis: &CompanyAnalysis) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(cache_key(company_name), analysis.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let records = self.records.read().await;
        let mut keys: Vec<String> = records.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn audio_dir(&self) -> PathBuf {
        self.audio_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ns_core::ComparativeAnalysis;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new("/tmp/ns_audio");
        let analysis = CompanyAnalysis {
            company: "Acme Corp".to_string(),
            ticker: None,
            articles: vec![],
            comparative: ComparativeAnalysis::empty(),
            overall_sentiment: "Unknown".to_string(),
            final_verdict: "No articles found for analysis.".to_string(),
            translated_verdict: None,
            audio_path: None,
            timestamp: "2025-01-01T00:00:00Z".to_string(),
        };

        store.save("Acme Corp", &analysis).await.unwrap();
        let loaded = store.load("acme corp").await.unwrap().unwrap();
        assert_eq!(loaded.company, "Acme Corp");
        assert_eq!(store.list().await.unwrap(), vec!["acme_corp".to_string()]);
    }
}
