use std::path::PathBuf;
use async_trait::async_trait;
use crate::types::CompanyAnalysis;
use crate::Result;

/// Persistence for company analysis records, keyed by the normalized
/// company name (see [`crate::cache_key`]). The store is the unit of
/// idempotence across pipeline re-runs: `save` overwrites wholesale.
///
/// Concurrent saves for *different* companies are safe (distinct keys);
/// concurrent re-runs of the *same* company must be serialized by the
/// caller.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Load the cached record for a company, if any.
    async fn load(&self, company_name: &str) -> Result<Option<CompanyAnalysis>>;

    /// Persist a record, replacing any previous one for the same key.
    /// A reader must never observe a half-written record.
    async fn save(&self, company_name: &str, analysis: &CompanyAnalysis) -> Result<()>;

    /// Keys of all stored records.
    async fn list(&self) -> Result<Vec<String>>;

    /// Directory where audio artifacts live.
    fn audio_dir(&self) -> PathBuf;
}
