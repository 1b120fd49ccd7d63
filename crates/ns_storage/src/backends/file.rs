use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tracing::{debug, warn};
use ns_core::{cache_key, AnalysisStore, CompanyAnalysis, Result};

const RECORD_SUFFIX: &str = ".json";
const MIRROR_SUFFIX: &str = ".pretty.json";

/// File-backed analysis store. One compact record per company under
/// `<data_dir>/output/<key>.json`, plus a pretty-printed mirror for
/// inspection, plus `<data_dir>/audio/` for speech artifacts.
///
/// Writes go to a temp file in the same directory and are renamed into
/// place, so a concurrent reader sees either the old or the new record.
pub struct FileStore {
    output_dir: PathBuf,
    audio_dir: PathBuf,
}

impl FileStore {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let store = Self {
            output_dir: data_dir.join("output"),
            audio_dir: data_dir.join("audio"),
        };
        tokio::fs::create_dir_all(&store.output_dir).await?;
        tokio::fs::create_dir_all(&store.audio_dir).await?;
        Ok(store)
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", key, RECORD_SUFFIX))
    }

    fn mirror_path(&self, key: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", key, MIRROR_SUFFIX))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait]
impl AnalysisStore for FileStore {
    async fn load(&self, company_name: &str) -> Result<Option<CompanyAnalysis>> {
        let path = self.record_path(&cache_key(company_name));
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut analysis: CompanyAnalysis = serde_json::from_str(&contents)?;

        // A recorded audio path is only as good as the file behind it.
        if let Some(audio_path) = &analysis.audio_path {
            if !Path::new(audio_path).exists() {
                warn!("Dropping stale audio path for {}: {}", company_name, audio_path);
                analysis.audio_path = None;
            }
        }

        Ok(Some(analysis))
    }

    async fn save(&self, company_name: &str, analysis: &CompanyAnalysis) -> Result<()> {
        let key = cache_key(company_name);

        let record = serde_json::to_vec(analysis)?;
        self.write_atomic(&self.record_path(&key), &record).await?;

        let mirror = serde_json::to_vec_pretty(analysis)?;
        self.write_atomic(&self.mirror_path(&key), &mirror).await?;

        debug!("Saved analysis for {} under key {}", company_name, key);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(MIRROR_SUFFIX) || !name.ends_with(RECORD_SUFFIX) {
                continue;
            }
            keys.push(name.trim_end_matches(RECORD_SUFFIX).to_string());
        }
        keys.sort();
        Ok(keys)
    }

    fn audio_dir(&self) -> PathBuf {
        self.audio_dir.clone()
    }
}
