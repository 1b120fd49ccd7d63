use std::io::Read;
use std::path::Path;
use serde::Deserialize;
use tracing::warn;
use ns_core::{cache_key, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyEntry {
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
}

/// The configured set of companies, read from a `name,ticker` CSV file.
/// Lookups use the same normalization as the analysis cache, so any
/// spelling that resolves to the same key matches.
#[derive(Debug, Clone, Default)]
pub struct CompanyRegistry {
    entries: Vec<CompanyEntry>,
}

impl CompanyRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::File::open(path) {
            Ok(file) => Self::from_reader(file),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Company list not found at {}, starting empty", path.display());
                Ok(Self::empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();
        for record in csv_reader.deserialize() {
            let entry: CompanyEntry =
                record.map_err(|e| ns_core::Error::Storage(format!("Invalid company list: {}", e)))?;
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CompanyEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    pub fn contains(&self, company_name: &str) -> bool {
        let key = cache_key(company_name);
        self.entries.iter().any(|e| cache_key(&e.name) == key)
    }

    pub fn ticker_for(&self, company_name: &str) -> Option<String> {
        let key = cache_key(company_name);
        self.entries
            .iter()
            .find(|e| cache_key(&e.name) == key)
            .and_then(|e| e.ticker.clone())
    }
}
