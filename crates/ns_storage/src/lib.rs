pub mod backends;

pub use backends::file::FileStore;
pub use backends::memory::MemoryStore;

pub mod prelude {
    pub use super::{FileStore, MemoryStore};
    pub use ns_core::{cache_key, AnalysisStore, CompanyAnalysis, Result};
}
