use crate::error::{EkiError, Result};
use crate::selection::{DEFAULT_TITLE_PREFIX, TitleSelector};

mod env;

pub const WORKERS_ENV: &str = "EKIDUMP_WORKERS";
pub const TITLE_PREFIX_ENV: &str = "EKIDUMP_TITLE_PREFIX";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Block workers; `None` uses the global rayon pool, `Some(1)` runs sequentially.
    pub workers: Option<usize>,
    pub title_prefix: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            workers: None,
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
        }
    }
}

impl ExtractConfig {
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            env::read_non_empty_env(WORKERS_ENV).as_deref(),
            env::read_raw_env(TITLE_PREFIX_ENV),
        )
    }

    pub fn resolve(workers: Option<&str>, title_prefix: Option<String>) -> Result<Self> {
        Ok(Self {
            workers: workers.map(parse_workers).transpose()?,
            title_prefix: title_prefix.unwrap_or_else(|| DEFAULT_TITLE_PREFIX.to_string()),
        })
    }

    #[must_use]
    pub fn with_workers(mut self, workers: Option<usize>) -> Self {
        if workers.is_some() {
            self.workers = workers;
        }
        self
    }

    #[must_use]
    pub fn with_title_prefix(mut self, title_prefix: Option<String>) -> Self {
        if let Some(prefix) = title_prefix {
            self.title_prefix = prefix;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(EkiError::Validation(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn selector(&self) -> TitleSelector {
        TitleSelector::prefix(&self.title_prefix)
    }
}

fn parse_workers(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(workers) if workers > 0 => Ok(workers),
        _ => Err(EkiError::Validation(format!(
            "{WORKERS_ENV} must be a positive integer, got {raw:?}"
        ))),
    }
}
