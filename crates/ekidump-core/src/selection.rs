use std::collections::HashSet;

pub const DEFAULT_TITLE_PREFIX: &str = "List of railway stations in Japan: ";

/// Predicate over the raw title bytes of an index line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSelector {
    Prefix(Vec<u8>),
    Exact(HashSet<Vec<u8>>),
}

impl TitleSelector {
    #[must_use]
    pub fn prefix(prefix: impl AsRef<[u8]>) -> Self {
        Self::Prefix(prefix.as_ref().to_vec())
    }

    #[must_use]
    pub fn exact<I, T>(titles: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self::Exact(
            titles
                .into_iter()
                .map(|title| title.as_ref().to_vec())
                .collect(),
        )
    }

    #[must_use]
    pub fn matches(&self, title: &[u8]) -> bool {
        match self {
            Self::Prefix(prefix) => title.starts_with(prefix),
            Self::Exact(titles) => titles.contains(title),
        }
    }
}

impl Default for TitleSelector {
    fn default() -> Self {
        Self::prefix(DEFAULT_TITLE_PREFIX)
    }
}
