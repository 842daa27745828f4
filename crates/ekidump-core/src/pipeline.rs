use std::path::Path;

use tracing::info;

use crate::config::ExtractConfig;
use crate::document::Document;
use crate::error::Result;
use crate::fetch::{ArchiveReader, fetch_documents};
use crate::index::IndexDirectory;
use crate::selection::TitleSelector;
use crate::stations::{Station, StationExtractor};

/// Index scan followed by selective block decoding, driven by one config.
#[derive(Debug, Clone)]
pub struct Extraction {
    config: ExtractConfig,
}

impl Extraction {
    pub fn new(config: ExtractConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    pub fn build_directory(&self, index_path: &Path) -> Result<IndexDirectory> {
        self.build_directory_with(index_path, &self.config.selector())
    }

    /// Like [`Self::build_directory`], but with an explicit selector in place
    /// of the configured title prefix.
    pub fn build_directory_with(
        &self,
        index_path: &Path,
        selector: &TitleSelector,
    ) -> Result<IndexDirectory> {
        IndexDirectory::load(index_path, selector)
    }

    pub fn fetch(&self, dump_path: &Path, directory: &IndexDirectory) -> Result<Vec<Document>> {
        let archive = ArchiveReader::open(dump_path)?;
        let documents = fetch_documents(&archive, directory, self.config.workers)?;
        info!(
            blocks = directory.block_count(),
            documents = documents.len(),
            archive_bytes = archive.len(),
            "extracted matching pages"
        );
        Ok(documents)
    }

    /// Matching pages of the dump, in unspecified order.
    pub fn run(&self, dump_path: &Path, index_path: &Path) -> Result<Vec<Document>> {
        self.run_with(dump_path, index_path, &self.config.selector())
    }

    pub fn run_with(
        &self,
        dump_path: &Path,
        index_path: &Path,
        selector: &TitleSelector,
    ) -> Result<Vec<Document>> {
        let directory = self.build_directory_with(index_path, selector)?;
        self.fetch(dump_path, &directory)
    }

    /// Full tool output: deduplicated stations sorted by English name.
    pub fn stations(&self, dump_path: &Path, index_path: &Path) -> Result<Vec<Station>> {
        let documents = self.run(dump_path, index_path)?;
        let stations = StationExtractor::new()?.stations(&documents);
        info!(stations = stations.len(), "collected stations");
        Ok(stations)
    }
}
