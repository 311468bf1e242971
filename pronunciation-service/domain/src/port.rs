use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{AlignmentJob, CorpusEntry, DomainError};

#[async_trait]
pub trait DictionaryProvisioner: Send + Sync {
    /// Makes sure the pronunciation dictionary is on disk and returns its path.
    async fn ensure_dictionary(&self) -> Result<PathBuf, DomainError>;
}

#[async_trait]
pub trait CorpusBuilder: Send + Sync {
    async fn build_corpus(
        &self,
        audio_path: &Path,
        text: &str,
        corpus_dir: &Path,
    ) -> Result<CorpusEntry, DomainError>;
}

#[async_trait]
pub trait Aligner: Send + Sync {
    /// Runs the aligner over `job.corpus_dir`; returns the output directory.
    async fn run_alignment(&self, job: &AlignmentJob) -> Result<PathBuf, DomainError>;
}

#[async_trait]
pub trait AlignmentInspector: Send + Sync {
    /// Returns the inspection tool's label-count report for a result file.
    async fn count_labels(&self, result_path: &Path) -> Result<String, DomainError>;
}

#[async_trait]
pub trait AlignerVersion: Send + Sync {
    async fn version(&self) -> Result<String, DomainError>;
}
