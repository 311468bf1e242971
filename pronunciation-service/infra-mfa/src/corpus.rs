use std::path::Path;

use async_trait::async_trait;
use pronunciation_domain::{
    CorpusBuilder, CorpusEntry, DomainError, CORPUS_AUDIO_EXTENSION, TRANSCRIPT_EXTENSION,
};
use uuid::Uuid;

/// Stages an audio/transcript pair on the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct FsCorpusBuilder;

impl FsCorpusBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CorpusBuilder for FsCorpusBuilder {
    async fn build_corpus(
        &self,
        audio_path: &Path,
        text: &str,
        corpus_dir: &Path,
    ) -> Result<CorpusEntry, DomainError> {
        let base_name = format!("recording_{}", Uuid::new_v4().simple());
        let staged_audio = corpus_dir.join(format!("{base_name}.{CORPUS_AUDIO_EXTENSION}"));
        let text_path = corpus_dir.join(format!("{base_name}.{TRANSCRIPT_EXTENSION}"));

        tokio::fs::copy(audio_path, &staged_audio)
            .await
            .map_err(|err| {
                DomainError::io(
                    &format!("failed to copy audio {}", audio_path.display()),
                    &err,
                )
            })?;
        tokio::fs::write(&text_path, text.as_bytes())
            .await
            .map_err(|err| {
                DomainError::io(
                    &format!("failed to write transcript {}", text_path.display()),
                    &err,
                )
            })?;

        Ok(CorpusEntry {
            base_name,
            audio_path: staged_audio,
            text_path,
        })
    }
}
