use std::path::PathBuf;

use serde::Deserialize;
use validator::Validate;

pub use pronunciation_domain::{ScoreDetails, ScoreReport};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzePronunciationRequest {
    /// Uploaded recording, already persisted by the caller.
    pub audio_path: PathBuf,
    #[validate(length(min = 1))]
    pub expected_text: String,
}

pub type AnalyzePronunciationResponse = ScoreReport;
