use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const TRANSCRIPT_EXTENSION: &str = "lab";
pub const CORPUS_AUDIO_EXTENSION: &str = "wav";
pub const ALIGNMENT_RESULT_EXTENSION: &str = "TextGrid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDetails {
    pub phonetic_accuracy: u8,
    pub rhythm_accuracy: u8,
    pub stress_accuracy: u8,
}

impl ScoreDetails {
    pub const ZERO: ScoreDetails = ScoreDetails {
        phonetic_accuracy: 0,
        rhythm_accuracy: 0,
        stress_accuracy: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u8,
    pub feedback: String,
    pub details: ScoreDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoreReport {
    /// Zero-score report carrying the failure description.
    pub fn failed(error: &DomainError) -> Self {
        let cause = error.to_string();
        Self {
            score: 0,
            feedback: format!("Error analyzing pronunciation: {cause}"),
            details: ScoreDetails::ZERO,
            error: Some(cause),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// One audio/transcript pair staged for the aligner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub base_name: String,
    pub audio_path: PathBuf,
    pub text_path: PathBuf,
}

impl CorpusEntry {
    /// Path the aligner writes this entry's result to.
    pub fn alignment_result_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{ALIGNMENT_RESULT_EXTENSION}", self.base_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentJob {
    pub corpus_dir: PathBuf,
    pub dictionary_path: PathBuf,
    pub acoustic_model: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Provisioning,
    CorpusBuild,
    Aligning,
    LocatingOutput,
    Scoring,
    Done,
}

impl AnalysisStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStage::Provisioning => "provisioning",
            AnalysisStage::CorpusBuild => "corpus_build",
            AnalysisStage::Aligning => "aligning",
            AnalysisStage::LocatingOutput => "locating_output",
            AnalysisStage::Scoring => "scoring",
            AnalysisStage::Done => "done",
        }
    }
}

impl fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
