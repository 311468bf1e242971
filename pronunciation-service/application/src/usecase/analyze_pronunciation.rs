use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tempfile::TempDir;
use validator::Validate;

use pronunciation_domain::{
    score_inspection_output, Aligner, AlignmentInspector, AlignmentJob, AnalysisStage,
    CorpusBuilder, DictionaryProvisioner, DomainError, ScoreReport,
};

use crate::{AnalyzePronunciationRequest, ApplicationError};

const CORPUS_DIR_PREFIX: &str = "mfa_corpus_";
const OUTPUT_DIR_PREFIX: &str = "mfa_output_";

#[async_trait]
pub trait AnalyzePronunciationUseCase: Send + Sync {
    /// Scores one recording.
    ///
    /// Pipeline failures come back as a zero-score [`ScoreReport`]; only a
    /// request that fails validation produces an `Err`.
    async fn analyze(
        &self,
        request: AnalyzePronunciationRequest,
    ) -> Result<ScoreReport, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub scratch_root: PathBuf,
    pub acoustic_model: String,
}

pub struct AnalyzePronunciationUseCaseImpl {
    provisioner: Arc<dyn DictionaryProvisioner>,
    corpus_builder: Arc<dyn CorpusBuilder>,
    aligner: Arc<dyn Aligner>,
    inspector: Arc<dyn AlignmentInspector>,
    settings: AnalysisSettings,
}

impl AnalyzePronunciationUseCaseImpl {
    pub fn new(
        provisioner: Arc<dyn DictionaryProvisioner>,
        corpus_builder: Arc<dyn CorpusBuilder>,
        aligner: Arc<dyn Aligner>,
        inspector: Arc<dyn AlignmentInspector>,
        settings: AnalysisSettings,
    ) -> Self {
        Self {
            provisioner,
            corpus_builder,
            aligner,
            inspector,
            settings,
        }
    }

    async fn run_pipeline(
        &self,
        request: &AnalyzePronunciationRequest,
        stage: &mut AnalysisStage,
    ) -> Result<ScoreReport, DomainError> {
        *stage = AnalysisStage::Provisioning;
        let dictionary_path = self.provisioner.ensure_dictionary().await?;

        *stage = AnalysisStage::CorpusBuild;
        let corpus_dir = scratch_dir(&self.settings, CORPUS_DIR_PREFIX)?;
        let output_dir = match scratch_dir(&self.settings, OUTPUT_DIR_PREFIX) {
            Ok(dir) => dir,
            Err(err) => {
                remove_scratch_dir(corpus_dir);
                return Err(err);
            }
        };

        let result = self
            .run_in_scratch(request, dictionary_path, &corpus_dir, &output_dir, stage)
            .await;

        remove_scratch_dir(corpus_dir);
        remove_scratch_dir(output_dir);
        result
    }

    async fn run_in_scratch(
        &self,
        request: &AnalyzePronunciationRequest,
        dictionary_path: PathBuf,
        corpus_dir: &TempDir,
        output_dir: &TempDir,
        stage: &mut AnalysisStage,
    ) -> Result<ScoreReport, DomainError> {
        let entry = self
            .corpus_builder
            .build_corpus(&request.audio_path, &request.expected_text, corpus_dir.path())
            .await?;
        tracing::debug!(
            base_name = %entry.base_name,
            corpus_dir = %corpus_dir.path().display(),
            "corpus prepared"
        );

        *stage = AnalysisStage::Aligning;
        let job = AlignmentJob {
            corpus_dir: corpus_dir.path().to_path_buf(),
            dictionary_path,
            acoustic_model: self.settings.acoustic_model.clone(),
            output_dir: output_dir.path().to_path_buf(),
        };
        let aligned_dir = self.aligner.run_alignment(&job).await?;

        *stage = AnalysisStage::LocatingOutput;
        let result_path = entry.alignment_result_path(&aligned_dir);
        if !result_path.is_file() {
            return Err(DomainError::alignment_output_missing(&result_path));
        }

        *stage = AnalysisStage::Scoring;
        let inspection = self.inspector.count_labels(&result_path).await?;
        let report = score_inspection_output(&inspection);

        *stage = AnalysisStage::Done;
        Ok(report)
    }
}

#[async_trait]
impl AnalyzePronunciationUseCase for AnalyzePronunciationUseCaseImpl {
    async fn analyze(
        &self,
        request: AnalyzePronunciationRequest,
    ) -> Result<ScoreReport, ApplicationError> {
        request
            .validate()
            .map_err(|err| ApplicationError::Validation(err.to_string()))?;

        tracing::debug!(
            audio_path = %request.audio_path.display(),
            expected_text_len = request.expected_text.len(),
            "starting pronunciation analysis"
        );

        let mut stage = AnalysisStage::Provisioning;
        let report = match self.run_pipeline(&request, &mut stage).await {
            Ok(report) => {
                tracing::debug!(
                    score = report.score,
                    phonetic_accuracy = report.details.phonetic_accuracy,
                    rhythm_accuracy = report.details.rhythm_accuracy,
                    stress_accuracy = report.details.stress_accuracy,
                    "pronunciation analysis completed"
                );
                report
            }
            Err(err) => {
                tracing::error!(
                    stage = %stage,
                    error_code = err.code(),
                    error = %err,
                    "pronunciation analysis failed"
                );
                ScoreReport::failed(&err)
            }
        };

        Ok(report)
    }
}

fn scratch_dir(settings: &AnalysisSettings, prefix: &str) -> Result<TempDir, DomainError> {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(&settings.scratch_root)
        .map_err(|err| {
            DomainError::io(
                &format!(
                    "failed to create scratch directory in {}",
                    settings.scratch_root.display()
                ),
                &err,
            )
        })
}

fn remove_scratch_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(err) = dir.close() {
        tracing::warn!(
            path = %path.display(),
            error = %err,
            "error cleaning up scratch directory"
        );
    }
}
