use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use pronunciation_application::{
    AnalysisSettings, AnalyzePronunciationRequest, AnalyzePronunciationUseCase,
    AnalyzePronunciationUseCaseImpl, ApplicationError, HealthUseCase, HealthUseCaseImpl,
};
use pronunciation_domain::{
    Aligner, AlignerVersion, AlignmentInspector, AlignmentJob, CorpusBuilder, CorpusEntry,
    DictionaryProvisioner, DomainError, ScoreDetails, FEEDBACK_FAIR, FEEDBACK_GOOD,
};
use tempfile::TempDir;

struct StaticProvisioner {
    result: Result<PathBuf, DomainError>,
}

#[async_trait]
impl DictionaryProvisioner for StaticProvisioner {
    async fn ensure_dictionary(&self) -> Result<PathBuf, DomainError> {
        self.result.clone()
    }
}

struct FixedNameCorpusBuilder {
    fail: bool,
    seen_dirs: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl CorpusBuilder for FixedNameCorpusBuilder {
    async fn build_corpus(
        &self,
        audio_path: &Path,
        text: &str,
        corpus_dir: &Path,
    ) -> Result<CorpusEntry, DomainError> {
        self.seen_dirs
            .lock()
            .expect("lock seen dirs")
            .push(corpus_dir.to_path_buf());
        if self.fail {
            return Err(DomainError::Io {
                message: "corpus directory is read-only".to_string(),
            });
        }

        let audio = corpus_dir.join("recording_fixed.wav");
        let lab = corpus_dir.join("recording_fixed.lab");
        fs::copy(audio_path, &audio).map_err(|err| DomainError::io("copy audio", &err))?;
        fs::write(&lab, text).map_err(|err| DomainError::io("write lab", &err))?;
        Ok(CorpusEntry {
            base_name: "recording_fixed".to_string(),
            audio_path: audio,
            text_path: lab,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum AlignerBehaviour {
    WriteResult,
    SucceedWithoutOutput,
    Fail,
}

struct ScriptedAligner {
    behaviour: AlignerBehaviour,
    calls: AtomicUsize,
}

#[async_trait]
impl Aligner for ScriptedAligner {
    async fn run_alignment(&self, job: &AlignmentJob) -> Result<PathBuf, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(job.acoustic_model, "german_mfa");
        assert!(job.corpus_dir.join("recording_fixed.lab").is_file());

        match self.behaviour {
            AlignerBehaviour::WriteResult => {
                fs::write(job.output_dir.join("recording_fixed.TextGrid"), "intervals")
                    .expect("write TextGrid");
                Ok(job.output_dir.clone())
            }
            AlignerBehaviour::SucceedWithoutOutput => Ok(job.output_dir.clone()),
            AlignerBehaviour::Fail => Err(DomainError::alignment(
                "mfa exited with exit status: 1: could not decode audio",
            )),
        }
    }
}

struct StaticInspector {
    result: Result<String, DomainError>,
}

#[async_trait]
impl AlignmentInspector for StaticInspector {
    async fn count_labels(&self, result_path: &Path) -> Result<String, DomainError> {
        assert!(result_path.is_file());
        self.result.clone()
    }
}

struct Harness {
    _workspace: TempDir,
    scratch_root: PathBuf,
    audio_path: PathBuf,
    aligner: Arc<ScriptedAligner>,
    corpus_builder: Arc<FixedNameCorpusBuilder>,
    usecase: AnalyzePronunciationUseCaseImpl,
}

struct HarnessOptions {
    provisioner: Result<PathBuf, DomainError>,
    corpus_fails: bool,
    aligner: AlignerBehaviour,
    inspection: Result<String, DomainError>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            provisioner: Ok(PathBuf::from("/dictionaries/german_mfa.dict")),
            corpus_fails: false,
            aligner: AlignerBehaviour::WriteResult,
            inspection: Ok("phone phone phone\nword word\n".to_string()),
        }
    }
}

fn harness(options: HarnessOptions) -> Harness {
    let workspace = tempfile::tempdir().expect("workspace tempdir");
    let scratch_root = workspace.path().join("temp");
    fs::create_dir_all(&scratch_root).expect("create scratch root");
    let audio_path = workspace.path().join("upload.wav");
    fs::write(&audio_path, b"RIFF....WAVE").expect("write audio");

    let aligner = Arc::new(ScriptedAligner {
        behaviour: options.aligner,
        calls: AtomicUsize::new(0),
    });
    let corpus_builder = Arc::new(FixedNameCorpusBuilder {
        fail: options.corpus_fails,
        seen_dirs: Mutex::new(Vec::new()),
    });
    let usecase = AnalyzePronunciationUseCaseImpl::new(
        Arc::new(StaticProvisioner {
            result: options.provisioner,
        }),
        corpus_builder.clone(),
        aligner.clone(),
        Arc::new(StaticInspector {
            result: options.inspection,
        }),
        AnalysisSettings {
            scratch_root: scratch_root.clone(),
            acoustic_model: "german_mfa".to_string(),
        },
    );

    Harness {
        _workspace: workspace,
        scratch_root,
        audio_path,
        aligner,
        corpus_builder,
        usecase,
    }
}

impl Harness {
    fn request(&self) -> AnalyzePronunciationRequest {
        AnalyzePronunciationRequest {
            audio_path: self.audio_path.clone(),
            expected_text: "Guten Morgen".to_string(),
        }
    }

    fn scratch_entries(&self) -> usize {
        fs::read_dir(&self.scratch_root)
            .expect("read scratch root")
            .count()
    }
}

#[tokio::test]
async fn successful_alignment_is_scored_from_inspection_counts() {
    let harness = harness(HarnessOptions::default());

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 74);
    assert_eq!(report.feedback, FEEDBACK_GOOD);
    assert_eq!(
        report.details,
        ScoreDetails {
            phonetic_accuracy: 75,
            rhythm_accuracy: 75,
            stress_accuracy: 70,
        }
    );
    assert!(report.error.is_none());
    assert_eq!(harness.aligner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn inspection_without_labels_scores_fair() {
    let harness = harness(HarnessOptions {
        inspection: Ok(String::new()),
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 61);
    assert_eq!(report.feedback, FEEDBACK_FAIR);
}

#[tokio::test]
async fn provisioning_failure_yields_zero_report_without_alignment() {
    let harness = harness(HarnessOptions {
        provisioner: Err(DomainError::resource_fetch(
            "dictionary",
            "HTTP status 404 Not Found",
        )),
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    assert_eq!(report.details, ScoreDetails::ZERO);
    let error = report.error.expect("error is reported");
    assert!(error.contains("404"));
    assert!(report.feedback.starts_with("Error analyzing pronunciation: "));
    assert_eq!(harness.aligner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn corpus_failure_yields_zero_report_and_cleans_scratch() {
    let harness = harness(HarnessOptions {
        corpus_fails: true,
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    assert!(report
        .error
        .as_deref()
        .is_some_and(|error| error.contains("read-only")));
    assert_eq!(harness.aligner.calls.load(Ordering::SeqCst), 0);

    let seen = harness.corpus_builder.seen_dirs.lock().expect("lock").clone();
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].exists());
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn aligner_failure_yields_zero_report() {
    let harness = harness(HarnessOptions {
        aligner: AlignerBehaviour::Fail,
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    let error = report.error.expect("error is reported");
    assert!(error.starts_with("MFA alignment failed"));
    assert!(error.contains("could not decode audio"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn missing_result_file_yields_zero_report_naming_the_file() {
    let harness = harness(HarnessOptions {
        aligner: AlignerBehaviour::SucceedWithoutOutput,
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    let error = report.error.expect("error is reported");
    assert!(error.contains("recording_fixed.TextGrid"));
    assert!(error.contains("not found"));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn inspection_failure_yields_zero_report() {
    let harness = harness(HarnessOptions {
        inspection: Err(DomainError::inspection("inspect_textgrid exited with 2")),
        ..HarnessOptions::default()
    });

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    assert_eq!(report.details, ScoreDetails::ZERO);
    assert!(report
        .error
        .as_deref()
        .is_some_and(|error| error.contains("inspect_textgrid exited with 2")));
    assert_eq!(harness.scratch_entries(), 0);
}

#[tokio::test]
async fn missing_scratch_root_yields_zero_report() {
    let harness = harness(HarnessOptions::default());
    fs::remove_dir_all(&harness.scratch_root).expect("remove scratch root");

    let report = harness
        .usecase
        .analyze(harness.request())
        .await
        .expect("analysis returns a report");

    assert_eq!(report.score, 0);
    assert!(report
        .error
        .as_deref()
        .is_some_and(|error| error.contains("failed to create scratch directory")));
    assert_eq!(harness.aligner.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_expected_text_is_a_validation_error() {
    let harness = harness(HarnessOptions::default());
    let mut request = harness.request();
    request.expected_text = String::new();

    let error = harness
        .usecase
        .analyze(request)
        .await
        .expect_err("empty text is rejected");

    assert!(matches!(error, ApplicationError::Validation(_)));
    assert_eq!(harness.aligner.calls.load(Ordering::SeqCst), 0);
}

struct StaticVersion {
    result: Result<String, DomainError>,
}

#[async_trait]
impl AlignerVersion for StaticVersion {
    async fn version(&self) -> Result<String, DomainError> {
        self.result.clone()
    }
}

#[tokio::test]
async fn health_reports_trimmed_aligner_version() {
    let usecase = HealthUseCaseImpl::new(Arc::new(StaticVersion {
        result: Ok("3.1.0\n".to_string()),
    }));

    let health = usecase.health().await;

    assert_eq!(health.status, "ok");
    assert_eq!(health.message, "MFA API is running");
    assert_eq!(health.mfa_version, "3.1.0");
}

#[tokio::test]
async fn health_survives_missing_aligner() {
    let usecase = HealthUseCaseImpl::new(Arc::new(StaticVersion {
        result: Err(DomainError::internal_error("mfa not found")),
    }));

    let health = usecase.health().await;

    assert_eq!(health.status, "ok");
    assert!(health.mfa_version.is_empty());
}
