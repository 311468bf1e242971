use std::path::PathBuf;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
};
use pronunciation_application::{
    AnalyzePronunciationRequest, AnalyzePronunciationResponse, ApplicationError,
};
use tempfile::TempDir;
use uuid::Uuid;

use crate::{AppState, HttpError};

const AUDIO_FIELD: &str = "audio";
const EXPECTED_TEXT_FIELD: &str = "expected_text";
const UPLOAD_DIR_PREFIX: &str = "upload_";

struct UploadedAudio {
    file_name: String,
    bytes: axum::body::Bytes,
}

#[derive(Default)]
struct AnalyzeForm {
    audio: Option<UploadedAudio>,
    expected_text: Option<String>,
}

impl AnalyzeForm {
    async fn read(mut multipart: Multipart) -> Result<Self, HttpError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                // repeated fields keep their first value
                Some(AUDIO_FIELD) if form.audio.is_none() => {
                    // a plain form value named `audio` is not a file upload
                    let Some(file_name) = field.file_name().map(str::to_string) else {
                        continue;
                    };
                    let bytes = field.bytes().await?;
                    form.audio = Some(UploadedAudio { file_name, bytes });
                }
                Some(EXPECTED_TEXT_FIELD) if form.expected_text.is_none() => {
                    form.expected_text = Some(field.text().await?);
                }
                _ => {}
            }
        }
        Ok(form)
    }

    fn validate(self) -> Result<(UploadedAudio, String), HttpError> {
        let audio = self
            .audio
            .ok_or_else(|| HttpError::bad_request("No audio file provided"))?;
        if audio.file_name.is_empty() {
            return Err(HttpError::bad_request("No selected file"));
        }
        let expected_text = self
            .expected_text
            .filter(|text| !text.is_empty())
            .ok_or_else(|| HttpError::bad_request("No expected text provided"))?;
        Ok((audio, expected_text))
    }
}

pub async fn analyze_pronunciation(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<AnalyzePronunciationResponse>), HttpError> {
    let (audio, expected_text) = AnalyzeForm::read(multipart?).await?.validate()?;

    tracing::info!(
        file_name = %audio.file_name,
        audio_bytes = audio.bytes.len(),
        expected_text_len = expected_text.len(),
        "received pronunciation analysis request"
    );

    let upload_dir = tempfile::Builder::new()
        .prefix(UPLOAD_DIR_PREFIX)
        .tempdir_in(&state.upload_dir)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to create upload directory");
            HttpError::internal(err.to_string())
        })?;

    let result = analyze_upload(&state, &upload_dir, audio, expected_text).await;
    remove_upload_dir(upload_dir);

    match result {
        Ok(report) => {
            tracing::info!(
                score = report.score,
                failed = report.is_failure(),
                "pronunciation analysis request completed"
            );
            Ok((StatusCode::OK, Json(report)))
        }
        Err(error) => {
            tracing::error!(error = %error, "pronunciation analysis request failed");
            Err(error)
        }
    }
}

async fn analyze_upload(
    state: &AppState,
    upload_dir: &TempDir,
    audio: UploadedAudio,
    expected_text: String,
) -> Result<AnalyzePronunciationResponse, HttpError> {
    let audio_path: PathBuf = upload_dir.path().join(format!("{}.wav", Uuid::new_v4()));
    tokio::fs::write(&audio_path, &audio.bytes)
        .await
        .map_err(|err| HttpError::internal(format!("failed to store upload: {err}")))?;

    state
        .analyze
        .analyze(AnalyzePronunciationRequest {
            audio_path,
            expected_text,
        })
        .await
        .map_err(|err| match err {
            ApplicationError::Validation(message) => HttpError::bad_request(&message),
            other => HttpError::internal(other.to_string()),
        })
}

fn remove_upload_dir(dir: TempDir) {
    let path = dir.path().to_path_buf();
    if let Err(err) = dir.close() {
        tracing::warn!(
            path = %path.display(),
            error = %err,
            "error cleaning up upload directory"
        );
    }
}
