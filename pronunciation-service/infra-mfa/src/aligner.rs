use std::{ffi::OsString, path::PathBuf, time::Duration};

use async_trait::async_trait;
use pronunciation_domain::{Aligner, AlignmentJob, DomainError};

use crate::process::MfaCommand;

#[derive(Debug, Clone)]
pub struct MfaAlignerConfig {
    pub command: MfaCommand,
    pub timeout: Duration,
}

/// Runs `mfa align` over a prepared corpus directory.
pub struct MfaAligner {
    config: MfaAlignerConfig,
}

impl MfaAligner {
    pub fn new(config: MfaAlignerConfig) -> Self {
        Self { config }
    }

    fn align_args(job: &AlignmentJob) -> Vec<OsString> {
        vec![
            "align".into(),
            job.corpus_dir.clone().into_os_string(),
            job.dictionary_path.clone().into_os_string(),
            job.acoustic_model.clone().into(),
            job.output_dir.clone().into_os_string(),
            "--clean".into(),
            "--overwrite".into(),
            "--verbose".into(),
        ]
    }
}

#[async_trait]
impl Aligner for MfaAligner {
    async fn run_alignment(&self, job: &AlignmentJob) -> Result<PathBuf, DomainError> {
        tracing::info!(
            corpus_dir = %job.corpus_dir.display(),
            acoustic_model = %job.acoustic_model,
            "running forced alignment"
        );

        let output = self
            .config
            .command
            .run(Self::align_args(job), self.config.timeout)
            .await
            .map_err(|err| DomainError::alignment(&err.to_string()))?;

        if !output.status.success() {
            let diagnostic = output.diagnostic();
            tracing::error!(
                status = %output.status,
                diagnostic = %diagnostic,
                "forced alignment exited unsuccessfully"
            );
            return Err(DomainError::alignment(&format!(
                "{} ({})",
                diagnostic, output.status
            )));
        }

        Ok(job.output_dir.clone())
    }
}
