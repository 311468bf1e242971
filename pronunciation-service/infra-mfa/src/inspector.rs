use std::{path::Path, time::Duration};

use async_trait::async_trait;
use pronunciation_domain::{AlignmentInspector, DomainError};

use crate::process::MfaCommand;

#[derive(Debug, Clone)]
pub struct MfaInspectorConfig {
    pub command: MfaCommand,
    pub timeout: Duration,
}

pub struct MfaInspector {
    config: MfaInspectorConfig,
}

impl MfaInspector {
    pub fn new(config: MfaInspectorConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AlignmentInspector for MfaInspector {
    async fn count_labels(&self, result_path: &Path) -> Result<String, DomainError> {
        let args = vec![
            "inspect_textgrid".into(),
            result_path.as_os_str().to_os_string(),
            "--count_labels".into(),
        ];

        let output = self
            .config
            .command
            .run(args, self.config.timeout)
            .await
            .map_err(|err| DomainError::inspection(&err.to_string()))?;

        if !output.status.success() {
            return Err(DomainError::inspection(&format!(
                "{} ({})",
                output.diagnostic(),
                output.status
            )));
        }

        tracing::debug!(
            result_path = %result_path.display(),
            output_len = output.stdout.len(),
            "inspected alignment result"
        );
        Ok(output.stdout)
    }
}
