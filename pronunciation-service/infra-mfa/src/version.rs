use std::time::Duration;

use async_trait::async_trait;
use pronunciation_domain::{AlignerVersion, DomainError};

use crate::process::MfaCommand;

pub struct MfaVersionProbe {
    command: MfaCommand,
    timeout: Duration,
}

impl MfaVersionProbe {
    pub fn new(command: MfaCommand, timeout: Duration) -> Self {
        Self { command, timeout }
    }
}

#[async_trait]
impl AlignerVersion for MfaVersionProbe {
    async fn version(&self) -> Result<String, DomainError> {
        let output = self
            .command
            .run(vec!["version".into()], self.timeout)
            .await
            .map_err(|err| DomainError::internal_error(&err.to_string()))?;

        if !output.status.success() {
            return Err(DomainError::internal_error(&format!(
                "`{} version` failed: {}",
                self.command,
                output.diagnostic()
            )));
        }

        Ok(output.stdout.trim().to_string())
    }
}
