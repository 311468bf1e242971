use std::sync::Arc;

use async_trait::async_trait;

use pronunciation_domain::AlignerVersion;

use crate::HealthResponse;

const HEALTH_STATUS: &str = "ok";
const HEALTH_MESSAGE: &str = "MFA API is running";

#[async_trait]
pub trait HealthUseCase: Send + Sync {
    async fn health(&self) -> HealthResponse;
}

pub struct HealthUseCaseImpl {
    version: Arc<dyn AlignerVersion>,
}

impl HealthUseCaseImpl {
    pub fn new(version: Arc<dyn AlignerVersion>) -> Self {
        Self { version }
    }
}

#[async_trait]
impl HealthUseCase for HealthUseCaseImpl {
    async fn health(&self) -> HealthResponse {
        // version lookup failures leave `mfa_version` empty
        let mfa_version = match self.version.version().await {
            Ok(version) => version.trim().to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read aligner version");
                String::new()
            }
        };

        HealthResponse {
            status: HEALTH_STATUS.to_string(),
            message: HEALTH_MESSAGE.to_string(),
            mfa_version,
        }
    }
}
