use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use pronunciation_domain::{DictionaryProvisioner, DomainError};
use tokio::sync::Mutex;
use uuid::Uuid;

const RESOURCE_NAME: &str = "pronunciation dictionary";

#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    pub url: String,
    pub path: PathBuf,
    pub timeout: Duration,
}

/// Downloads the pronunciation dictionary on first use.
///
/// Presence of the file is the only state; the body is written to a sibling
/// temporary file and renamed into place.
pub struct HttpDictionaryProvisioner {
    config: DictionaryConfig,
    client: reqwest::Client,
    download_lock: Mutex<()>,
}

impl HttpDictionaryProvisioner {
    pub fn new(config: DictionaryConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| DomainError::internal_error(&err.to_string()))?;
        Ok(Self {
            config,
            client,
            download_lock: Mutex::new(()),
        })
    }

    async fn download(&self) -> Result<(), DomainError> {
        tracing::info!(
            url = %self.config.url,
            path = %self.config.path.display(),
            "downloading pronunciation dictionary"
        );

        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|err| DomainError::resource_fetch(RESOURCE_NAME, &err.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| DomainError::resource_fetch(RESOURCE_NAME, &err.to_string()))?;

        let part_path = part_path_for(&self.config.path);
        if let Err(err) = write_then_rename(&part_path, &self.config.path, &body).await {
            if let Err(cleanup) = tokio::fs::remove_file(&part_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %part_path.display(),
                        error = %cleanup,
                        "error cleaning up partial dictionary download"
                    );
                }
            }
            return Err(DomainError::resource_fetch(
                RESOURCE_NAME,
                &format!("failed to store {}: {err}", self.config.path.display()),
            ));
        }

        tracing::info!(
            path = %self.config.path.display(),
            bytes = body.len(),
            "pronunciation dictionary stored"
        );
        Ok(())
    }
}

#[async_trait]
impl DictionaryProvisioner for HttpDictionaryProvisioner {
    async fn ensure_dictionary(&self) -> Result<PathBuf, DomainError> {
        if self.config.path.is_file() {
            return Ok(self.config.path.clone());
        }

        let _guard = self.download_lock.lock().await;
        // another request may have finished the download while we waited
        if !self.config.path.is_file() {
            self.download().await?;
        }
        Ok(self.config.path.clone())
    }
}

fn part_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dictionary".to_string());
    path.with_file_name(format!(".{file_name}.{}.part", Uuid::new_v4().simple()))
}

async fn write_then_rename(part: &Path, target: &Path, body: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(part, body).await?;
    tokio::fs::rename(part, target).await
}
