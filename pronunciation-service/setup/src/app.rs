use std::sync::Arc;

use anyhow::{anyhow, Error};
use axum::Router;
use pronunciation_application::{
    AnalysisSettings, AnalyzePronunciationUseCase, AnalyzePronunciationUseCaseImpl,
    HealthUseCase, HealthUseCaseImpl,
};
use pronunciation_configuration::AppConfig;
use pronunciation_domain::{
    Aligner, AlignerVersion, AlignmentInspector, CorpusBuilder, DictionaryProvisioner,
};
use pronunciation_http_server::{create_router, serve, AppState};
use pronunciation_infra_mfa::{
    DictionaryConfig, FsCorpusBuilder, HttpDictionaryProvisioner, MfaAligner, MfaAlignerConfig,
    MfaCommand, MfaInspector, MfaInspectorConfig, MfaVersionProbe,
};

pub async fn build_and_run(config: AppConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run().await
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        config
            .storage
            .ensure_directories()
            .map_err(|err| anyhow!("failed to create storage directories: {err}"))?;

        let command = MfaCommand::parse(&config.mfa.binary)
            .ok_or_else(|| anyhow!("`mfa.binary` cannot be empty"))?;

        tracing::info!(
            mfa = %command,
            acoustic_model = %config.mfa.acoustic_model,
            dictionary = %config.dictionary_path().display(),
            scratch_root = %config.storage.scratch_root.display(),
            "initializing pronunciation application"
        );

        let provisioner: Arc<dyn DictionaryProvisioner> =
            Arc::new(HttpDictionaryProvisioner::new(DictionaryConfig {
                url: config.mfa.dictionary_url.clone(),
                path: config.dictionary_path(),
                timeout: config.mfa.download_timeout(),
            })?);
        let corpus_builder: Arc<dyn CorpusBuilder> = Arc::new(FsCorpusBuilder::new());
        let aligner: Arc<dyn Aligner> = Arc::new(MfaAligner::new(MfaAlignerConfig {
            command: command.clone(),
            timeout: config.mfa.alignment_timeout(),
        }));
        let inspector: Arc<dyn AlignmentInspector> =
            Arc::new(MfaInspector::new(MfaInspectorConfig {
                command: command.clone(),
                timeout: config.mfa.inspection_timeout(),
            }));
        let version: Arc<dyn AlignerVersion> = Arc::new(MfaVersionProbe::new(
            command,
            config.mfa.version_timeout(),
        ));

        // a missing dictionary is retried on the first request
        match provisioner.ensure_dictionary().await {
            Ok(path) => tracing::info!(path = %path.display(), "pronunciation dictionary ready"),
            Err(err) => tracing::warn!(
                error = %err,
                "pronunciation dictionary unavailable at startup"
            ),
        }

        let analyze: Arc<dyn AnalyzePronunciationUseCase> =
            Arc::new(AnalyzePronunciationUseCaseImpl::new(
                provisioner,
                corpus_builder,
                aligner,
                inspector,
                AnalysisSettings {
                    scratch_root: config.storage.scratch_root.clone(),
                    acoustic_model: config.mfa.acoustic_model.clone(),
                },
            ));
        let health: Arc<dyn HealthUseCase> = Arc::new(HealthUseCaseImpl::new(version));

        let state = AppState {
            analyze,
            health,
            upload_dir: config.storage.upload_dir.clone(),
        };

        Ok(Self { config, state })
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), self.config.server.max_upload_bytes)
    }

    pub async fn run(self) -> Result<(), Error> {
        tracing::info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            "starting pronunciation HTTP server"
        );

        serve(self.router(), &self.config.server)
            .await
            .map_err(|err| anyhow!("server startup failed: {err}"))
    }
}
