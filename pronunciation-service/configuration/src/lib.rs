use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub type AppConfig = PronunciationConfig;

pub const ENV_PREFIX: &str = "PRONUNCIATION_SERVICE";
pub const ENV_CONFIG_PATH: &str = "PRONUNCIATION_SERVICE_CONFIG";
pub const ENV_RUN_ENV: &str = "RUN_ENV";
pub const ENV_PORT: &str = "PORT";
pub const ENV_UPLOAD_FOLDER: &str = "UPLOAD_FOLDER";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PronunciationConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mfa: MfaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_dictionary_dir")]
    pub dictionary_dir: PathBuf,
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    #[serde(default = "default_scratch_root")]
    pub scratch_root: PathBuf,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaConfig {
    #[serde(default = "default_mfa_binary")]
    pub binary: String,
    #[serde(default = "default_dictionary_url")]
    pub dictionary_url: String,
    #[serde(default = "default_dictionary_file")]
    pub dictionary_file: String,
    #[serde(default = "default_acoustic_model")]
    pub acoustic_model: String,
    #[serde(default = "default_alignment_timeout_secs")]
    pub alignment_timeout_secs: u64,
    #[serde(default = "default_inspection_timeout_secs")]
    pub inspection_timeout_secs: u64,
    #[serde(default = "default_version_timeout_secs")]
    pub version_timeout_secs: u64,
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for PronunciationConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            mfa: MfaConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dictionary_dir: default_dictionary_dir(),
            models_dir: default_models_dir(),
            scratch_root: default_scratch_root(),
            upload_dir: default_upload_dir(),
        }
    }
}

impl Default for MfaConfig {
    fn default() -> Self {
        Self {
            binary: default_mfa_binary(),
            dictionary_url: default_dictionary_url(),
            dictionary_file: default_dictionary_file(),
            acoustic_model: default_acoustic_model(),
            alignment_timeout_secs: default_alignment_timeout_secs(),
            inspection_timeout_secs: default_inspection_timeout_secs(),
            version_timeout_secs: default_version_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
        }
    }
}

impl StorageConfig {
    /// Creates every directory the service reads from or writes to.
    pub fn ensure_directories(&self) -> io::Result<()> {
        for dir in [
            &self.dictionary_dir,
            &self.models_dir,
            &self.scratch_root,
            &self.upload_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

impl PronunciationConfig {
    pub fn dictionary_path(&self) -> PathBuf {
        self.storage.dictionary_dir.join(&self.mfa.dictionary_file)
    }
}

impl MfaConfig {
    pub fn alignment_timeout(&self) -> Duration {
        Duration::from_secs(self.alignment_timeout_secs.max(1))
    }

    pub fn inspection_timeout(&self) -> Duration {
        Duration::from_secs(self.inspection_timeout_secs.max(1))
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs.max(1))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs.max(1))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value `{value}` for {key}: {message}")]
    InvalidEnv {
        key: String,
        value: String,
        message: String,
    },
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Loads defaults, then the TOML file for the current run environment, then
/// environment overrides.
pub fn load_config() -> Result<PronunciationConfig, ConfigError> {
    load_config_from(&StdEnv)
}

pub fn load_config_from(env: &impl Env) -> Result<PronunciationConfig, ConfigError> {
    let path = config_file_path(env);
    let mut config = if path.is_file() {
        read_config_file(&path)?
    } else {
        PronunciationConfig::default()
    };
    apply_env_overrides(&mut config, env)?;
    Ok(config)
}

fn config_file_path(env: &impl Env) -> PathBuf {
    if let Some(path) = env.var(ENV_CONFIG_PATH).filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }
    let run_env = env
        .var(ENV_RUN_ENV)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "development".to_string());
    Path::new("config").join(format!("{run_env}.toml"))
}

pub fn read_config_file(path: &Path) -> Result<PronunciationConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(config: &mut PronunciationConfig, env: &impl Env) -> Result<(), ConfigError> {
    if let Some(port) = env.var(ENV_PORT) {
        config.server.port = parse_env(ENV_PORT, &port)?;
    }
    if let Some(upload_dir) = env.var(ENV_UPLOAD_FOLDER) {
        config.storage.upload_dir = PathBuf::from(upload_dir);
    }

    let prefixed = |name: &str| env.var(&format!("{ENV_PREFIX}_{name}"));

    if let Some(value) = prefixed("SERVER_HOST") {
        config.server.host = value;
    }
    if let Some(value) = prefixed("SERVER_PORT") {
        config.server.port = parse_env("SERVER_PORT", &value)?;
    }
    if let Some(value) = prefixed("SERVER_MAX_UPLOAD_BYTES") {
        config.server.max_upload_bytes = parse_env("SERVER_MAX_UPLOAD_BYTES", &value)?;
    }
    if let Some(value) = prefixed("LOGGING_LEVEL") {
        config.logging.level = value;
    }
    if let Some(value) = prefixed("STORAGE_DICTIONARY_DIR") {
        config.storage.dictionary_dir = PathBuf::from(value);
    }
    if let Some(value) = prefixed("STORAGE_MODELS_DIR") {
        config.storage.models_dir = PathBuf::from(value);
    }
    if let Some(value) = prefixed("STORAGE_SCRATCH_ROOT") {
        config.storage.scratch_root = PathBuf::from(value);
    }
    if let Some(value) = prefixed("STORAGE_UPLOAD_DIR") {
        config.storage.upload_dir = PathBuf::from(value);
    }
    if let Some(value) = prefixed("MFA_BINARY") {
        config.mfa.binary = value;
    }
    if let Some(value) = prefixed("MFA_DICTIONARY_URL") {
        config.mfa.dictionary_url = value;
    }
    if let Some(value) = prefixed("MFA_DICTIONARY_FILE") {
        config.mfa.dictionary_file = value;
    }
    if let Some(value) = prefixed("MFA_ACOUSTIC_MODEL") {
        config.mfa.acoustic_model = value;
    }
    if let Some(value) = prefixed("MFA_ALIGNMENT_TIMEOUT_SECS") {
        config.mfa.alignment_timeout_secs = parse_env("MFA_ALIGNMENT_TIMEOUT_SECS", &value)?;
    }
    if let Some(value) = prefixed("MFA_INSPECTION_TIMEOUT_SECS") {
        config.mfa.inspection_timeout_secs = parse_env("MFA_INSPECTION_TIMEOUT_SECS", &value)?;
    }
    if let Some(value) = prefixed("MFA_VERSION_TIMEOUT_SECS") {
        config.mfa.version_timeout_secs = parse_env("MFA_VERSION_TIMEOUT_SECS", &value)?;
    }
    if let Some(value) = prefixed("MFA_DOWNLOAD_TIMEOUT_SECS") {
        config.mfa.download_timeout_secs = parse_env("MFA_DOWNLOAD_TIMEOUT_SECS", &value)?;
    }

    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
        message: err.to_string(),
    })
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `logging.level`.
pub fn setup_logging(config: &PronunciationConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dictionary_dir() -> PathBuf {
    PathBuf::from("dictionaries")
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_scratch_root() -> PathBuf {
    PathBuf::from("temp")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_mfa_binary() -> String {
    "mfa".to_string()
}

fn default_dictionary_url() -> String {
    "https://raw.githubusercontent.com/MontrealCorpusTools/mfa-models/main/dictionary/german_mfa.dict"
        .to_string()
}

fn default_dictionary_file() -> String {
    "german_mfa.dict".to_string()
}

fn default_acoustic_model() -> String {
    "german_mfa".to_string()
}

fn default_alignment_timeout_secs() -> u64 {
    600
}

fn default_inspection_timeout_secs() -> u64 {
    60
}

fn default_version_timeout_secs() -> u64 {
    10
}

fn default_download_timeout_secs() -> u64 {
    120
}
