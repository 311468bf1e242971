#![allow(dead_code)]

use std::{fs, path::Path};

use pronunciation_configuration::AppConfig;
use pronunciation_setup::Application;
use reqwest::Client;
use tempfile::TempDir;

pub const ALIGNING_MFA: &str = r#"
case "$1" in
  align)
    corpus="$2"; out="$5"
    for lab in "$corpus"/*.lab; do
      base=$(basename "$lab" .lab)
      echo "intervals" > "$out/$base.TextGrid"
    done
    ;;
  inspect_textgrid)
    echo "phone phone phone"
    echo "word word"
    ;;
  version)
    echo "3.1.0"
    ;;
esac
"#;

/// Exits successfully from `align` without writing any result.
pub const SILENT_MFA: &str = r#"
case "$1" in
  align)
    echo "nothing aligned"
    ;;
  version)
    echo "3.1.0"
    ;;
esac
"#;

pub struct TestService {
    pub root: TempDir,
    pub base_url: String,
    pub client: Client,
}

impl TestService {
    pub fn dir_is_empty(&self, relative: &str) -> bool {
        fs::read_dir(self.root.path().join(relative))
            .expect("list dir")
            .next()
            .is_none()
    }
}

fn test_config(root: &Path, script: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.host = "127.0.0.1".to_string();
    config.storage.dictionary_dir = root.join("dictionaries");
    config.storage.models_dir = root.join("models");
    config.storage.scratch_root = root.join("temp");
    config.storage.upload_dir = root.join("uploads");
    config.mfa.binary = format!("/bin/sh {}", script.display());
    config.mfa.dictionary_url = "http://127.0.0.1:9/german_mfa.dict".to_string();
    config.mfa.alignment_timeout_secs = 10;
    config.mfa.inspection_timeout_secs = 10;
    config
}

pub async fn setup_test_server(mfa_script: &str) -> Result<TestService, Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let script = root.path().join("fake-mfa.sh");
    fs::write(&script, mfa_script)?;

    let config = test_config(root.path(), &script);
    fs::create_dir_all(&config.storage.dictionary_dir)?;
    fs::write(config.dictionary_path(), "hallo\th a l o\n")?;

    let app = Application::new(config).await?;
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = app.router();
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    Ok(TestService {
        root,
        base_url: format!("http://{addr}"),
        client: Client::new(),
    })
}
