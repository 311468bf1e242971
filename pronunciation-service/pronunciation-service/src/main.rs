use anyhow::Result;
use pronunciation_configuration::{load_config, setup_logging};
use pronunciation_setup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;
    setup_logging(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting pronunciation-service");
    let app = Application::new(config).await?;
    app.run().await?;
    Ok(())
}
