use anyhow::Result;
use infomed_qr::{config::Config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when the environment is already set)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("infomed_qr=info".parse()?),
        )
        .init();

    info!("Starting InfoMed QR service");

    let config = Config::from_env()?;
    server::serve(config).await
}
