//! Example consumer: boots the sample project under `project/` and serves its CRUD endpoints.
//!
//! Run from repo root: `MODEL_BOOT_PROJECT_ROOT=example_consumer/project cargo run -p example-consumer`

use model_boot::{Application, ApplicationConfig, DataSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("model_boot=info")),
        )
        .init();

    let config = ApplicationConfig::from_env();
    let mut app = Application::new(config);
    app.data_source(DataSource::memory("db"));

    app.boot().await?;
    app.start().await?;
    if let Some(url) = app.url() {
        tracing::info!("Example consumer listening on {}", url);
    }

    tokio::signal::ctrl_c().await?;
    app.stop().await?;
    Ok(())
}
