//! otms-engine: HTTP server for the overtime rate and eligibility engine.
//!
//! Environment:
//! - `OTMS_CONFIG_DIR`: YAML configuration directory (default `./config/otms`)
//! - `OTMS_BIND_ADDR`: listen address (default `0.0.0.0:8080`)
//! - `RUST_LOG`: tracing filter (default `otms_engine=info`)

use otms_engine::api::{AppState, create_router};
use otms_engine::config::ConfigLoader;
use otms_engine::workflow::Clock;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_CONFIG_DIR: &str = "./config/otms";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "otms_engine=info".into()),
        )
        .init();

    let config_dir =
        std::env::var("OTMS_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        std::env::var("OTMS_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    let config = loader.into_config();
    tracing::info!(
        config_dir = %config_dir,
        eligibility_rules = config.eligibility_rules().len(),
        rate_formulas = config.rate_formulas().len(),
        thresholds = config.thresholds().len(),
        employees = config.employees().len(),
        holidays = config.holidays().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::from_config(&config, Clock::System));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("otms-engine listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {e}");
            }
        })
        .await?;

    tracing::info!("otms-engine stopped");
    Ok(())
}
