use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use jobgate_api::middleware::GateState;
use jobgate_infra::GateConfig;
use jobgate_infra::backend::{InMemoryBackend, SeedData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GateConfig::from_env().context("invalid configuration")?;
    jobgate_observability::init(config.log_format);

    let backend = match &config.seed_file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let seed = SeedData::from_json(&raw)
                .with_context(|| format!("failed to parse seed file {}", path.display()))?;
            tracing::info!(accounts = seed.accounts.len(), "seeded backend");
            InMemoryBackend::from_seed(&seed, Utc::now())
        }
        None => {
            tracing::warn!("JOBGATE_SEED_FILE not set; starting with an empty backend");
            InMemoryBackend::new()
        }
    };

    let state = GateState::new(Arc::new(backend), config.check_timeout);
    let app = jobgate_api::app::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        check_timeout = ?config.check_timeout,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
