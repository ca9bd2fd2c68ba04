//! nidpass API server entry point.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nidpass_api::config::ApiConfig;
use nidpass_api::state::AppState;

/// Privacy-preserving identity verification service.
#[derive(Debug, Parser)]
#[command(name = "nidpass-api", version, about)]
struct Args {
    /// Bind address, e.g. 0.0.0.0:8080. Overrides NIDPASS_BIND.
    #[arg(long)]
    bind: Option<String>,

    /// Emit logs as JSON (for log shippers).
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    let bind = config.bind.clone();

    let mut state = AppState::new(config);
    if let Some(pool) = nidpass_api::db::init_pool()
        .await
        .context("database initialization failed")?
    {
        state = state.with_pool(pool.clone());
        nidpass_api::db::hydrate(&state, &pool)
            .await
            .context("state hydration failed")?;
    }

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(%bind, "nidpass API listening");

    axum::serve(listener, nidpass_api::app(state))
        .await
        .context("server error")?;
    Ok(())
}
