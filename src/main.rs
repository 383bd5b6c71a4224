mod api;
mod config;
mod demo;
mod error;
mod fetcher;
mod metrics;
mod poller;
mod scoreboard;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::poller::ScoreboardPoller;
use crate::state::GameBoard;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        over_total = cfg.policy.over_total,
        under_total = cfg.policy.under_total,
        hot_pace = cfg.policy.hot_pace,
        cold_pace = cfg.policy.cold_pace,
        "Insight policy: O/U {:.0}/{:.0}, tempo {:.0}/{:.0}",
        cfg.policy.over_total,
        cfg.policy.under_total,
        cfg.policy.hot_pace,
        cfg.policy.cold_pace,
    );
    if cfg.request_timeout_secs >= cfg.poll_interval_secs {
        warn!(
            "REQUEST_TIMEOUT_SECS ({}) >= POLL_INTERVAL_SECS ({}): slow polls will skip ticks",
            cfg.request_timeout_secs, cfg.poll_interval_secs,
        );
    }

    // --- Shared state ---
    let board = GameBoard::new();
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());

    // --- Poller (first tick fires immediately) ---
    let poller = ScoreboardPoller::new(
        cfg.clone(),
        Arc::clone(&board),
        Arc::clone(&health),
        Arc::clone(&latency),
    )?;
    let poller_handle = poller.start();

    // --- HTTP API server ---
    let api_state = ApiState {
        board,
        health,
        latency,
        trigger: poller_handle.trigger_handle(),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    poller_handle.stop().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
