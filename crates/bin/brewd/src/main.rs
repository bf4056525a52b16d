//! # brewd: coffee machine daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the clock, the actuator bank and the event bus (adapters)
//! - Construct the sequencer and the alarm scheduler, injecting adapters via
//!   port traits
//! - Build the axum router, injecting the use-cases
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT), letting a running brew
//!   release every button before the process exits
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use brewhub_adapter_http_axum::state::AppState;
use brewhub_adapter_virtual::{SystemClock, VirtualActuatorBank};
use brewhub_app::event_bus::InProcessEventBus;
use brewhub_app::scheduler::AlarmScheduler;
use brewhub_app::sequencer::Sequencer;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("invalid logging filter")?,
        )
        .init();

    // Hardware
    let offset = config.utc_offset()?;
    let clock = SystemClock::new(offset);
    let sequence = config.sequence()?;
    let actuators = Arc::new(VirtualActuatorBank::for_sequence(
        &sequence,
        config.actuators.active_low,
    ));
    tracing::info!(
        utc_offset = %offset,
        steps = sequence.len(),
        total_secs = sequence.total_duration().as_secs(),
        "hardware ready"
    );

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Use-cases
    let sequencer = Arc::new(Sequencer::new(
        sequence,
        actuators,
        Arc::clone(&event_bus),
    ));
    let scheduler = AlarmScheduler::new(
        clock,
        Arc::clone(&sequencer),
        config.scheduler_config(),
    );

    // HTTP
    let state = AppState::new(scheduler.clone(), sequencer, event_bus);
    let app = brewhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "brewd listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // a brew still in flight would be dropped with the runtime
    scheduler.shutdown().await;
    served.context("server error")?;

    tracing::info!("brewd stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
