//! TaskFlow stub server -- in-memory REST API for development.
//!
//! Serves `/user/login`, `/user/register`, and `/task` CRUD with bearer
//! token auth. All data is lost on exit.
//!
//! # Usage
//!
//! ```bash
//! # Run on default address 127.0.0.1:5000
//! cargo run --bin taskflow-stub
//!
//! # Run on custom address
//! cargo run --bin taskflow-stub -- --bind 127.0.0.1:8080
//! ```

use std::sync::Arc;

use clap::Parser;
use taskflow_stub::config::{StubCliArgs, StubConfig};
use taskflow_stub::server::{self, StubState};

#[tokio::main]
async fn main() {
    let cli = StubCliArgs::parse();

    let config = match StubConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskflow stub server");

    let state = Arc::new(StubState::with_config(config.max_body_size));

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "stub server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "stub server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start stub server");
            std::process::exit(1);
        }
    }
}
