//! chatguard-classifier binary.
//!
//! Binds `CHATGUARD_CLASSIFIER_ADDR` (default `127.0.0.1:5000`). Log
//! verbosity follows `RUST_LOG`.

use anyhow::{Context, Result};
use chatguard::logging::{self, LoggingConfig};
use tokio::net::TcpListener;

const ADDR_VAR: &str = "CHATGUARD_CLASSIFIER_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:5000";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(&LoggingConfig::default()).context("failed to initialize logging")?;

    let addr = std::env::var(ADDR_VAR).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "classifier service listening");

    chatguard_classifier::serve(listener)
        .await
        .context("classifier service stopped")
}
