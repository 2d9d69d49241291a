mod calldata;
mod circuit;
mod command;
mod config;
mod error;
mod field;
#[cfg(test)]
mod fixtures;
mod normalize;
mod pipeline;
mod proof;
mod prover;
mod routes;
mod types;
mod verifier;

use std::sync::Arc;

use crate::circuit::CircuitRegistry;
use crate::config::ServiceConfig;
use crate::prover::SnarkjsProver;
use crate::routes::{build_router, AppState};
use crate::verifier::{CommandEndpoint, VerificationEndpoint};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snark_calldata=info".into()),
        )
        .init();

    let config = ServiceConfig::from_env();

    tracing::info!("Loading circuits from: {}", config.circuits_dir);
    let circuits = CircuitRegistry::new(&config.circuits_dir);
    if circuits.is_empty() {
        tracing::warn!("No circuit artifacts found; /prove will reject every circuit");
    }

    let prover = SnarkjsProver::new(&config.snarkjs_path, config.command_timeout);

    let verifier: Option<Arc<dyn VerificationEndpoint>> = match config
        .verifier_cmd
        .as_deref()
        .and_then(|cmd| CommandEndpoint::from_command_line(cmd, config.command_timeout))
    {
        Some(endpoint) => {
            tracing::info!("Verification endpoint: {}", endpoint.program());
            Some(Arc::new(endpoint))
        }
        None => {
            tracing::warn!("VERIFIER_CMD not set; /verify and /prove will return 503");
            None
        }
    };

    let state = Arc::new(AppState {
        circuits,
        prover: Arc::new(prover),
        verifier,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Calldata service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            panic!("Failed to bind to {}: {}", addr, e);
        });

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            panic!("Server error: {}", e);
        });
}
