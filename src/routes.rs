use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::circuit::CircuitRegistry;
use crate::error::PipelineError;
use crate::pipeline;
use crate::prover::ProvingBackend;
use crate::types::{
    CalldataResponse, CircuitsResponse, ErrorResponse, HealthResponse, ProofRequest, ProveRequest,
    ProveResponse, VerifyResponse,
};
use crate::verifier::VerificationEndpoint;

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub circuits: Arc<CircuitRegistry>,
    pub prover: Arc<dyn ProvingBackend>,
    pub verifier: Option<Arc<dyn VerificationEndpoint>>,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error, stage: None })).into_response()
}

/// Decode failures are the caller's fault (400); boundary failures are an
/// upstream collaborator's (502).
fn pipeline_error_response(err: PipelineError) -> Response {
    let status = match err {
        PipelineError::Decode { .. } => StatusCode::BAD_REQUEST,
        PipelineError::Boundary { .. } => StatusCode::BAD_GATEWAY,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            stage: Some(err.stage().to_string()),
        }),
    )
        .into_response()
}

fn no_verifier_response() -> Response {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "No verification endpoint configured (set VERIFIER_CMD)".to_string(),
    )
}

/// POST /calldata: Normalize and encode a proof without verifying it.
///
/// Request body: ProofRequest { system, proof, publicSignals }
/// Response: CalldataResponse { calldata, args }
pub async fn calldata_handler(Json(req): Json<ProofRequest>) -> Response {
    match pipeline::encode_proof(req.system, &req.proof, &req.public_signals) {
        Ok(encoded) => (
            StatusCode::OK,
            Json(CalldataResponse {
                calldata: encoded.calldata,
                args: encoded.args,
            }),
        )
            .into_response(),
        Err(e) => pipeline_error_response(e),
    }
}

/// POST /verify: Encode a proof and ask the verification endpoint about it.
///
/// Request body: ProofRequest { system, proof, publicSignals }
/// Response: VerifyResponse { isValid }
pub async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProofRequest>,
) -> Response {
    let Some(verifier) = state.verifier.clone() else {
        return no_verifier_response();
    };

    let result = tokio::task::spawn_blocking(move || {
        pipeline::verify_proof(req.system, &req.proof, &req.public_signals, verifier.as_ref())
    })
    .await;

    match result {
        Ok(Ok(verdict)) => (
            StatusCode::OK,
            Json(VerifyResponse {
                is_valid: verdict.is_valid(),
            }),
        )
            .into_response(),
        Ok(Err(e)) => pipeline_error_response(e),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Verification task failed: {}", e),
        ),
    }
}

/// POST /prove: Prove a witness for a known circuit, then verify the proof.
///
/// Request body: ProveRequest { circuitId, witness }
/// Response: ProveResponse { circuitId, system, proof, publicSignals, calldata, args, isValid }
pub async fn prove_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProveRequest>,
) -> Response {
    if req.circuit_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "circuit_id is required".to_string());
    }

    if !req.witness.as_object().is_some_and(|w| !w.is_empty()) {
        return error_response(
            StatusCode::BAD_REQUEST,
            "witness must be a non-empty object".to_string(),
        );
    }

    let circuit = match state.circuits.get(&req.circuit_id) {
        Ok(circuit) => circuit.clone(),
        Err(e) => return error_response(StatusCode::NOT_FOUND, e),
    };

    let Some(verifier) = state.verifier.clone() else {
        return no_verifier_response();
    };
    let prover = state.prover.clone();

    let result = tokio::task::spawn_blocking(move || {
        pipeline::prove_and_verify(&circuit, &req.witness, prover.as_ref(), verifier.as_ref())
    })
    .await;

    match result {
        Ok(Ok(proved)) => (
            StatusCode::OK,
            Json(ProveResponse {
                circuit_id: req.circuit_id,
                system: proved.system,
                proof: proved.proof,
                public_signals: proved.public_signals,
                calldata: proved.encoded.calldata,
                args: proved.encoded.args,
                is_valid: proved.verdict.is_valid(),
            }),
        )
            .into_response(),
        Ok(Err(e)) => pipeline_error_response(e),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Proving task failed: {}", e),
        ),
    }
}

/// GET /circuits: List all loaded circuit metadata.
///
/// Response: CircuitsResponse { circuits: [CircuitInfo, ...] }
pub async fn circuits_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let circuits = state.circuits.list_circuits();
    (StatusCode::OK, Json(CircuitsResponse { circuits }))
}

/// GET /health: Health check endpoint.
///
/// Response: HealthResponse { status: "ok", circuitsLoaded: N, verifierConfigured }
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            circuits_loaded: state.circuits.len(),
            verifier_configured: state.verifier.is_some(),
        }),
    )
}

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/calldata", post(calldata_handler))
        .route("/verify", post(verify_handler))
        .route("/prove", post(prove_handler))
        .route("/circuits", get(circuits_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}
