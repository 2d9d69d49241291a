use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calldata::{Calldata, VerificationArgs};
use crate::proof::ProofSystem;

/// A proof and its public signals exactly as the proving backend emitted them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub system: ProofSystem,
    pub proof: Value,
    pub public_signals: Value,
}

#[derive(Debug, Serialize)]
pub struct CalldataResponse {
    pub calldata: Calldata,
    pub args: VerificationArgs,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveRequest {
    pub circuit_id: String,
    pub witness: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProveResponse {
    pub circuit_id: String,
    pub system: ProofSystem,
    pub proof: Value,
    pub public_signals: Value,
    pub calldata: Calldata,
    pub args: VerificationArgs,
    pub is_valid: bool,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInfo {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub system: ProofSystem,
    pub required_inputs: Vec<String>,
    pub public_signal_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CircuitsResponse {
    pub circuits: Vec<CircuitInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub circuits_loaded: usize,
    pub verifier_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}
