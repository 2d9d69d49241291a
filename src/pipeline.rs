//! Proof-to-verdict pipeline.
//!
//! Each invocation walks `Normalize -> Encode -> Invoke -> Done` (optionally
//! preceded by `Prove`) and keeps no state once it returns. Malformed input
//! stops the walk at `Normalize` or `Encode`, before the endpoint is called.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::calldata::{self, Encoded, VerificationArgs};
use crate::circuit::CircuitArtifacts;
use crate::error::{BoundaryError, DecodeError, PipelineError};
use crate::normalize::{normalize, Normalized};
use crate::proof::{Proof, ProofSystem, PublicSignals};
use crate::prover::ProvingBackend;
use crate::verifier::VerificationEndpoint;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Prove,
    Normalize,
    Encode,
    Invoke,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Prove => "prove",
            Stage::Normalize => "normalize",
            Stage::Encode => "encode",
            Stage::Invoke => "invoke",
            Stage::Done => "done",
        })
    }
}

/// Outcome of a completed verification.
///
/// `Rejected` means the endpoint looked at well-formed arguments and said no;
/// anything that prevented the question from being asked is a [`PipelineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Valid,
    Rejected,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

impl From<bool> for Verdict {
    fn from(valid: bool) -> Self {
        if valid {
            Verdict::Valid
        } else {
            Verdict::Rejected
        }
    }
}

/// Everything produced along a prove-then-verify run.
///
/// `proof` and `public_signals` are the backend's output with every number
/// rendered as a canonical decimal string.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvedVerdict {
    pub system: ProofSystem,
    pub proof: Value,
    pub public_signals: Value,
    pub encoded: Encoded,
    pub verdict: Verdict,
}

fn decode_at(stage: Stage) -> impl Fn(DecodeError) -> PipelineError {
    move |source| {
        tracing::warn!("Pipeline failed at {}: {}", stage, source);
        PipelineError::Decode { stage, source }
    }
}

fn boundary_at(stage: Stage) -> impl Fn(BoundaryError) -> PipelineError {
    move |source| {
        tracing::error!("Pipeline failed at {}: {}", stage, source);
        PipelineError::Boundary { stage, source }
    }
}

/// Normalize and encode a string-encoded proof and its public signals.
pub fn encode_proof(
    system: ProofSystem,
    proof: &Value,
    public_signals: &Value,
) -> Result<Encoded, PipelineError> {
    tracing::debug!("{} system={}", Stage::Normalize, system);
    encode_normalized(system, &normalize(proof), &normalize(public_signals))
}

fn encode_normalized(
    system: ProofSystem,
    proof: &Normalized,
    public_signals: &Normalized,
) -> Result<Encoded, PipelineError> {
    let typed_proof = Proof::from_snarkjs(system, proof).map_err(decode_at(Stage::Normalize))?;
    let signals =
        PublicSignals::from_normalized(public_signals).map_err(decode_at(Stage::Normalize))?;

    tracing::debug!("{} system={} signals={}", Stage::Encode, system, signals.len());
    calldata::encode_args(&typed_proof, &signals).map_err(decode_at(Stage::Encode))
}

/// Ask `endpoint` about already-encoded arguments.
pub fn invoke(
    args: &VerificationArgs,
    endpoint: &dyn VerificationEndpoint,
) -> Result<Verdict, PipelineError> {
    tracing::debug!("{} system={}", Stage::Invoke, args.system());
    let verdict = Verdict::from(endpoint.verify(args).map_err(boundary_at(Stage::Invoke))?);
    tracing::info!(
        "{} system={} verdict={:?}",
        Stage::Done,
        args.system(),
        verdict
    );
    Ok(verdict)
}

/// Normalize, encode and verify a proof the caller already holds.
pub fn verify_proof(
    system: ProofSystem,
    proof: &Value,
    public_signals: &Value,
    endpoint: &dyn VerificationEndpoint,
) -> Result<Verdict, PipelineError> {
    let encoded = encode_proof(system, proof, public_signals)?;
    invoke(&encoded.args, endpoint)
}

/// Obtain a proof from `backend` for `witness`, then verify it.
pub fn prove_and_verify(
    circuit: &CircuitArtifacts,
    witness: &Value,
    backend: &dyn ProvingBackend,
    endpoint: &dyn VerificationEndpoint,
) -> Result<ProvedVerdict, PipelineError> {
    tracing::debug!("{} circuit={}", Stage::Prove, circuit.id);
    let output = backend
        .prove(circuit, witness)
        .map_err(boundary_at(Stage::Prove))?;

    tracing::debug!("{} system={}", Stage::Normalize, circuit.system);
    let proof = normalize(&output.proof);
    let public_signals = normalize(&output.public_signals);
    let encoded = encode_normalized(circuit.system, &proof, &public_signals)?;
    let verdict = invoke(&encoded.args, endpoint)?;

    Ok(ProvedVerdict {
        system: circuit.system,
        proof: proof.to_json(),
        public_signals: public_signals.to_json(),
        encoded,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldElement;
    use crate::fixtures::{self, ExpectedArgsEndpoint, FixedProver, UnreachableEndpoint};
    use serde_json::json;
    use std::path::PathBuf;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from(v)
    }

    fn hello_world() -> CircuitArtifacts {
        CircuitArtifacts {
            id: "hello_world".to_string(),
            system: ProofSystem::Groth16,
            wasm: PathBuf::from("HelloWorld.wasm"),
            zkey: PathBuf::from("circuit_final.zkey"),
        }
    }

    fn multiplier3_plonk() -> CircuitArtifacts {
        CircuitArtifacts {
            id: "multiplier3_plonk".to_string(),
            system: ProofSystem::Plonk,
            wasm: PathBuf::from("Multiplier3.wasm"),
            zkey: PathBuf::from("circuit_final.zkey"),
        }
    }

    #[test]
    fn test_groth16_valid_proof_verifies() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let verdict = verify_proof(
            ProofSystem::Groth16,
            &fixtures::groth16_proof(),
            &fixtures::groth16_signals(),
            &endpoint,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Valid);
        assert_eq!(endpoint.calls(), 1);
    }

    #[test]
    fn test_groth16_hex_encoded_input_verifies_identically() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let mut proof = fixtures::groth16_proof();
        let c1 = FieldElement::parse_raw(proof["pi_c"][1].as_str().unwrap()).unwrap();
        proof["pi_c"][1] = json!(c1.to_hex_word().unwrap());
        let verdict =
            verify_proof(ProofSystem::Groth16, &proof, &json!(["0x2"]), &endpoint).unwrap();
        assert!(verdict.is_valid());
    }

    #[test]
    fn test_groth16_tampered_coordinates_are_rejected() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let pointers = [
            "/pi_a/0", "/pi_a/1", "/pi_b/0/0", "/pi_b/0/1", "/pi_b/1/0", "/pi_b/1/1", "/pi_c/0",
            "/pi_c/1",
        ];
        for pointer in pointers {
            let mut proof = fixtures::groth16_proof();
            *proof.pointer_mut(pointer).unwrap() = json!("1");
            let verdict = verify_proof(
                ProofSystem::Groth16,
                &proof,
                &fixtures::groth16_signals(),
                &endpoint,
            )
            .unwrap();
            assert_eq!(verdict, Verdict::Rejected, "tampering {} went unnoticed", pointer);
        }
    }

    #[test]
    fn test_groth16_wrong_public_signal_is_rejected() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let verdict = verify_proof(
            ProofSystem::Groth16,
            &fixtures::groth16_proof(),
            &json!(["3"]),
            &endpoint,
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Rejected);
    }

    #[test]
    fn test_plonk_valid_proof_verifies() {
        let endpoint = ExpectedArgsEndpoint::plonk();
        let encoded = encode_proof(
            ProofSystem::Plonk,
            &fixtures::plonk_proof(),
            &fixtures::plonk_signals(),
        )
        .unwrap();
        let VerificationArgs::Plonk { ref input, .. } = encoded.args else {
            panic!("expected plonk args");
        };
        assert_eq!(input, &vec![fe(6)]);
        assert_eq!(invoke(&encoded.args, &endpoint).unwrap(), Verdict::Valid);
    }

    #[test]
    fn test_zeroed_args_are_rejected_for_both_systems() {
        let groth16 = ExpectedArgsEndpoint::groth16();
        let plonk = ExpectedArgsEndpoint::plonk();
        assert_eq!(
            invoke(&VerificationArgs::zeroed(ProofSystem::Groth16, 1), &groth16).unwrap(),
            Verdict::Rejected
        );
        assert_eq!(
            invoke(&VerificationArgs::zeroed(ProofSystem::Plonk, 1), &plonk).unwrap(),
            Verdict::Rejected
        );
    }

    #[test]
    fn test_malformed_proof_fails_before_invoke() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let mut proof = fixtures::groth16_proof();
        proof["pi_a"] = json!(["1"]);
        let err = verify_proof(
            ProofSystem::Groth16,
            &proof,
            &fixtures::groth16_signals(),
            &endpoint,
        )
        .unwrap_err();
        assert_eq!(err.stage(), Stage::Normalize);
        assert!(matches!(err, PipelineError::Decode { .. }));
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_non_numeric_signal_fails_before_invoke() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let err = verify_proof(
            ProofSystem::Groth16,
            &fixtures::groth16_proof(),
            &json!(["2g"]),
            &endpoint,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Decode {
                stage: Stage::Normalize,
                source: DecodeError::NotNumeric { .. }
            }
        ));
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_oversized_value_fails_at_encode() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let wide = format!("0x1{}", "0".repeat(64));
        let err = verify_proof(
            ProofSystem::Groth16,
            &fixtures::groth16_proof(),
            &json!([wide]),
            &endpoint,
        )
        .unwrap_err();
        assert_eq!(err.stage(), Stage::Encode);
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_unreachable_endpoint_is_boundary_error() {
        let err = verify_proof(
            ProofSystem::Groth16,
            &fixtures::groth16_proof(),
            &fixtures::groth16_signals(),
            &UnreachableEndpoint,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Boundary {
                stage: Stage::Invoke,
                ..
            }
        ));
    }

    #[test]
    fn test_prove_and_verify_hello_world() {
        let prover = FixedProver::groth16();
        let endpoint = ExpectedArgsEndpoint::groth16();
        let result =
            prove_and_verify(&hello_world(), &json!({"a": "1", "b": "2"}), &prover, &endpoint).unwrap();
        assert_eq!(result.system, ProofSystem::Groth16);
        assert_eq!(result.encoded.args.public_inputs(), &[fe(2)]);
        assert_eq!(result.verdict, Verdict::Valid);
        assert_eq!(result.public_signals, fixtures::groth16_signals());
    }

    #[test]
    fn test_prove_and_verify_multiplier3_plonk() {
        let prover = FixedProver::plonk();
        let endpoint = ExpectedArgsEndpoint::plonk();
        let result = prove_and_verify(
            &multiplier3_plonk(),
            &json!({"a": "1", "b": "2", "c": "3"}),
            &prover,
            &endpoint,
        )
        .unwrap();
        assert_eq!(result.encoded.args.public_inputs(), &[fe(6)]);
        assert!(result.verdict.is_valid());
        assert!(result.encoded.calldata.as_str().starts_with("0x"));
    }

    #[test]
    fn test_prove_and_verify_returns_canonical_decimals() {
        struct HexProver;
        impl ProvingBackend for HexProver {
            fn prove(
                &self,
                _circuit: &CircuitArtifacts,
                _witness: &Value,
            ) -> Result<crate::prover::ProverOutput, BoundaryError> {
                Ok(crate::prover::ProverOutput {
                    proof: fixtures::groth16_proof(),
                    public_signals: json!(["0x02"]),
                })
            }
        }
        let endpoint = ExpectedArgsEndpoint::groth16();
        let result = prove_and_verify(&hello_world(), &json!({"a": "1"}), &HexProver, &endpoint)
            .unwrap();
        assert_eq!(result.public_signals, json!(["2"]));
        assert_eq!(result.proof["protocol"], "groth16");
        assert!(result.verdict.is_valid());
    }

    #[test]
    fn test_prover_failure_stops_at_prove() {
        let endpoint = ExpectedArgsEndpoint::groth16();
        let err = prove_and_verify(&hello_world(), &json!({}), &FixedProver::failing(), &endpoint)
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Prove);
        assert_eq!(endpoint.calls(), 0);
    }

    #[test]
    fn test_concurrent_invocations_are_independent() {
        let endpoint = std::sync::Arc::new(ExpectedArgsEndpoint::groth16());
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let endpoint = endpoint.clone();
                std::thread::spawn(move || {
                    // Even iterations carry the honest signal.
                    let signal = if i % 2 == 0 { "2" } else { "5" };
                    verify_proof(
                        ProofSystem::Groth16,
                        &fixtures::groth16_proof(),
                        &json!([signal]),
                        endpoint.as_ref(),
                    )
                    .unwrap()
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), Verdict::from(i % 2 == 0));
        }
        assert_eq!(endpoint.calls(), 8);
    }

    #[test]
    fn test_verdict_from_bool() {
        assert_eq!(Verdict::from(true), Verdict::Valid);
        assert!(!Verdict::from(false).is_valid());
        assert_eq!(serde_json::to_value(Verdict::Rejected).unwrap(), json!("rejected"));
    }
}
