use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;

use crate::circuit::CircuitArtifacts;
use crate::command;
use crate::error::BoundaryError;

/// Raw output of a proving backend: snarkjs-shaped JSON with every number
/// encoded as a string.
#[derive(Clone, Debug, PartialEq)]
pub struct ProverOutput {
    pub proof: Value,
    pub public_signals: Value,
}

/// Produces a proof and its public signals from a witness assignment.
///
/// Only the shape of the output is relied upon; its arithmetic is checked by
/// the verification endpoint.
pub trait ProvingBackend: Send + Sync {
    fn prove(&self, circuit: &CircuitArtifacts, witness: &Value) -> Result<ProverOutput, BoundaryError>;
}

/// Runs `snarkjs <system> fullprove` in a scratch directory per call.
///
/// Every call gets its own directory, so concurrent proofs never share files.
#[derive(Clone, Debug)]
pub struct SnarkjsProver {
    program: String,
    base_args: Vec<String>,
    timeout: Duration,
}

impl SnarkjsProver {
    /// `command_line` may carry leading arguments, e.g. `npx snarkjs`.
    pub fn new(command_line: &str, timeout: Duration) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "snarkjs".to_string());
        Self {
            program,
            base_args: parts.collect(),
            timeout,
        }
    }
}

impl ProvingBackend for SnarkjsProver {
    fn prove(&self, circuit: &CircuitArtifacts, witness: &Value) -> Result<ProverOutput, BoundaryError> {
        let work_dir = WorkDir::create(&circuit.id)?;

        tracing::info!(
            "Prove request: circuit={} system={} workDir={}",
            circuit.id,
            circuit.system,
            work_dir.path().display()
        );

        let input = serde_json::to_vec(witness).map_err(|e| BoundaryError::Io {
            context: "Failed to serialize witness".to_string(),
            reason: e.to_string(),
        })?;
        write_file(&work_dir.path().join("input.json"), &input)?;

        let mut args = self.base_args.clone();
        args.extend([
            circuit.system.to_string(),
            "fullprove".to_string(),
            "input.json".to_string(),
            circuit.wasm.display().to_string(),
            circuit.zkey.display().to_string(),
            "proof.json".to_string(),
            "public.json".to_string(),
        ]);

        command::run(&self.program, &args, None, Some(work_dir.path()), self.timeout)?;

        let proof = read_json(&self.program, &work_dir.path().join("proof.json"))?;
        let public_signals = read_json(&self.program, &work_dir.path().join("public.json"))?;

        tracing::info!(
            "Proof generated: circuit={} publicSignals={}",
            circuit.id,
            public_signals.as_array().map(|s| s.len()).unwrap_or(0)
        );

        Ok(ProverOutput {
            proof,
            public_signals,
        })
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), BoundaryError> {
    fs::write(path, contents).map_err(|e| BoundaryError::Io {
        context: format!("Failed to write {}", path.display()),
        reason: e.to_string(),
    })
}

fn read_json(program: &str, path: &Path) -> Result<Value, BoundaryError> {
    let contents = fs::read_to_string(path).map_err(|e| BoundaryError::Io {
        context: format!("Failed to read {}", path.display()),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| BoundaryError::MalformedResponse {
        program: program.to_string(),
        detail: format!("{} is not valid JSON: {}", path.display(), e),
    })
}

/// Scratch directory removed on drop.
struct WorkDir(PathBuf);

impl WorkDir {
    fn create(circuit_id: &str) -> Result<Self, BoundaryError> {
        static NEXT: AtomicU64 = AtomicU64::new(0);

        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "snark-calldata-{}_{}_{}_{}",
            circuit_id,
            std::process::id(),
            timestamp,
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).map_err(|e| BoundaryError::Io {
            context: format!("Failed to create work dir {}", path.display()),
            reason: e.to_string(),
        })?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.0) {
            tracing::warn!("Failed to clean up work dir {}: {}", self.0.display(), e);
        }
    }
}
