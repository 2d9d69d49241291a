use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::proof::ProofSystem;
use crate::types::CircuitInfo;

/// Compiled artifacts the proving backend needs for one circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitArtifacts {
    pub id: String,
    pub system: ProofSystem,
    pub wasm: PathBuf,
    pub zkey: PathBuf,
}

/// Registry of all circuits whose artifacts were found on disk, keyed by circuit ID.
pub struct CircuitRegistry {
    circuits: HashMap<String, CircuitArtifacts>,
    metadata: HashMap<String, CircuitInfo>,
}

/// Where a circuit's artifacts live below the circuits directory.
struct Layout {
    dir: &'static str,
    artifact: &'static str,
}

/// Circuit metadata definitions, paired with their on-disk layout.
fn circuit_metadata() -> Vec<(CircuitInfo, Layout)> {
    vec![
        (
            CircuitInfo {
                id: "hello_world".to_string(),
                display_name: "HelloWorld".to_string(),
                description: "Prove knowledge of a and b whose product is public".to_string(),
                system: ProofSystem::Groth16,
                required_inputs: vec!["a".to_string(), "b".to_string()],
                public_signal_count: 1,
            },
            Layout {
                dir: "HelloWorld",
                artifact: "HelloWorld",
            },
        ),
        (
            CircuitInfo {
                id: "multiplier3".to_string(),
                display_name: "Multiplier3".to_string(),
                description: "Prove knowledge of a, b and c whose product is public".to_string(),
                system: ProofSystem::Groth16,
                required_inputs: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                public_signal_count: 1,
            },
            Layout {
                dir: "Multiplier3",
                artifact: "Multiplier3",
            },
        ),
        (
            CircuitInfo {
                id: "multiplier3_plonk".to_string(),
                display_name: "Multiplier3 (PLONK)".to_string(),
                description: "Multiplier3 with a PLONK universal setup".to_string(),
                system: ProofSystem::Plonk,
                required_inputs: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                public_signal_count: 1,
            },
            Layout {
                dir: "Multiplier3_plonk",
                artifact: "Multiplier3",
            },
        ),
    ]
}

fn artifact_paths(base: &Path, layout: &Layout) -> (PathBuf, PathBuf) {
    let dir = base.join(layout.dir);
    let wasm = dir
        .join(format!("{}_js", layout.artifact))
        .join(format!("{}.wasm", layout.artifact));
    let zkey = dir.join("circuit_final.zkey");
    (wasm, zkey)
}

impl CircuitRegistry {
    /// Load all known circuits from the given directory.
    ///
    /// Expected directory structure:
    /// ```text
    /// circuits_dir/
    ///   HelloWorld/HelloWorld_js/HelloWorld.wasm
    ///   HelloWorld/circuit_final.zkey
    ///   Multiplier3/Multiplier3_js/Multiplier3.wasm
    ///   Multiplier3/circuit_final.zkey
    ///   Multiplier3_plonk/Multiplier3_js/Multiplier3.wasm
    ///   Multiplier3_plonk/circuit_final.zkey
    /// ```
    ///
    /// Circuits with a missing wasm or zkey are skipped.
    pub fn new(circuits_dir: &str) -> Arc<Self> {
        let base = PathBuf::from(circuits_dir);
        let mut circuits = HashMap::new();
        let mut metadata = HashMap::new();

        for (info, layout) in circuit_metadata() {
            let (wasm, zkey) = artifact_paths(&base, &layout);
            if !wasm.exists() || !zkey.exists() {
                tracing::warn!(
                    "Artifacts not found for {} ({} / {}), skipping",
                    info.id,
                    wasm.display(),
                    zkey.display()
                );
                continue;
            }

            tracing::info!("Loaded circuit: {} ({}) from {}", info.id, info.system, base.join(layout.dir).display());

            circuits.insert(
                info.id.clone(),
                CircuitArtifacts {
                    id: info.id.clone(),
                    system: info.system,
                    wasm,
                    zkey,
                },
            );
            metadata.insert(info.id.clone(), info);
        }

        tracing::info!("Circuit registry initialized: {} circuits loaded", circuits.len());

        Arc::new(Self { circuits, metadata })
    }

    /// Create an empty registry (for testing).
    #[cfg(test)]
    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            circuits: HashMap::new(),
            metadata: HashMap::new(),
        })
    }

    /// Create a registry with every known circuit and placeholder paths.
    #[cfg(test)]
    pub fn mock() -> Arc<Self> {
        let base = PathBuf::from("/mock/circuits");
        let mut circuits = HashMap::new();
        let mut metadata = HashMap::new();

        for (info, layout) in circuit_metadata() {
            let (wasm, zkey) = artifact_paths(&base, &layout);
            circuits.insert(
                info.id.clone(),
                CircuitArtifacts {
                    id: info.id.clone(),
                    system: info.system,
                    wasm,
                    zkey,
                },
            );
            metadata.insert(info.id.clone(), info);
        }

        Arc::new(Self { circuits, metadata })
    }

    /// Get circuit artifacts by ID.
    pub fn get(&self, circuit_id: &str) -> Result<&CircuitArtifacts, String> {
        self.circuits
            .get(circuit_id)
            .ok_or_else(|| format!("Circuit not found: {}", circuit_id))
    }

    /// Get metadata for all loaded circuits, sorted by ID.
    pub fn list_circuits(&self) -> Vec<CircuitInfo> {
        let mut list: Vec<CircuitInfo> = self.metadata.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }
}
