use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::field::{FieldElement, WORD_BYTES};
use crate::normalize::Normalized;

/// The proof systems a verification endpoint can be asked about.
///
/// Always chosen explicitly by the caller; never inferred from the shape of a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofSystem {
    Groth16,
    Plonk,
}

impl ProofSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProofSystem::Groth16 => "groth16",
            ProofSystem::Plonk => "plonk",
        }
    }
}

impl fmt::Display for ProofSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Groth16 proof in the coordinate order the verification endpoint expects.
///
/// `b` is a point over the quadratic extension field; each of its rows holds
/// the (imaginary, real) coefficients, i.e. swapped relative to snarkjs' `pi_b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16Proof {
    pub a: [FieldElement; 2],
    pub b: [[FieldElement; 2]; 2],
    pub c: [FieldElement; 2],
}

impl Groth16Proof {
    /// Build from a normalized snarkjs proof object (`pi_a`, `pi_b`, `pi_c`).
    pub fn from_snarkjs(proof: &Normalized) -> Result<Self, DecodeError> {
        let a = g1_point(field(proof, "pi_a")?, "pi_a")?;
        let c = g1_point(field(proof, "pi_c")?, "pi_c")?;

        let pi_b = field(proof, "pi_b")?;
        let rows = sequence(pi_b, "pi_b", 2, 3)?;
        let x = pair(&rows[0], "pi_b[0]")?;
        let y = pair(&rows[1], "pi_b[1]")?;

        Ok(Self {
            a,
            b: [[x[1].clone(), x[0].clone()], [y[1].clone(), y[0].clone()]],
            c,
        })
    }
}

// Calldata blob layout: all nine G1 commitments, then the evaluations.
const PLONK_POINTS: [&str; 9] = ["A", "B", "C", "Z", "T1", "T2", "T3", "Wxi", "Wxiw"];
const PLONK_EVALUATIONS: [&str; 6] = ["eval_a", "eval_b", "eval_c", "eval_s1", "eval_s2", "eval_zw"];

/// A PLONK proof as an ordered list of 256-bit words.
///
/// The endpoint consumes it as one opaque blob; its internal layout is never
/// decomposed again after serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlonkProof {
    words: Vec<FieldElement>,
}

impl PlonkProof {
    pub fn new(words: Vec<FieldElement>) -> Result<Self, DecodeError> {
        for (i, w) in words.iter().enumerate() {
            if w.bits() > (WORD_BYTES * 8) as u64 {
                return Err(DecodeError::WordOverflow {
                    field: format!("proof word {}", i),
                    bits: w.bits(),
                });
            }
        }
        Ok(Self { words })
    }

    /// Build from a normalized snarkjs PLONK proof object.
    ///
    /// `eval_r` is only emitted by older snarkjs releases and is serialized
    /// last when present.
    pub fn from_snarkjs(proof: &Normalized) -> Result<Self, DecodeError> {
        let mut words = Vec::with_capacity(32);
        for name in PLONK_POINTS {
            words.extend(g1_point(field(proof, name)?, name)?);
        }
        for name in PLONK_EVALUATIONS {
            words.push(scalar(field(proof, name)?, name)?);
        }
        if let Some(eval_r) = proof.get("eval_r") {
            words.push(scalar(eval_r, "eval_r")?);
        }
        Self::new(words)
    }

    #[cfg(test)]
    pub fn words(&self) -> &[FieldElement] {
        &self.words
    }

    /// The serialized blob: `0x` followed by every word as 32 big-endian bytes.
    pub fn to_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(self.words.len() * WORD_BYTES);
        for w in &self.words {
            // Width was checked in `new`.
            bytes.extend_from_slice(&w.to_word().unwrap_or_default());
        }
        format!("0x{}", hex::encode(bytes))
    }
}

/// Public signals in the order the proving backend emitted them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicSignals(Vec<FieldElement>);

impl PublicSignals {
    #[cfg(test)]
    pub fn new(signals: Vec<FieldElement>) -> Self {
        Self(signals)
    }

    pub fn from_normalized(signals: &Normalized) -> Result<Self, DecodeError> {
        let items = signals.as_sequence().ok_or_else(|| DecodeError::NotSequence {
            field: "publicSignals".to_string(),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| scalar(item, &format!("publicSignals[{}]", i)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn as_slice(&self) -> &[FieldElement] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A proof of either supported system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Proof {
    Groth16(Groth16Proof),
    Plonk(PlonkProof),
}

impl Proof {
    pub fn from_snarkjs(system: ProofSystem, proof: &Normalized) -> Result<Self, DecodeError> {
        match system {
            ProofSystem::Groth16 => Groth16Proof::from_snarkjs(proof).map(Proof::Groth16),
            ProofSystem::Plonk => PlonkProof::from_snarkjs(proof).map(Proof::Plonk),
        }
    }

    pub fn system(&self) -> ProofSystem {
        match self {
            Proof::Groth16(_) => ProofSystem::Groth16,
            Proof::Plonk(_) => ProofSystem::Plonk,
        }
    }
}

fn field<'a>(proof: &'a Normalized, name: &str) -> Result<&'a Normalized, DecodeError> {
    proof.get(name).ok_or_else(|| DecodeError::MissingField {
        field: name.to_string(),
    })
}

fn scalar(node: &Normalized, name: &str) -> Result<FieldElement, DecodeError> {
    node.as_scalar()
        .cloned()
        .ok_or_else(|| DecodeError::NotNumeric {
            field: name.to_string(),
        })
}

fn sequence<'a>(
    node: &'a Normalized,
    name: &str,
    min: usize,
    max: usize,
) -> Result<&'a [Normalized], DecodeError> {
    let items = node.as_sequence().ok_or_else(|| DecodeError::NotSequence {
        field: name.to_string(),
    })?;
    if items.len() < min || items.len() > max {
        return Err(DecodeError::Arity {
            field: name.to_string(),
            expected: min,
            actual: items.len(),
        });
    }
    Ok(items)
}

/// Exactly two scalars.
fn pair(node: &Normalized, name: &str) -> Result<[FieldElement; 2], DecodeError> {
    let items = sequence(node, name, 2, 2)?;
    Ok([
        scalar(&items[0], &format!("{}[0]", name))?,
        scalar(&items[1], &format!("{}[1]", name))?,
    ])
}

/// An affine G1 point, optionally followed by its projective `z` coordinate,
/// which is dropped.
fn g1_point(node: &Normalized, name: &str) -> Result<[FieldElement; 2], DecodeError> {
    let items = sequence(node, name, 2, 3)?;
    Ok([
        scalar(&items[0], &format!("{}[0]", name))?,
        scalar(&items[1], &format!("{}[1]", name))?,
    ])
}
