//! Calldata encoding and decoding.
//!
//! A (proof, public signals) pair is rendered into the textual calldata a
//! verifier contract's `verifyProof` call takes, then decoded back into typed
//! [`VerificationArgs`]. Between the two sits a flat token sequence: every
//! bracket, quote and whitespace character is dropped and the remainder is
//! split on commas. Positions in that sequence are fixed per proof system, so
//! a token that fails to parse is an error rather than something to skip.

use serde::Serialize;

use crate::error::DecodeError;
use crate::field::FieldElement;
use crate::proof::{Groth16Proof, PlonkProof, Proof, ProofSystem, PublicSignals};

/// Number of proof tokens ahead of the public inputs in Groth16 calldata.
pub const GROTH16_PROOF_TOKENS: usize = 8;

/// Textual calldata, as a verifier contract's call interface accepts it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Calldata(String);

impl Calldata {
    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The typed argument tuple passed to the verification endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VerificationArgs {
    Groth16 {
        a: [FieldElement; 2],
        b: [[FieldElement; 2]; 2],
        c: [FieldElement; 2],
        input: Vec<FieldElement>,
    },
    Plonk {
        proof: String,
        input: Vec<FieldElement>,
    },
}

impl VerificationArgs {
    /// Well-shaped arguments with every value zero. Never a valid proof.
    #[cfg(test)]
    pub fn zeroed(system: ProofSystem, inputs: usize) -> Self {
        let z = FieldElement::default;
        match system {
            ProofSystem::Groth16 => VerificationArgs::Groth16 {
                a: [z(), z()],
                b: [[z(), z()], [z(), z()]],
                c: [z(), z()],
                input: vec![z(); inputs],
            },
            ProofSystem::Plonk => VerificationArgs::Plonk {
                proof: "0".to_string(),
                input: vec![z(); inputs],
            },
        }
    }

    pub fn system(&self) -> ProofSystem {
        match self {
            VerificationArgs::Groth16 { .. } => ProofSystem::Groth16,
            VerificationArgs::Plonk { .. } => ProofSystem::Plonk,
        }
    }

    pub fn public_inputs(&self) -> &[FieldElement] {
        match self {
            VerificationArgs::Groth16 { input, .. } | VerificationArgs::Plonk { input, .. } => {
                input
            }
        }
    }
}

/// Calldata together with the arguments decoded from it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Encoded {
    pub calldata: Calldata,
    pub args: VerificationArgs,
}

/// Render `proof` and `signals` as calldata text.
pub fn encode(proof: &Proof, signals: &PublicSignals) -> Result<Calldata, DecodeError> {
    match proof {
        Proof::Groth16(g) => encode_groth16(g, signals),
        Proof::Plonk(p) => encode_plonk(p, signals),
    }
}

/// Decode calldata text for `system` into verification arguments.
pub fn decode(system: ProofSystem, calldata: &Calldata) -> Result<VerificationArgs, DecodeError> {
    match system {
        ProofSystem::Groth16 => decode_groth16(calldata),
        ProofSystem::Plonk => decode_plonk(calldata),
    }
}

/// Encode, then decode the result back into arguments.
pub fn encode_args(proof: &Proof, signals: &PublicSignals) -> Result<Encoded, DecodeError> {
    let calldata = encode(proof, signals)?;
    let args = decode(proof.system(), &calldata)?;
    Ok(Encoded { calldata, args })
}

fn encode_groth16(proof: &Groth16Proof, signals: &PublicSignals) -> Result<Calldata, DecodeError> {
    let a = quoted_list(&proof.a, "a")?;
    let b0 = quoted_list(&proof.b[0], "b[0]")?;
    let b1 = quoted_list(&proof.b[1], "b[1]")?;
    let c = quoted_list(&proof.c, "c")?;
    let input = quoted_list(signals.as_slice(), "publicSignals")?;
    Ok(Calldata(format!("{},[{},{}],{},{}", a, b0, b1, c, input)))
}

fn encode_plonk(proof: &PlonkProof, signals: &PublicSignals) -> Result<Calldata, DecodeError> {
    let input = quoted_list(signals.as_slice(), "publicSignals")?;
    Ok(Calldata(format!("{},{}", proof.to_hex(), input)))
}

fn decode_groth16(calldata: &Calldata) -> Result<VerificationArgs, DecodeError> {
    let mut tokens = flat_tokens(calldata.as_str())?;
    if tokens.len() < GROTH16_PROOF_TOKENS {
        return Err(DecodeError::TooFewTokens {
            expected: GROTH16_PROOF_TOKENS,
            actual: tokens.len(),
        });
    }
    let input = tokens.split_off(GROTH16_PROOF_TOKENS);
    let mut t = tokens.into_iter();
    // Length checked above.
    let mut next = || t.next().unwrap_or_default();
    Ok(VerificationArgs::Groth16 {
        a: [next(), next()],
        b: [[next(), next()], [next(), next()]],
        c: [next(), next()],
        input,
    })
}

/// The proof token keeps its original text: it is handed to the endpoint as
/// an opaque blob, not as a number.
fn decode_plonk(calldata: &Calldata) -> Result<VerificationArgs, DecodeError> {
    let text = calldata.as_str();
    let proof = text.split(',').next().unwrap_or_default().trim();
    let stripped = strip_syntax(proof);
    if FieldElement::parse_raw(&stripped).is_none() {
        return Err(DecodeError::InvalidToken { token: stripped });
    }

    let tokens = flat_tokens(text)?;
    if tokens.is_empty() {
        return Err(DecodeError::TooFewTokens {
            expected: 1,
            actual: 0,
        });
    }
    Ok(VerificationArgs::Plonk {
        proof: proof.to_string(),
        input: tokens[1..].to_vec(),
    })
}

/// `["0x..","0x.."]` with every value as a 32-byte hex word.
fn quoted_list(values: &[FieldElement], name: &str) -> Result<String, DecodeError> {
    let words = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.to_hex_word()
                .map(|w| format!("\"{}\"", w))
                .ok_or_else(|| DecodeError::WordOverflow {
                    field: format!("{}[{}]", name, i),
                    bits: v.bits(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", words.join(",")))
}

fn strip_syntax(s: &str) -> String {
    s.chars()
        .filter(|ch| !matches!(ch, '"' | '[' | ']') && !ch.is_whitespace())
        .collect()
}

/// Flatten calldata text into field elements.
///
/// A comma-separated segment that consists only of brackets (an empty list
/// such as `[]`) contributes no token; any other segment that strips down to
/// nothing is malformed.
fn flat_tokens(text: &str) -> Result<Vec<FieldElement>, DecodeError> {
    let mut tokens = Vec::new();
    for segment in text.split(',') {
        let token = strip_syntax(segment);
        if token.is_empty() && segment.contains('[') && segment.contains(']') {
            continue;
        }
        tokens.push(token.parse()?);
    }
    Ok(tokens)
}
