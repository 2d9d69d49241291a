use std::time::Duration;

use crate::pipeline::Stage;

/// A proof, public-signal set or calldata token could not be turned into
/// well-aligned verification arguments.
///
/// Always fatal to the current invocation: the verification endpoint is never
/// called with arguments that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("token {token:?} is not a valid field element")]
    InvalidToken { token: String },
    #[error("field `{field}` is missing")]
    MissingField { field: String },
    #[error("field `{field}` is not numeric")]
    NotNumeric { field: String },
    #[error("field `{field}` is not a sequence")]
    NotSequence { field: String },
    #[error("field `{field}` has {actual} components, expected {expected}")]
    Arity {
        field: String,
        expected: usize,
        actual: usize,
    },
    #[error("field `{field}` is {bits} bits wide and does not fit a 256-bit word")]
    WordOverflow { field: String, bits: u64 },
    #[error("calldata has {actual} tokens, expected at least {expected}")]
    TooFewTokens { expected: usize, actual: usize },
}

/// An external collaborator (proving backend or verification endpoint) could
/// not be reached or answered with something unusable.
///
/// Surfaced unmodified; nothing in this crate retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoundaryError {
    #[error("failed to spawn {program}: {reason}")]
    Unreachable { program: String, reason: String },
    #[error("{program} exited with status {status}: {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },
    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("malformed response from {program}: {detail}")]
    MalformedResponse { program: String, detail: String },
    #[error("{context}: {reason}")]
    Io { context: String, reason: String },
}

/// Why a pipeline invocation stopped before producing a verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("{stage} failed: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: DecodeError,
    },
    #[error("{stage} failed: {source}")]
    Boundary {
        stage: Stage,
        #[source]
        source: BoundaryError,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Decode { stage, .. } | PipelineError::Boundary { stage, .. } => *stage,
        }
    }
}
