// Verification endpoint boundary.
//
// The endpoint owns all of the pairing / polynomial-commitment arithmetic and
// answers with a bare boolean. A `false` carries no reason code, and a
// well-typed but meaningless argument tuple (all zeros, a point off the curve)
// is a legitimate question whose answer is `false`, not an error.

use std::time::Duration;

use crate::calldata::VerificationArgs;
use crate::command;
use crate::error::BoundaryError;

/// Something that can answer "do these arguments verify?".
///
/// Calls are single-shot and blocking; retries and timeouts, if any, are the
/// implementor's business.
pub trait VerificationEndpoint: Send + Sync {
    fn verify(&self, args: &VerificationArgs) -> Result<bool, BoundaryError>;
}

/// Runs an external verifier process per call.
///
/// The process receives `{"system": ..., "args": ...}` on stdin and must print
/// a single JSON boolean on stdout.
#[derive(Clone, Debug)]
pub struct CommandEndpoint {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandEndpoint {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Build from a whitespace-separated command line. `None` if it is blank.
    pub fn from_command_line(command_line: &str, timeout: Duration) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect(), timeout))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl VerificationEndpoint for CommandEndpoint {
    fn verify(&self, args: &VerificationArgs) -> Result<bool, BoundaryError> {
        let request = serde_json::json!({
            "system": args.system(),
            "args": args,
        });

        tracing::info!(
            "Invoking verifier {} system={} inputs={}",
            self.program,
            args.system(),
            args.public_inputs().len()
        );

        let stdout = command::run(
            &self.program,
            &self.args,
            Some(request.to_string().as_bytes()),
            None,
            self.timeout,
        )?;
        parse_verdict(&self.program, &stdout)
    }
}

fn parse_verdict(program: &str, stdout: &str) -> Result<bool, BoundaryError> {
    match serde_json::from_str::<serde_json::Value>(stdout.trim()) {
        Ok(serde_json::Value::Bool(verdict)) => Ok(verdict),
        _ => Err(BoundaryError::MalformedResponse {
            program: program.to_string(),
            detail: format!("expected `true` or `false`, got {:?}", stdout.trim()),
        }),
    }
}
