// External process execution for the proving backend and verification endpoint adapters.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::BoundaryError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run `program` to completion and return its stdout.
///
/// Stdout and stderr are drained on helper threads and `stdin` is fed from
/// another, so a full pipe in either direction never delays the timeout.
/// The child is killed once `timeout` elapses.
pub fn run(
    program: &str,
    args: &[String],
    stdin: Option<&[u8]>,
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<String, BoundaryError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let mut child = command.spawn().map_err(|e| BoundaryError::Unreachable {
        program: program.to_string(),
        reason: e.to_string(),
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    feed(program, stdin, child.stdin.take());

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    child.kill().ok();
                    child.wait().ok();
                    return Err(BoundaryError::Timeout {
                        program: program.to_string(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(BoundaryError::Io {
                    context: format!("Failed to wait for {}", program),
                    reason: e.to_string(),
                })
            }
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if status.success() {
        tracing::debug!("{} stdout: {}", program, stdout.trim());
        Ok(stdout)
    } else {
        Err(BoundaryError::Failed {
            program: program.to_string(),
            status: status.to_string(),
            output: if stderr.trim().is_empty() { stdout } else { stderr },
        })
    }
}

/// Write `input` on a helper thread, then close the pipe. The thread ends
/// with a broken pipe once the child exits or is killed.
fn feed(program: &str, input: Option<&[u8]>, pipe: Option<ChildStdin>) {
    let (Some(input), Some(mut pipe)) = (input, pipe) else {
        return;
    };
    let input = input.to_vec();
    let program = program.to_string();
    thread::spawn(move || {
        if let Err(e) = pipe.write_all(&input) {
            // A child that exits without reading its input still gets its
            // exit status reported.
            tracing::warn!("Failed to write stdin of {}: {}", program, e);
        }
    });
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = String::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_string(&mut buf).ok();
        }
        buf
    })
}
