use std::time::Duration;

/// Service configuration, read once from the environment at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub circuits_dir: String,
    pub snarkjs_path: String,
    /// Whitespace-separated verifier command line; `None` disables `/verify` and `/prove`.
    pub verifier_cmd: Option<String>,
    pub command_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(4004);

        let circuits_dir = lookup("CIRCUITS_DIR").unwrap_or_else(|| "./circuits".to_string());
        let snarkjs_path = lookup("SNARKJS_PATH").unwrap_or_else(|| "snarkjs".to_string());
        let verifier_cmd = lookup("VERIFIER_CMD").filter(|v| !v.trim().is_empty());

        let command_timeout = Duration::from_secs(
            lookup("COMMAND_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        );

        Self {
            port,
            circuits_dir,
            snarkjs_path,
            verifier_cmd,
            command_timeout,
        }
    }
}
