// kubectl integration - reads cluster objects and executes commands in pods

use super::{ExecContext, ExecOutput, RemoteExecutor, run_captured};
use crate::Result;
use crate::error::TlsError;
use crate::security::validate_resource_name;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::process::Command;

/// Thin wrapper around the `kubectl` binary
#[derive(Debug, Clone)]
pub struct Kubectl {
    path: String,
    timeout: Duration,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self::new("kubectl")
    }
}

impl Kubectl {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Run `kubectl <args> -o json` and decode the result
    pub async fn get_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let mut cmd = Command::new(&self.path);
        cmd.args(args).args(["-o", "json"]).kill_on_drop(true);

        let command_line = format!("{} {} -o json", self.path, args.join(" "));
        tracing::debug!("Running {}", command_line);

        let output = run_captured(cmd, self.timeout, &self.path).await;
        if let Some(error) = output.error {
            return Err(TlsError::CommandFailed {
                command: command_line,
                details: format!("{}: {}", error, output.stderr.trim()),
            }
            .into());
        }

        let value = serde_json::from_str(&output.stdout).map_err(TlsError::from)?;
        Ok(value)
    }
}

#[async_trait]
impl RemoteExecutor for Kubectl {
    async fn exec(&self, context: &ExecContext, command: &str) -> ExecOutput {
        for name in [&context.namespace, &context.pod, &context.container] {
            if let Err(e) = validate_resource_name(name) {
                return ExecOutput {
                    error: Some(e.to_string()),
                    ..Default::default()
                };
            }
        }

        let mut cmd = Command::new(&self.path);
        cmd.args([
            "exec",
            "-n",
            &context.namespace,
            &context.pod,
            "-c",
            &context.container,
            "--",
            "sh",
            "-c",
            command,
        ])
        .kill_on_drop(true);

        tracing::trace!("kubectl exec in {}: {}", context, command);
        run_captured(cmd, self.timeout, &self.path).await
    }
}
