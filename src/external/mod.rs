// External tool integrations
// kubectl (cluster access, pod exec) and OpenSSL s_client

pub mod kubectl;
pub mod openssl_client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

pub use kubectl::Kubectl;
pub use openssl_client::{SClientCommand, SessionSummary};

/// Check if an external tool is available in PATH
pub fn check_tool_available(tool: &str) -> bool {
    Command::new("which")
        .arg(tool)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Identifies the container a command is executed in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecContext {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

impl ExecContext {
    pub fn new(namespace: &str, pod: &str, container: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
        }
    }
}

impl fmt::Display for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.pod, self.container)
    }
}

impl FromStr for ExecContext {
    type Err = String;

    /// Parse `namespace/pod/container`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [namespace, pod, container]
                if !namespace.is_empty() && !pod.is_empty() && !container.is_empty() =>
            {
                Ok(Self::new(namespace, pod, container))
            }
            _ => Err(format!(
                "Invalid exec context '{}', expected namespace/pod/container",
                s
            )),
        }
    }
}

/// Output of a remote command
///
/// `error` is set when the command could not be run or exited non-zero;
/// stdout is still populated in the latter case and must be inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ExecOutput {
    /// Everything the command printed plus the execution error, for classification
    pub fn transcript(&self) -> String {
        let mut text = self.stdout.clone();
        for extra in [Some(self.stderr.as_str()), self.error.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
        {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(extra);
        }
        text
    }
}

/// Runs a shell command inside a container
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    async fn exec(&self, context: &ExecContext, command: &str) -> ExecOutput;
}

/// Runs commands through the local `sh`, ignoring the exec context
///
/// Useful when the tool itself runs inside the cluster network.
pub struct LocalShellExecutor {
    timeout: Duration,
}

impl LocalShellExecutor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl RemoteExecutor for LocalShellExecutor {
    async fn exec(&self, _context: &ExecContext, command: &str) -> ExecOutput {
        let mut cmd = tokio::process::Command::new("sh");
        cmd.arg("-c").arg(command).kill_on_drop(true);
        run_captured(cmd, self.timeout, "sh").await
    }
}

/// Run a prepared command, folding spawn failures, timeouts and non-zero exits into `ExecOutput`
pub(crate) async fn run_captured(
    mut cmd: tokio::process::Command,
    limit: Duration,
    label: &str,
) -> ExecOutput {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = match tokio::time::timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ExecOutput {
                error: Some(format!("failed to run {}: {}", label, e)),
                ..Default::default()
            };
        }
        Err(_) => {
            return ExecOutput {
                error: Some(format!("{} did not finish within {:?}", label, limit)),
                ..Default::default()
            };
        }
    };

    let error = (!output.status.success()).then(|| match output.status.code() {
        Some(code) => format!("command terminated with exit code {}", code),
        None => "command terminated by signal".to_string(),
    });

    ExecOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_available() {
        assert!(check_tool_available("sh"));
        assert!(!check_tool_available("nonexistent_tool_xyz123"));
    }

    #[test]
    fn test_exec_context_parse() {
        let ctx: ExecContext = "probe-ns/probe-pod/probe".parse().unwrap();
        assert_eq!(ctx, ExecContext::new("probe-ns", "probe-pod", "probe"));
        assert_eq!(ctx.to_string(), "probe-ns/probe-pod/probe");

        assert!("probe-ns/probe-pod".parse::<ExecContext>().is_err());
        assert!("a//c".parse::<ExecContext>().is_err());
    }

    #[test]
    fn test_transcript_keeps_output_and_error() {
        let out = ExecOutput {
            stdout: "CONNECTED(00000003)".to_string(),
            stderr: String::new(),
            error: Some("command terminated with exit code 1".to_string()),
        };
        assert_eq!(
            out.transcript(),
            "CONNECTED(00000003)\ncommand terminated with exit code 1"
        );
        assert_eq!(ExecOutput::default().transcript(), "");
    }

    #[tokio::test]
    async fn test_local_shell_executor_reports_exit_code() {
        let executor = LocalShellExecutor::new(Duration::from_secs(5));
        let ctx = ExecContext::new("ns", "pod", "container");

        let out = executor.exec(&ctx, "echo hello; exit 3").await;
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(
            out.error.as_deref(),
            Some("command terminated with exit code 3")
        );

        let ok = executor.exec(&ctx, "echo ok").await;
        assert!(ok.error.is_none());
    }

    #[tokio::test]
    async fn test_local_shell_executor_timeout() {
        let executor = LocalShellExecutor::new(Duration::from_millis(200));
        let ctx = ExecContext::new("ns", "pod", "container");

        let out = executor.exec(&ctx, "sleep 5").await;
        assert!(out.error.unwrap().contains("did not finish"));
    }
}
