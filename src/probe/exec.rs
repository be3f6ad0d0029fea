// Exec probe - runs `openssl s_client` inside a pod and reads its transcript
//
// Used when the native probe cannot reach an endpoint from where the tool
// runs. `s_client` exits non-zero on any handshake failure, so an execution
// error never short-circuits: the transcript is always inspected.

use super::classifier::handshake_completed;
use super::ladder::{Attempt, HandshakeDriver, assess};
use super::{ProbeMode, ProbeSettings, Prober, TlsProbeResult};
use crate::ciphers::compute_disallowed_openssl_ciphers;
use crate::external::{ExecContext, RemoteExecutor, SClientCommand, SessionSummary};
use crate::policy::TlsPolicy;
use crate::protocols::Protocol;
use async_trait::async_trait;

const ALL_CIPHERS: &str = "ALL:@SECLEVEL=0";

/// Probe that runs `s_client` through a remote executor
pub struct ExecProber<'a> {
    executor: &'a dyn RemoteExecutor,
    context: &'a ExecContext,
    settings: ProbeSettings,
}

impl<'a> ExecProber<'a> {
    pub fn new(
        executor: &'a dyn RemoteExecutor,
        context: &'a ExecContext,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            executor,
            context,
            settings,
        }
    }

    fn command(&self, address: &str, port: u16) -> SClientCommand {
        SClientCommand::new(address, port)
            .openssl_path(&self.settings.openssl_path)
            .timeout(self.settings.exec_timeout)
    }

    /// Run one command; `accept` decides whether a completed handshake counts
    async fn run(&self, command: SClientCommand, accept: impl Fn(Protocol) -> bool + Send) -> Attempt {
        let line = match command.build() {
            Ok(line) => line,
            Err(e) => {
                return Attempt::Failed {
                    evidence: e.to_string(),
                };
            }
        };

        let output = self.executor.exec(self.context, &line).await;
        let transcript = output.transcript();

        match handshake_completed(&transcript) {
            Some(protocol) if accept(protocol) => Attempt::Accepted {
                protocol: Some(protocol),
                cipher: SessionSummary::parse(&transcript).cipher,
            },
            _ => Attempt::Failed {
                evidence: transcript,
            },
        }
    }
}

#[async_trait]
impl HandshakeDriver for ExecProber<'_> {
    fn mode(&self) -> ProbeMode {
        ProbeMode::Exec
    }

    async fn pinned(&self, address: &str, port: u16, version: Protocol) -> Attempt {
        let command = self.command(address, port).tls_version(version);
        let command = if version < Protocol::TLS13 {
            command.cipher(ALL_CIPHERS)
        } else {
            command
        };
        self.run(command, move |p| p == version).await
    }

    async fn at_most(&self, address: &str, port: u16, max: Protocol) -> Attempt {
        let command = self
            .command(address, port)
            .max_protocol(max)
            .cipher(ALL_CIPHERS);
        self.run(command, move |p| p <= max).await
    }

    async fn disallowed_ciphers(
        &self,
        address: &str,
        port: u16,
        policy: &TlsPolicy,
    ) -> Option<Attempt> {
        let selector = compute_disallowed_openssl_ciphers(policy.allowed_cipher_names());
        let command = self
            .command(address, port)
            .tls_version(Protocol::TLS12)
            .cipher(&selector);
        let attempt = self.run(command, |p| p == Protocol::TLS12).await;

        // A completed handshake without a readable cipher proves nothing
        Some(match attempt {
            Attempt::Accepted { cipher: None, .. } => Attempt::Failed {
                evidence: "no cipher reported".to_string(),
            },
            other => other,
        })
    }
}

#[async_trait]
impl Prober for ExecProber<'_> {
    async fn probe(&self, address: &str, port: u16, policy: &TlsPolicy) -> TlsProbeResult {
        assess(self, address, port, policy).await
    }

    fn mode(&self) -> ProbeMode {
        ProbeMode::Exec
    }
}

/// Probe `address:port` by running `s_client` in `context`
pub async fn probe_tls_via_exec(
    executor: &dyn RemoteExecutor,
    context: &ExecContext,
    address: &str,
    port: u16,
    policy: &TlsPolicy,
    settings: &ProbeSettings,
) -> TlsProbeResult {
    ExecProber::new(executor, context, settings.clone())
        .probe(address, port, policy)
        .await
}
