// OpenSSL s_client integration
// Builds the shell command run inside a probe pod and reads back its transcript

use crate::Result;
use crate::protocols::Protocol;
use crate::security::{validate_cipher, validate_command_path, validate_hostname, validate_port};
use crate::utils::network::endpoint_string;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `openssl s_client` invocation, rendered as a single `sh -c` string
///
/// stdin is fed from `echo` so the client exits right after the handshake,
/// the whole run is bounded by coreutils `timeout`, and stderr is folded into
/// stdout because the error lines are what the classifier reads.
#[derive(Debug, Clone)]
pub struct SClientCommand {
    openssl_path: String,
    host: String,
    port: u16,
    tls_version: Option<Protocol>,
    max_protocol: Option<Protocol>,
    cipher: Option<String>,
    timeout: Duration,
}

impl SClientCommand {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            openssl_path: "openssl".to_string(),
            host: host.to_string(),
            port,
            tls_version: None,
            max_protocol: None,
            cipher: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn openssl_path(mut self, path: &str) -> Self {
        self.openssl_path = path.to_string();
        self
    }

    /// Pin the handshake to exactly one version (`-tls1_2` etc.)
    pub fn tls_version(mut self, version: Protocol) -> Self {
        self.tls_version = Some(version);
        self
    }

    /// Offer every version up to and including `version`
    pub fn max_protocol(mut self, version: Protocol) -> Self {
        self.max_protocol = Some(version);
        self
    }

    pub fn cipher(mut self, cipher: &str) -> Self {
        self.cipher = Some(cipher.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render the command line
    ///
    /// Every interpolated value is validated first; the result is safe to
    /// hand to `sh -c`.
    pub fn build(&self) -> Result<String> {
        // SECURITY: Validate all inputs to prevent command injection (CWE-78)
        validate_command_path(&self.openssl_path)?;
        validate_hostname(&self.host)?;
        validate_port(self.port)?;

        let mut args = vec![
            "s_client".to_string(),
            "-connect".to_string(),
            endpoint_string(&self.host, self.port),
        ];

        if let Some(version) = self.tls_version {
            args.push(version.openssl_flag().to_string());
        }

        if let Some(version) = self.max_protocol {
            args.push("-max_protocol".to_string());
            args.push(version.openssl_name().to_string());
        }

        if let Some(ref cipher) = self.cipher {
            validate_cipher(cipher)?;
            args.push("-cipher".to_string());
            args.push(cipher.clone());
        }

        Ok(format!(
            "echo | timeout {} {} {} 2>&1",
            self.timeout.as_secs().max(1),
            self.openssl_path,
            args.join(" ")
        ))
    }
}

/// Fields extracted from an `s_client` transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// A TCP connection was established (`CONNECTED(...)`)
    pub connected: bool,
    /// Protocol from the first `Protocol:` / `Protocol  :` line
    pub protocol: Option<String>,
    /// Negotiated cipher; `0000` and `(NONE)` are treated as absent
    pub cipher: Option<String>,
    /// `Cipher is (NONE)` was printed
    pub cipher_none: bool,
}

impl SessionSummary {
    pub fn parse(transcript: &str) -> Self {
        let mut summary = SessionSummary::default();

        for line in transcript.lines() {
            let line = line.trim();

            if line.starts_with("CONNECTED(") {
                summary.connected = true;
            } else if line.contains("Cipher is (NONE)") {
                summary.cipher_none = true;
            }

            if summary.protocol.is_none()
                && let Some(value) = field_value(line, "Protocol")
            {
                summary.protocol = Some(value.to_string());
            }

            if summary.cipher.is_none()
                && let Some(value) = field_value(line, "Cipher")
                && value != "0000"
                && value != "(NONE)"
            {
                summary.cipher = Some(value.to_string());
            }
        }

        summary
    }

    /// The reported protocol, if it is one this crate knows
    pub fn negotiated_protocol(&self) -> Option<Protocol> {
        self.protocol.as_deref().and_then(|p| p.parse().ok())
    }
}

/// Value of a `Name : value` line with arbitrary padding before the colon
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?.trim_start().strip_prefix(':')?;
    let value = rest.trim();
    (!value.is_empty()).then_some(value)
}
