// Probe module - Checks whether a TLS endpoint honors a security policy
//
// Two probes implement the same three-step assessment (version ladder,
// downgrade check, disallowed-cipher check): the native probe drives OpenSSL
// in-process, the exec probe runs `openssl s_client` inside a cluster pod.

pub mod classifier;
pub mod exec;
pub mod ladder;
pub mod native;

use crate::policy::TlsPolicy;
use crate::protocols::Protocol;
use async_trait::async_trait;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

pub use classifier::{Classification, classify_failure};
pub use exec::{ExecProber, probe_tls_via_exec};
pub use ladder::{Attempt, HandshakeDriver, assess};
pub use native::{NativeProber, probe_tls};

/// Timeouts and tool paths shared by both probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// TCP connect timeout, also applied to socket reads/writes during the handshake
    pub dial_timeout: Duration,
    /// Upper bound for one `s_client` run inside a pod
    pub exec_timeout: Duration,
    pub openssl_path: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            dial_timeout: Duration::from_secs(5),
            exec_timeout: Duration::from_secs(5),
            openssl_path: "openssl".to_string(),
        }
    }
}

/// Which probe produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    Native,
    Exec,
}

impl ProbeMode {
    /// Tag a reason with the probe that produced it
    pub fn annotate(&self, reason: String) -> String {
        match self {
            ProbeMode::Native => reason,
            ProbeMode::Exec => format!("{} (via exec probe)", reason),
        }
    }
}

/// Version observed (or inferred) during a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiatedVersion {
    Exactly(Protocol),
    /// The server refused `Protocol`; whatever it speaks is older
    Below(Protocol),
}

impl fmt::Display for NegotiatedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiatedVersion::Exactly(p) => write!(f, "{}", p),
            NegotiatedVersion::Below(p) => write!(f, "< {}", p),
        }
    }
}

impl Serialize for NegotiatedVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of probing one endpoint
///
/// Only the constructors below build results, so the flag combinations stay
/// consistent: unreachable or non-TLS endpoints are always compliant, and a
/// non-compliant endpoint is always a reachable TLS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsProbeResult {
    pub compliant: bool,
    pub reachable: bool,
    pub is_tls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negotiated_version: Option<NegotiatedVersion>,
    pub reason: String,
}

impl TlsProbeResult {
    pub fn unreachable(reason: String) -> Self {
        Self {
            compliant: true,
            reachable: false,
            is_tls: false,
            negotiated_version: None,
            reason,
        }
    }

    pub fn non_tls(reason: String) -> Self {
        Self {
            compliant: true,
            reachable: true,
            is_tls: false,
            negotiated_version: None,
            reason,
        }
    }

    pub fn compliant(negotiated_version: NegotiatedVersion, reason: String) -> Self {
        Self {
            compliant: true,
            reachable: true,
            is_tls: true,
            negotiated_version: Some(negotiated_version),
            reason,
        }
    }

    pub fn non_compliant(negotiated_version: Option<NegotiatedVersion>, reason: String) -> Self {
        Self {
            compliant: false,
            reachable: true,
            is_tls: true,
            negotiated_version,
            reason,
        }
    }
}

/// A probe that assesses one endpoint against a policy
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: &str, port: u16, policy: &TlsPolicy) -> TlsProbeResult;

    fn mode(&self) -> ProbeMode;
}
