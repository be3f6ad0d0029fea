// Assessment ladder shared by the native and exec probes

use super::classifier::{self, EVIDENCE_LIMIT, classify_failure, truncate};
use super::{NegotiatedVersion, ProbeMode, TlsProbeResult};
use crate::policy::TlsPolicy;
use crate::protocols::Protocol;
use async_trait::async_trait;

/// Result of one handshake attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Accepted {
        protocol: Option<Protocol>,
        cipher: Option<String>,
    },
    /// `evidence` is the text the classifier reads
    Failed { evidence: String },
}

/// The handshakes a probe must be able to perform
#[async_trait]
pub trait HandshakeDriver: Send + Sync {
    fn mode(&self) -> ProbeMode;

    /// Handshake pinned to exactly `version`
    async fn pinned(&self, address: &str, port: u16, version: Protocol) -> Attempt;

    /// Handshake offering TLS 1.0 through `max`
    async fn at_most(&self, address: &str, port: u16, max: Protocol) -> Attempt;

    /// TLS 1.2 handshake offering only suites the policy disallows
    ///
    /// `None` when there is nothing to offer.
    async fn disallowed_ciphers(
        &self,
        address: &str,
        port: u16,
        policy: &TlsPolicy,
    ) -> Option<Attempt>;
}

/// Run the full assessment of one endpoint
pub async fn assess<D: HandshakeDriver + ?Sized>(
    driver: &D,
    address: &str,
    port: u16,
    policy: &TlsPolicy,
) -> TlsProbeResult {
    let mode = driver.mode();
    let min = policy.min_version();
    let profile = policy.profile_type();

    for version in Protocol::versions_from(min) {
        if let Attempt::Failed { evidence } = driver.pinned(address, port, version).await {
            if version == min {
                let class = classify_failure(&evidence);
                tracing::debug!(
                    "{}:{} failed {} handshake ({:?})",
                    address,
                    port,
                    version,
                    class
                );
                return classifier::min_version_failure(class, policy, mode, &evidence);
            }
            // Any failure above the minimum counts: the endpoint is known to speak TLS
            return TlsProbeResult::non_compliant(
                Some(NegotiatedVersion::Exactly(min)),
                mode.annotate(format!(
                    "server does not support {} (required by {} profile): {}",
                    version,
                    profile,
                    truncate(&evidence, EVIDENCE_LIMIT)
                )),
            );
        }
    }

    if let Some(below) = min.below()
        && let Attempt::Accepted { protocol, .. } = driver.at_most(address, port, below).await
    {
        let negotiated = protocol
            .map(NegotiatedVersion::Exactly)
            .unwrap_or(NegotiatedVersion::Below(min));
        return TlsProbeResult::non_compliant(
            Some(negotiated),
            mode.annotate(format!(
                "server accepts {} ({} minimum required by {} profile)",
                negotiated, min, profile
            )),
        );
    }

    if policy.checks_ciphers()
        && let Some(Attempt::Accepted { cipher, .. }) =
            driver.disallowed_ciphers(address, port, policy).await
    {
        let cipher = cipher.unwrap_or_else(|| "(unknown)".to_string());
        return TlsProbeResult::non_compliant(
            Some(NegotiatedVersion::Exactly(Protocol::TLS12)),
            mode.annotate(format!(
                "server accepted disallowed cipher {} (not in {} profile)",
                cipher, profile
            )),
        );
    }

    TlsProbeResult::compliant(
        NegotiatedVersion::Exactly(min),
        mode.annotate(format!("server honors {} profile (min {})", profile, min)),
    )
}
