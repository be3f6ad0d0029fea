// Result classifier - maps handshake failure evidence to an outcome class
//
// Native handshake errors and `s_client` transcripts both carry OpenSSL's
// error strings, so one marker table serves both probes. Markers are checked
// in a fixed order: connection failures, then TLS alerts, then non-TLS
// artifacts. TLS alerts must win over non-TLS artifacts because a server that
// sends a protocol_version alert and then closes also produces an EOF.

use super::{NegotiatedVersion, ProbeMode, TlsProbeResult};
use crate::external::SessionSummary;
use crate::policy::TlsPolicy;
use crate::protocols::Protocol;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Maximum evidence length quoted in a reason
pub const EVIDENCE_LIMIT: usize = 200;

/// Outcome class of a failed handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// Nothing is listening, or the connection never completed
    Unreachable,
    /// A TLS peer answered and refused the offer
    TlsRejected,
    /// Something answered, but not with TLS
    NonTls,
    /// No recognizable marker
    Inconclusive,
}

const CONNECTION_MARKERS: &[&str] = &[
    "connection refused",
    "timed out",
    "i/o timeout",
    "no route to host",
    "network is unreachable",
    "connect:errno=",
    // coreutils `timeout` killed a stalled s_client
    "exit code 124",
    // the executor gave up on the command
    "did not finish",
];

const REJECTION_MARKERS: &[&str] = &[
    "alert protocol version",
    "alert handshake failure",
    "handshake failure",
    "tlsv1 alert",
    "sslv3 alert",
    "tlsv13 alert",
    "ssl alert number",
    "unsupported protocol",
    "unsupported versions",
];

const NON_TLS_MARKERS: &[&str] = &[
    "wrong version number",
    "packet length too long",
    "record layer failure",
    "unexpected eof",
    "first record does not look like a tls handshake",
    "connected(",
];

lazy_static! {
    static ref EOF_WORD: Regex = Regex::new(r"\beof\b").expect("valid regex");
}

/// Classify the evidence left by a failed handshake attempt
pub fn classify_failure(evidence: &str) -> Classification {
    let text = evidence.to_lowercase();

    if CONNECTION_MARKERS.iter().any(|m| text.contains(m)) {
        Classification::Unreachable
    } else if REJECTION_MARKERS.iter().any(|m| text.contains(m)) {
        Classification::TlsRejected
    } else if NON_TLS_MARKERS.iter().any(|m| text.contains(m)) || EOF_WORD.is_match(&text) {
        Classification::NonTls
    } else {
        Classification::Inconclusive
    }
}

/// Whether the evidence contains a TLS alert or version refusal
pub fn shows_rejection(evidence: &str) -> bool {
    let text = evidence.to_lowercase();
    REJECTION_MARKERS.iter().any(|m| text.contains(m))
}

/// Protocol of a transcript that shows a completed handshake, if any
///
/// `s_client` prints the attempted protocol even when the server refused
/// it, so a `Protocol` line alone proves nothing: the transcript must also be
/// free of alerts and of `Cipher is (NONE)`.
pub fn handshake_completed(transcript: &str) -> Option<Protocol> {
    if shows_rejection(transcript) {
        return None;
    }
    let summary = SessionSummary::parse(transcript);
    if summary.cipher_none {
        return None;
    }
    summary.negotiated_protocol()
}

/// Build the result for a failed handshake at the policy's minimum version
pub fn min_version_failure(
    class: Classification,
    policy: &TlsPolicy,
    mode: ProbeMode,
    evidence: &str,
) -> TlsProbeResult {
    let min = policy.min_version();
    match class {
        Classification::Unreachable => TlsProbeResult::unreachable(mode.annotate(format!(
            "port unreachable: {}",
            truncate(evidence, EVIDENCE_LIMIT)
        ))),
        Classification::TlsRejected => TlsProbeResult::non_compliant(
            Some(NegotiatedVersion::Below(min)),
            mode.annotate(format!(
                "server does not support {} (minimum for {} profile)",
                min,
                policy.profile_type()
            )),
        ),
        Classification::NonTls => {
            TlsProbeResult::non_tls(mode.annotate("non-TLS service (informational)".to_string()))
        }
        Classification::Inconclusive => TlsProbeResult::unreachable(mode.annotate(format!(
            "probe inconclusive: {}",
            truncate(evidence, EVIDENCE_LIMIT)
        ))),
    }
}

/// Shorten `text` to at most `limit` characters, marking the cut with "..."
pub fn truncate(text: &str, limit: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
