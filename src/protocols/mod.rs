// Protocols module - TLS protocol versions assessed by the compliance probes

use openssl::ssl::SslVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// TLS protocol versions, ordered from oldest to newest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum Protocol {
    TLS10,
    TLS11,
    TLS12,
    TLS13,
}

impl Protocol {
    /// Get protocol version as hex value
    pub fn as_hex(&self) -> u16 {
        match self {
            Protocol::TLS10 => 0x0301,
            Protocol::TLS11 => 0x0302,
            Protocol::TLS12 => 0x0303,
            Protocol::TLS13 => 0x0304,
        }
    }

    /// Get protocol name
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::TLS10 => "TLS 1.0",
            Protocol::TLS11 => "TLS 1.1",
            Protocol::TLS12 => "TLS 1.2",
            Protocol::TLS13 => "TLS 1.3",
        }
    }

    /// `openssl s_client` flag pinning the handshake to exactly this version
    pub fn openssl_flag(&self) -> &'static str {
        match self {
            Protocol::TLS10 => "-tls1",
            Protocol::TLS11 => "-tls1_1",
            Protocol::TLS12 => "-tls1_2",
            Protocol::TLS13 => "-tls1_3",
        }
    }

    /// Protocol name as printed by `openssl s_client` (and accepted by `-max_protocol`)
    pub fn openssl_name(&self) -> &'static str {
        match self {
            Protocol::TLS10 => "TLSv1",
            Protocol::TLS11 => "TLSv1.1",
            Protocol::TLS12 => "TLSv1.2",
            Protocol::TLS13 => "TLSv1.3",
        }
    }

    pub fn ssl_version(&self) -> SslVersion {
        match self {
            Protocol::TLS10 => SslVersion::TLS1,
            Protocol::TLS11 => SslVersion::TLS1_1,
            Protocol::TLS12 => SslVersion::TLS1_2,
            Protocol::TLS13 => SslVersion::TLS1_3,
        }
    }

    /// The version immediately below this one, if any
    pub fn below(&self) -> Option<Protocol> {
        match self {
            Protocol::TLS10 => None,
            Protocol::TLS11 => Some(Protocol::TLS10),
            Protocol::TLS12 => Some(Protocol::TLS11),
            Protocol::TLS13 => Some(Protocol::TLS12),
        }
    }

    /// Get all protocols, oldest first
    pub fn all() -> Vec<Protocol> {
        vec![
            Protocol::TLS10,
            Protocol::TLS11,
            Protocol::TLS12,
            Protocol::TLS13,
        ]
    }

    /// All versions from `min` up to TLS 1.3 inclusive
    pub fn versions_from(min: Protocol) -> Vec<Protocol> {
        Self::all().into_iter().filter(|p| *p >= min).collect()
    }

    /// Map a version reported by the native TLS library
    pub fn from_ssl_version_str(s: &str) -> Option<Protocol> {
        match s {
            "TLSv1" => Some(Protocol::TLS10),
            "TLSv1.1" => Some(Protocol::TLS11),
            "TLSv1.2" => Some(Protocol::TLS12),
            "TLSv1.3" => Some(Protocol::TLS13),
            _ => None,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TLS 1.0" | "TLSv1.0" | "TLSv1" | "VersionTLS10" => Ok(Protocol::TLS10),
            "TLS 1.1" | "TLSv1.1" | "VersionTLS11" => Ok(Protocol::TLS11),
            "TLS 1.2" | "TLSv1.2" | "VersionTLS12" => Ok(Protocol::TLS12),
            "TLS 1.3" | "TLSv1.3" | "VersionTLS13" => Ok(Protocol::TLS13),
            _ => Err(format!("Unknown protocol: {}", s)),
        }
    }
}
