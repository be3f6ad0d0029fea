// Built-in TLS security profiles
//
// Cipher lists follow the Mozilla Server Side TLS recommendations as adopted
// by the OpenShift `TLSSecurityProfile` API.

use crate::protocols::Protocol;

/// Minimum version plus the ordered OpenSSL cipher names of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSpec {
    pub min_version: Protocol,
    pub ciphers: Vec<String>,
}

impl ProfileSpec {
    fn new(min_version: Protocol, ciphers: &[&str]) -> Self {
        Self {
            min_version,
            ciphers: ciphers.iter().map(|c| c.to_string()).collect(),
        }
    }
}

const TLS13_SUITES: [&str; 3] = [
    "TLS_AES_128_GCM_SHA256",
    "TLS_AES_256_GCM_SHA384",
    "TLS_CHACHA20_POLY1305_SHA256",
];

/// Old: TLS 1.0 minimum, widest list including CBC, SHA-1 and 3DES suites
pub fn old() -> ProfileSpec {
    let mut ciphers = TLS13_SUITES.to_vec();
    ciphers.extend_from_slice(&[
        "ECDHE-ECDSA-AES128-GCM-SHA256",
        "ECDHE-RSA-AES128-GCM-SHA256",
        "ECDHE-ECDSA-AES256-GCM-SHA384",
        "ECDHE-RSA-AES256-GCM-SHA384",
        "ECDHE-ECDSA-CHACHA20-POLY1305",
        "ECDHE-RSA-CHACHA20-POLY1305",
        "DHE-RSA-AES128-GCM-SHA256",
        "DHE-RSA-AES256-GCM-SHA384",
        "DHE-RSA-CHACHA20-POLY1305",
        "ECDHE-ECDSA-AES128-SHA256",
        "ECDHE-RSA-AES128-SHA256",
        "ECDHE-ECDSA-AES128-SHA",
        "ECDHE-RSA-AES128-SHA",
        "ECDHE-ECDSA-AES256-SHA384",
        "ECDHE-RSA-AES256-SHA384",
        "ECDHE-ECDSA-AES256-SHA",
        "ECDHE-RSA-AES256-SHA",
        "DHE-RSA-AES128-SHA256",
        "DHE-RSA-AES256-SHA256",
        "AES128-GCM-SHA256",
        "AES256-GCM-SHA384",
        "AES128-SHA256",
        "AES256-SHA256",
        "AES128-SHA",
        "AES256-SHA",
        "DES-CBC3-SHA",
    ]);
    ProfileSpec::new(Protocol::TLS10, &ciphers)
}

/// Intermediate: TLS 1.2 minimum, ECDHE/DHE with AEAD ciphers only
pub fn intermediate() -> ProfileSpec {
    let mut ciphers = TLS13_SUITES.to_vec();
    ciphers.extend_from_slice(&[
        "ECDHE-ECDSA-AES128-GCM-SHA256",
        "ECDHE-RSA-AES128-GCM-SHA256",
        "ECDHE-ECDSA-AES256-GCM-SHA384",
        "ECDHE-RSA-AES256-GCM-SHA384",
        "ECDHE-ECDSA-CHACHA20-POLY1305",
        "ECDHE-RSA-CHACHA20-POLY1305",
        "DHE-RSA-AES128-GCM-SHA256",
        "DHE-RSA-AES256-GCM-SHA384",
    ]);
    ProfileSpec::new(Protocol::TLS12, &ciphers)
}

/// Modern: TLS 1.3 only
pub fn modern() -> ProfileSpec {
    ProfileSpec::new(Protocol::TLS13, &TLS13_SUITES)
}
