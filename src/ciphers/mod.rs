// Ciphers module - Cipher suites named by TLS security profiles
//
// Profiles name suites with OpenSSL names. The native probe works with IANA
// identifiers; suites without a native identifier (the DHE family) can only be
// exercised through the exec probe.

use lazy_static::lazy_static;
use openssl::error::ErrorStack;
use openssl::ssl::{Ssl, SslContext, SslMethod};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub mod disallowed;

pub use disallowed::{compute_disallowed_ciphers, compute_disallowed_openssl_ciphers};

/// A cipher suite known to the profile catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CipherSuite {
    pub openssl_name: &'static str,
    pub iana_name: &'static str,
    pub hexcode: u16,
    /// The native prober can offer this suite by identifier
    pub native: bool,
    /// TLS 1.3 suites are fixed by the protocol and never configurable
    pub tls13: bool,
}

impl CipherSuite {
    const fn tls12(openssl_name: &'static str, iana_name: &'static str, hexcode: u16) -> Self {
        Self {
            openssl_name,
            iana_name,
            hexcode,
            native: true,
            tls13: false,
        }
    }

    const fn tls12_exec_only(
        openssl_name: &'static str,
        iana_name: &'static str,
        hexcode: u16,
    ) -> Self {
        Self {
            openssl_name,
            iana_name,
            hexcode,
            native: false,
            tls13: false,
        }
    }

    const fn tls13(name: &'static str, hexcode: u16) -> Self {
        Self {
            openssl_name: name,
            iana_name: name,
            hexcode,
            native: false,
            tls13: true,
        }
    }

    /// Native identifier, if the native prober supports the suite
    pub fn native_id(&self) -> Option<u16> {
        self.native.then_some(self.hexcode)
    }

    pub fn is_dhe(&self) -> bool {
        is_dhe_name(self.openssl_name)
    }
}

/// Finite-field DHE key exchange, named `DHE-` or the legacy `EDH-`
pub fn is_dhe_name(name: &str) -> bool {
    name.starts_with("DHE-") || name.starts_with("EDH-")
}

/// Every suite that appears in the Old, Intermediate or Modern profiles
pub static CIPHER_CATALOG: &[CipherSuite] = &[
    CipherSuite::tls13("TLS_AES_128_GCM_SHA256", 0x1301),
    CipherSuite::tls13("TLS_AES_256_GCM_SHA384", 0x1302),
    CipherSuite::tls13("TLS_CHACHA20_POLY1305_SHA256", 0x1303),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES128-GCM-SHA256",
        "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
        0xc02b,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES128-GCM-SHA256",
        "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
        0xc02f,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES256-GCM-SHA384",
        "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
        0xc02c,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES256-GCM-SHA384",
        "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
        0xc030,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-CHACHA20-POLY1305",
        "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
        0xcca9,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-CHACHA20-POLY1305",
        "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
        0xcca8,
    ),
    CipherSuite::tls12_exec_only(
        "DHE-RSA-AES128-GCM-SHA256",
        "TLS_DHE_RSA_WITH_AES_128_GCM_SHA256",
        0x009e,
    ),
    CipherSuite::tls12_exec_only(
        "DHE-RSA-AES256-GCM-SHA384",
        "TLS_DHE_RSA_WITH_AES_256_GCM_SHA384",
        0x009f,
    ),
    CipherSuite::tls12_exec_only(
        "DHE-RSA-CHACHA20-POLY1305",
        "TLS_DHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
        0xccaa,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES128-SHA256",
        "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256",
        0xc023,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES128-SHA256",
        "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256",
        0xc027,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES128-SHA",
        "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
        0xc009,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES128-SHA",
        "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
        0xc013,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES256-SHA384",
        "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384",
        0xc024,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES256-SHA384",
        "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384",
        0xc028,
    ),
    CipherSuite::tls12(
        "ECDHE-ECDSA-AES256-SHA",
        "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
        0xc00a,
    ),
    CipherSuite::tls12(
        "ECDHE-RSA-AES256-SHA",
        "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
        0xc014,
    ),
    CipherSuite::tls12_exec_only(
        "DHE-RSA-AES128-SHA256",
        "TLS_DHE_RSA_WITH_AES_128_CBC_SHA256",
        0x0067,
    ),
    CipherSuite::tls12_exec_only(
        "DHE-RSA-AES256-SHA256",
        "TLS_DHE_RSA_WITH_AES_256_CBC_SHA256",
        0x006b,
    ),
    CipherSuite::tls12(
        "AES128-GCM-SHA256",
        "TLS_RSA_WITH_AES_128_GCM_SHA256",
        0x009c,
    ),
    CipherSuite::tls12(
        "AES256-GCM-SHA384",
        "TLS_RSA_WITH_AES_256_GCM_SHA384",
        0x009d,
    ),
    CipherSuite::tls12(
        "AES128-SHA256",
        "TLS_RSA_WITH_AES_128_CBC_SHA256",
        0x003c,
    ),
    CipherSuite::tls12(
        "AES256-SHA256",
        "TLS_RSA_WITH_AES_256_CBC_SHA256",
        0x003d,
    ),
    CipherSuite::tls12("AES128-SHA", "TLS_RSA_WITH_AES_128_CBC_SHA", 0x002f),
    CipherSuite::tls12("AES256-SHA", "TLS_RSA_WITH_AES_256_CBC_SHA", 0x0035),
    CipherSuite::tls12("DES-CBC3-SHA", "TLS_RSA_WITH_3DES_EDE_CBC_SHA", 0x000a),
];

lazy_static! {
    static ref BY_OPENSSL_NAME: HashMap<&'static str, &'static CipherSuite> = CIPHER_CATALOG
        .iter()
        .map(|c| (c.openssl_name, c))
        .collect();
    static ref NATIVE_TLS12: BTreeMap<u16, &'static str> = native_tls12_suites();
}

/// Look up a suite by its OpenSSL name
pub fn by_openssl_name(name: &str) -> Option<&'static CipherSuite> {
    BY_OPENSSL_NAME.get(name).copied()
}

/// Whether the name is one of the three protocol-fixed TLS 1.3 suites
pub fn is_tls13_name(name: &str) -> bool {
    by_openssl_name(name).is_some_and(|c| c.tls13)
}

/// Native identifiers of every TLS 1.2 suite the native prober can offer
pub fn native_tls12_ids() -> impl Iterator<Item = u16> {
    NATIVE_TLS12.keys().copied()
}

/// OpenSSL name the native prober uses to offer `id`
pub fn native_name(id: u16) -> Option<&'static str> {
    NATIVE_TLS12.get(&id).copied()
}

fn native_tls12_suites() -> BTreeMap<u16, &'static str> {
    match library_tls12_suites() {
        Ok(suites) if !suites.is_empty() => suites,
        Ok(_) => {
            tracing::warn!("OpenSSL reported no TLS 1.2 suites, using the profile catalog");
            catalog_tls12_suites()
        }
        Err(e) => {
            tracing::warn!("Cannot list OpenSSL cipher suites ({}), using the profile catalog", e);
            catalog_tls12_suites()
        }
    }
}

/// Every TLS 1.2 suite the linked OpenSSL implements, DHE excluded
///
/// The library decodes a ClientHello suite list containing every possible
/// identifier and keeps the ones it knows.
fn library_tls12_suites() -> Result<BTreeMap<u16, &'static str>, ErrorStack> {
    let ssl = Ssl::new(&SslContext::builder(SslMethod::tls())?.build())?;
    let wire: Vec<u8> = (0..=u16::MAX)
        .filter(|id| id >> 8 != 0x13)
        .flat_map(u16::to_be_bytes)
        .collect();

    let lists = ssl.bytes_to_cipher_list(&wire, false)?;
    Ok(lists
        .suites
        .iter()
        .map(|c| (u16::from_be_bytes(c.protocol_id()), c.name()))
        .filter(|(_, name)| !is_dhe_name(name))
        .collect())
}

fn catalog_tls12_suites() -> BTreeMap<u16, &'static str> {
    CIPHER_CATALOG
        .iter()
        .filter_map(|c| c.native_id().map(|id| (id, c.openssl_name)))
        .collect()
}
