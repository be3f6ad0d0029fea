// Policy module - Resolves a TLS security profile descriptor into an effective policy
//
// The resulting `TlsPolicy` is built once per run and threaded by reference
// through every probe. It has no setters.

pub mod profiles;
pub mod source;

use crate::ciphers;
use crate::protocols::Protocol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub use profiles::ProfileSpec;
pub use source::{KubectlPolicySource, PolicySource, StaticPolicySource, resolve_from_source};

/// Named TLS security profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProfileType {
    Old,
    Intermediate,
    Modern,
    Custom,
}

impl ProfileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileType::Old => "Old",
            ProfileType::Intermediate => "Intermediate",
            ProfileType::Modern => "Modern",
            ProfileType::Custom => "Custom",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "old" => Ok(ProfileType::Old),
            "intermediate" => Ok(ProfileType::Intermediate),
            "modern" => Ok(ProfileType::Modern),
            "custom" => Ok(ProfileType::Custom),
            _ => Err(format!("Unknown TLS profile type: {}", s)),
        }
    }
}

/// Security profile descriptor as published by the cluster (or written in config)
///
/// `type` stays a free-form string so that unrecognized values can be
/// resolved to the safe default instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsSecurityProfile {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomTlsProfile>,
}

impl TlsSecurityProfile {
    pub fn named(profile_type: ProfileType) -> Self {
        Self {
            profile_type: Some(profile_type.as_str().to_string()),
            custom: None,
        }
    }

    pub fn custom(min_tls_version: &str, ciphers: &[&str]) -> Self {
        Self {
            profile_type: Some(ProfileType::Custom.as_str().to_string()),
            custom: Some(CustomTlsProfile {
                min_tls_version: min_tls_version.to_string(),
                ciphers: ciphers.iter().map(|c| c.to_string()).collect(),
            }),
        }
    }
}

/// Explicit min version and cipher list of a Custom profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTlsProfile {
    #[serde(rename = "minTLSVersion", default)]
    pub min_tls_version: String,
    #[serde(default)]
    pub ciphers: Vec<String>,
}

/// Effective TLS policy a server must honor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsPolicy {
    profile_type: ProfileType,
    min_version: Protocol,
    allowed_cipher_ids: BTreeSet<u16>,
    allowed_cipher_names: BTreeSet<String>,
}

impl TlsPolicy {
    pub fn profile_type(&self) -> ProfileType {
        self.profile_type
    }

    pub fn min_version(&self) -> Protocol {
        self.min_version
    }

    /// Native identifiers of the allowed TLS 1.2 suites
    pub fn allowed_cipher_ids(&self) -> &BTreeSet<u16> {
        &self.allowed_cipher_ids
    }

    /// OpenSSL names of the allowed TLS 1.2 suites, including those without a native identifier
    pub fn allowed_cipher_names(&self) -> &BTreeSet<String> {
        &self.allowed_cipher_names
    }

    /// Cipher suites are only configurable below TLS 1.3
    pub fn checks_ciphers(&self) -> bool {
        self.min_version <= Protocol::TLS12
    }

    fn from_spec(profile_type: ProfileType, spec: &ProfileSpec) -> Self {
        let mut allowed_cipher_ids = BTreeSet::new();
        let mut allowed_cipher_names = BTreeSet::new();

        for name in &spec.ciphers {
            if ciphers::is_tls13_name(name) {
                continue;
            }
            if let Some(id) = ciphers::by_openssl_name(name).and_then(|c| c.native_id()) {
                allowed_cipher_ids.insert(id);
            } else {
                tracing::debug!(
                    "Cipher {} has no native mapping, exec probe only",
                    name
                );
            }
            allowed_cipher_names.insert(name.clone());
        }

        Self {
            profile_type,
            min_version: spec.min_version,
            allowed_cipher_ids,
            allowed_cipher_names,
        }
    }
}

/// The Intermediate profile, used whenever no profile is configured
pub fn default_policy() -> TlsPolicy {
    TlsPolicy::from_spec(ProfileType::Intermediate, &profiles::intermediate())
}

/// Resolve a profile descriptor into the effective policy
///
/// Absent descriptors, unrecognized types and Custom profiles without a spec
/// all resolve to Intermediate; resolution never falls back to Old.
pub fn resolve_profile(profile: Option<&TlsSecurityProfile>) -> TlsPolicy {
    let Some(profile) = profile else {
        return default_policy();
    };

    let profile_type = profile
        .profile_type
        .as_deref()
        .and_then(|t| t.parse::<ProfileType>().ok());

    match profile_type {
        Some(ProfileType::Old) => TlsPolicy::from_spec(ProfileType::Old, &profiles::old()),
        Some(ProfileType::Modern) => {
            TlsPolicy::from_spec(ProfileType::Modern, &profiles::modern())
        }
        Some(ProfileType::Custom) => match &profile.custom {
            Some(custom) => TlsPolicy::from_spec(ProfileType::Custom, &custom_spec(custom)),
            None => {
                tracing::warn!("Custom TLS profile has no spec, using Intermediate");
                default_policy()
            }
        },
        Some(ProfileType::Intermediate) => default_policy(),
        None => {
            tracing::warn!(
                "Unrecognized TLS profile type {:?}, using Intermediate",
                profile.profile_type
            );
            default_policy()
        }
    }
}

fn custom_spec(custom: &CustomTlsProfile) -> ProfileSpec {
    let min_version = custom.min_tls_version.parse().unwrap_or_else(|_| {
        tracing::warn!(
            "Unknown minTLSVersion {:?} in Custom profile, using TLS 1.2",
            custom.min_tls_version
        );
        Protocol::TLS12
    });

    ProfileSpec {
        min_version,
        ciphers: custom.ciphers.clone(),
    }
}
