// Policy selection arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::policy::{ProfileType, TlsSecurityProfile};
use clap::Args;

/// Which TLS security profile to enforce
///
/// Precedence: --profile / --custom-min-version, then the config file,
/// then the cluster (with --policy-from-cluster), then Intermediate.
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Named profile to enforce (old, intermediate, modern, custom)
    #[arg(long = "profile", value_name = "PROFILE")]
    pub profile: Option<ProfileType>,

    /// Minimum version of a custom profile (e.g. VersionTLS12)
    #[arg(long = "custom-min-version", value_name = "VERSION")]
    pub custom_min_version: Option<String>,

    /// Comma-separated OpenSSL cipher names of a custom profile
    #[arg(long = "custom-ciphers", value_name = "CIPHERS", value_delimiter = ',')]
    pub custom_ciphers: Vec<String>,

    /// Read the profile from the cluster's APIServer object
    #[arg(long = "policy-from-cluster")]
    pub policy_from_cluster: bool,
}

impl PolicyArgs {
    /// Profile descriptor given on the command line, if any
    pub fn descriptor(&self) -> Option<TlsSecurityProfile> {
        if let Some(min) = &self.custom_min_version {
            let ciphers: Vec<&str> = self.custom_ciphers.iter().map(String::as_str).collect();
            return Some(TlsSecurityProfile::custom(min, &ciphers));
        }
        self.profile.map(TlsSecurityProfile::named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_precedence() {
        assert_eq!(PolicyArgs::default().descriptor(), None);

        let named = PolicyArgs {
            profile: Some(ProfileType::Modern),
            ..Default::default()
        };
        assert_eq!(
            named.descriptor(),
            Some(TlsSecurityProfile::named(ProfileType::Modern))
        );

        let custom = PolicyArgs {
            profile: Some(ProfileType::Modern),
            custom_min_version: Some("VersionTLS11".to_string()),
            custom_ciphers: vec!["AES128-SHA".to_string()],
            ..Default::default()
        };
        let descriptor = custom.descriptor().unwrap();
        assert_eq!(descriptor.profile_type.as_deref(), Some("Custom"));
        assert_eq!(descriptor.custom.unwrap().ciphers, vec!["AES128-SHA"]);
    }
}
