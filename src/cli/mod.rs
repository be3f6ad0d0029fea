// CLI module - Command line interface and argument parsing
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

// Sub-modules for organized CLI arguments
mod cluster_args;
mod connection_args;
mod output_args;
mod policy_args;

// Re-export sub-structs
pub use cluster_args::{ClusterArgs, parse_target};
pub use connection_args::ConnectionArgs;
pub use output_args::OutputArgs;
pub use policy_args::PolicyArgs;

/// tlsprofile - checks cluster services against the TLS security profile
///
/// Every service port is probed natively first; ports the tool cannot reach
/// are probed again with `openssl s_client` from inside a cluster pod.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_about = None)]
#[command(name = "tlsprofile")]
#[command(about = "Checks cluster services against a TLS security profile", long_about = None)]
pub struct Args {
    /// TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write an example configuration file and exit
    #[arg(long = "config-example", value_name = "FILE")]
    pub config_example: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl Args {
    /// Validate CLI arguments for mutual exclusivity and logical consistency
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.policy.policy_from_cluster && self.policy.descriptor().is_some() {
            anyhow::bail!(
                "Cannot use --policy-from-cluster with --profile or --custom-min-version. Choose one policy source."
            );
        }

        if !self.policy.custom_ciphers.is_empty() && self.policy.custom_min_version.is_none() {
            anyhow::bail!("--custom-ciphers requires --custom-min-version");
        }

        if self.output.json_pretty && self.output.json.is_none() && !self.output.json_stdout {
            anyhow::bail!("--json-pretty requires --json or --json-stdout");
        }

        Ok(())
    }

    /// Load the config file (or defaults) and overlay command line values
    pub fn effective_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(profile) = self.policy.descriptor() {
            config.policy = Some(profile);
        }
        config.kubernetes.policy_from_cluster |= self.policy.policy_from_cluster;

        config.targets.extend(self.cluster.targets.iter().cloned());
        config.kubernetes.discover_services |= self.cluster.discover_services;
        if !self.cluster.namespaces.is_empty() {
            config.kubernetes.namespaces = self.cluster.namespaces.clone();
        }
        if !self.cluster.exec_contexts.is_empty() {
            config.exec_contexts = self.cluster.exec_contexts.clone();
        }
        if let Some(path) = &self.cluster.kubectl_path {
            config.kubernetes.kubectl_path = path.clone();
        }

        if let Some(secs) = self.connection.dial_timeout {
            config.probe.dial_timeout_secs = secs;
        }
        if let Some(secs) = self.connection.exec_timeout {
            config.probe.exec_timeout_secs = secs;
        }
        if let Some(n) = self.connection.concurrency {
            config.probe.concurrency = n;
        }
        if let Some(path) = &self.connection.openssl_path {
            config.probe.openssl_path = path.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ProfileType;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "tlsprofile",
            "--profile",
            "modern",
            "--target",
            "tenant/api/172.30.10.5:8443",
            "--exec-context",
            "tls-probe/tls-probe-0/probe",
            "--dial-timeout",
            "2",
            "--json",
            "report.json",
            "-vv",
        ])
        .unwrap();

        assert!(args.validate().is_ok());
        assert_eq!(args.policy.profile, Some(ProfileType::Modern));
        assert_eq!(args.cluster.targets[0].port, 8443);
        assert_eq!(args.output.verbose, 2);

        let config = args.effective_config().unwrap();
        assert_eq!(config.probe.dial_timeout_secs, 2);
        assert_eq!(config.exec_contexts[0].pod, "tls-probe-0");
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn test_conflicting_policy_sources() {
        let args =
            Args::try_parse_from(["tlsprofile", "--profile", "old", "--policy-from-cluster"])
                .unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_custom_ciphers_need_min_version() {
        let args = Args::try_parse_from(["tlsprofile", "--custom-ciphers", "AES128-SHA"]).unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_bad_exec_context_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["tlsprofile", "--exec-context", "ns/pod"]).is_err());
    }
}
