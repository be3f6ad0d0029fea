// Configuration - TOML file holding probe settings, policy and targets

use crate::Result;
use crate::error::TlsError;
use crate::external::ExecContext;
use crate::policy::{ProfileType, TlsSecurityProfile};
use crate::probe::ProbeSettings;
use crate::security::{validate_command_path, validate_port, validate_resource_name};
use crate::targets::ServiceEndpoint;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    /// Profile to enforce; absent means Intermediate unless read from the cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<TlsSecurityProfile>,
    #[serde(default)]
    pub targets: Vec<ServiceEndpoint>,
    /// Pods the exec probe may run from, first one is used
    #[serde(default)]
    pub exec_contexts: Vec<ExecContext>,
}

/// Probe timeouts and parallelism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout_secs")]
    pub dial_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub exec_timeout_secs: u64,
    #[serde(default = "default_openssl_path")]
    pub openssl_path: String,
    /// Endpoints probed at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Cluster access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default = "default_kubectl_path")]
    pub kubectl_path: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Read the profile from the cluster's APIServer object
    #[serde(default)]
    pub policy_from_cluster: bool,
    /// Enumerate services with kubectl in addition to static targets
    #[serde(default)]
    pub discover_services: bool,
    /// Namespaces to enumerate; empty means all
    #[serde(default)]
    pub namespaces: Vec<String>,
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_openssl_path() -> String {
    "openssl".to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_kubectl_path() -> String {
    "kubectl".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            dial_timeout_secs: default_timeout_secs(),
            exec_timeout_secs: default_timeout_secs(),
            openssl_path: default_openssl_path(),
            concurrency: default_concurrency(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            kubectl_path: default_kubectl_path(),
            request_timeout_secs: default_request_timeout_secs(),
            policy_from_cluster: false,
            discover_services: false,
            namespaces: Vec::new(),
        }
    }
}

impl ProbeConfig {
    pub fn settings(&self) -> ProbeSettings {
        ProbeSettings {
            dial_timeout: Duration::from_secs(self.dial_timeout_secs),
            exec_timeout: Duration::from_secs(self.exec_timeout_secs),
            openssl_path: self.openssl_path.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Failed to read config file {:?}: {}", path.as_ref(), e)
        })?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML config: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path.as_ref(), toml_str).map_err(|e| {
            anyhow::anyhow!("Failed to write config file {:?}: {}", path.as_ref(), e)
        })?;

        Ok(())
    }

    /// Example configuration written by `--config-example`
    pub fn example() -> Self {
        Self {
            probe: ProbeConfig::default(),
            kubernetes: KubernetesConfig {
                discover_services: true,
                namespaces: vec!["openshift-apiserver".to_string()],
                ..Default::default()
            },
            policy: Some(TlsSecurityProfile::named(ProfileType::Intermediate)),
            targets: vec![ServiceEndpoint::tcp(
                "openshift-apiserver",
                "api",
                "172.30.10.5",
                443,
            )],
            exec_contexts: vec![ExecContext::new("tls-probe", "tls-probe-0", "probe")],
        }
    }

    /// Reject values that would make probing impossible or unsafe
    pub fn validate(&self) -> Result<()> {
        if self.probe.dial_timeout_secs == 0 || self.probe.exec_timeout_secs == 0 {
            return Err(config_error("probe timeouts must be at least 1 second"));
        }
        validate_command_path(&self.probe.openssl_path)?;
        validate_command_path(&self.kubernetes.kubectl_path)?;

        for target in &self.targets {
            validate_port(target.port)
                .map_err(|e| config_error(&format!("target {}: {}", target, e)))?;
        }

        for ctx in &self.exec_contexts {
            for name in [&ctx.namespace, &ctx.pod, &ctx.container] {
                validate_resource_name(name)
                    .map_err(|e| config_error(&format!("exec context {}: {}", ctx, e)))?;
            }
        }

        Ok(())
    }
}

fn config_error(message: &str) -> anyhow::Error {
    TlsError::ConfigError {
        message: message.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::Transport;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.probe.dial_timeout_secs, 5);
        assert_eq!(config.probe.concurrency, 1);
        assert_eq!(config.probe.settings(), ProbeSettings::default());
        assert_eq!(config.kubernetes.kubectl_path, "kubectl");
        assert!(config.policy.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
            [probe]
            dial_timeout_secs = 2
            concurrency = 4

            [policy]
            type = "Custom"

            [policy.custom]
            minTLSVersion = "VersionTLS12"
            ciphers = ["ECDHE-RSA-AES128-GCM-SHA256"]

            [[targets]]
            namespace = "tenant"
            service = "api"
            address = "172.30.10.5"
            port = 8443

            [[targets]]
            namespace = "tenant"
            service = "dns"
            address = "172.30.10.6"
            port = 53
            transport = "UDP"

            [[exec_contexts]]
            namespace = "tls-probe"
            pod = "tls-probe-0"
            container = "probe"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.probe.dial_timeout_secs, 2);
        assert_eq!(config.probe.exec_timeout_secs, 5);
        assert_eq!(config.probe.concurrency, 4);
        assert_eq!(
            config.policy.as_ref().unwrap().custom.as_ref().unwrap().min_tls_version,
            "VersionTLS12"
        );
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].transport, Transport::Tcp);
        assert_eq!(config.targets[1].transport, Transport::Udp);
        assert_eq!(config.exec_contexts[0].pod, "tls-probe-0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.probe.exec_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.probe.openssl_path = "openssl; id".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.exec_contexts.push(ExecContext::new("ns", "Pod_1", "c"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tlsprofile.toml");

        AppConfig::example().save_to_file(&path).unwrap();
        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded, AppConfig::example());
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[probe\ndial_timeout_secs = ").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }
}
