// Policy sources - where the cluster's TLS security profile comes from

use super::{TlsPolicy, TlsSecurityProfile, default_policy, resolve_profile};
use crate::Result;
use crate::external::Kubectl;
use async_trait::async_trait;
use serde::Deserialize;

/// Supplies the profile descriptor to resolve
#[async_trait]
pub trait PolicySource: Send + Sync {
    /// `Ok(None)` means no profile is configured
    async fn security_profile(&self) -> Result<Option<TlsSecurityProfile>>;
}

/// A descriptor fixed at startup (CLI flag or config file)
#[derive(Debug, Clone, Default)]
pub struct StaticPolicySource {
    profile: Option<TlsSecurityProfile>,
}

impl StaticPolicySource {
    pub fn new(profile: Option<TlsSecurityProfile>) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl PolicySource for StaticPolicySource {
    async fn security_profile(&self) -> Result<Option<TlsSecurityProfile>> {
        Ok(self.profile.clone())
    }
}

/// Reads `spec.tlsSecurityProfile` from the cluster-scoped `APIServer` object
pub struct KubectlPolicySource {
    kubectl: Kubectl,
}

#[derive(Debug, Deserialize)]
struct ApiServerObject {
    #[serde(default)]
    spec: ApiServerSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiServerSpec {
    #[serde(default)]
    tls_security_profile: Option<TlsSecurityProfile>,
}

impl KubectlPolicySource {
    pub fn new(kubectl: Kubectl) -> Self {
        Self { kubectl }
    }

    fn extract(object: ApiServerObject) -> Option<TlsSecurityProfile> {
        object.spec.tls_security_profile
    }
}

#[async_trait]
impl PolicySource for KubectlPolicySource {
    async fn security_profile(&self) -> Result<Option<TlsSecurityProfile>> {
        let object: ApiServerObject = self
            .kubectl
            .get_json(&["get", "apiserver.config.openshift.io", "cluster"])
            .await?;
        Ok(Self::extract(object))
    }
}

/// Resolve the policy published by `source`
///
/// A source that cannot be read yields the Intermediate default.
pub async fn resolve_from_source(source: &dyn PolicySource) -> TlsPolicy {
    match source.security_profile().await {
        Ok(profile) => resolve_profile(profile.as_ref()),
        Err(e) => {
            tracing::warn!("Could not read TLS security profile, using Intermediate: {}", e);
            default_policy()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ProfileType;
    use crate::protocols::Protocol;

    struct FailingSource;

    #[async_trait]
    impl PolicySource for FailingSource {
        async fn security_profile(&self) -> Result<Option<TlsSecurityProfile>> {
            anyhow::bail!("apiservers.config.openshift.io \"cluster\" is forbidden")
        }
    }

    #[tokio::test]
    async fn test_static_source() {
        let source =
            StaticPolicySource::new(Some(TlsSecurityProfile::named(ProfileType::Modern)));
        let policy = resolve_from_source(&source).await;
        assert_eq!(policy.min_version(), Protocol::TLS13);

        let empty = resolve_from_source(&StaticPolicySource::default()).await;
        assert_eq!(empty, default_policy());
    }

    #[tokio::test]
    async fn test_failing_source_uses_default() {
        let policy = resolve_from_source(&FailingSource).await;
        assert_eq!(policy.profile_type(), ProfileType::Intermediate);
    }

    #[test]
    fn test_extract_from_apiserver_object() {
        let json = r#"{
            "apiVersion": "config.openshift.io/v1",
            "kind": "APIServer",
            "metadata": {"name": "cluster"},
            "spec": {
                "audit": {"profile": "Default"},
                "tlsSecurityProfile": {"type": "Old", "old": {}}
            }
        }"#;
        let object: ApiServerObject = serde_json::from_str(json).unwrap();
        let profile = KubectlPolicySource::extract(object).unwrap();
        assert_eq!(profile.profile_type.as_deref(), Some("Old"));

        let bare: ApiServerObject =
            serde_json::from_str(r#"{"kind": "APIServer", "spec": {}}"#).unwrap();
        assert!(KubectlPolicySource::extract(bare).is_none());
    }
}
