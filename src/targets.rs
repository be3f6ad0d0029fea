// Targets - service endpoints to assess
//
// Enumerators return every endpoint they know about; `probeable` applies the
// filtering rules (TCP only, no headless services) in one place.

use crate::Result;
use crate::external::Kubectl;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport protocol of a service port
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transport {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
            Transport::Sctp => "SCTP",
        })
    }
}

/// One port of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    pub namespace: String,
    pub service: String,
    /// Cluster IP (or any routable address); empty or `None` for headless services
    pub address: String,
    pub port: u16,
    #[serde(default)]
    pub transport: Transport,
}

impl ServiceEndpoint {
    pub fn tcp(namespace: &str, service: &str, address: &str, port: u16) -> Self {
        Self {
            namespace: namespace.to_string(),
            service: service.to_string(),
            address: address.to_string(),
            port,
            transport: Transport::Tcp,
        }
    }

    pub fn is_headless(&self) -> bool {
        self.address.is_empty() || self.address.eq_ignore_ascii_case("none")
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{}",
            self.namespace, self.service, self.port, self.transport
        )
    }
}

/// Keep only endpoints a TCP handshake can be attempted against
pub fn probeable(endpoints: Vec<ServiceEndpoint>) -> Vec<ServiceEndpoint> {
    endpoints
        .into_iter()
        .filter(|ep| {
            if ep.is_headless() {
                tracing::debug!("Skipping headless service {}", ep);
                return false;
            }
            if ep.transport != Transport::Tcp {
                tracing::debug!("Skipping non-TCP port {}", ep);
                return false;
            }
            true
        })
        .collect()
}

/// Source of service endpoints
#[async_trait]
pub trait TargetEnumerator: Send + Sync {
    async fn endpoints(&self) -> Result<Vec<ServiceEndpoint>>;
}

/// Fixed list of endpoints (config file or tests)
#[derive(Debug, Clone, Default)]
pub struct StaticTargets {
    endpoints: Vec<ServiceEndpoint>,
}

impl StaticTargets {
    pub fn new(endpoints: Vec<ServiceEndpoint>) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl TargetEnumerator for StaticTargets {
    async fn endpoints(&self) -> Result<Vec<ServiceEndpoint>> {
        Ok(self.endpoints.clone())
    }
}

/// Lists services through `kubectl get services`
pub struct KubectlServiceEnumerator {
    kubectl: Kubectl,
    /// Empty means all namespaces
    namespaces: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    items: Vec<Service>,
}

#[derive(Debug, Deserialize)]
struct Service {
    metadata: ObjectMeta,
    #[serde(default)]
    spec: ServiceSpec,
}

#[derive(Debug, Deserialize)]
struct ObjectMeta {
    name: String,
    #[serde(default)]
    namespace: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceSpec {
    #[serde(default, rename = "clusterIP")]
    cluster_ip: Option<String>,
    #[serde(default)]
    ports: Vec<ServicePort>,
}

#[derive(Debug, Deserialize)]
struct ServicePort {
    port: u16,
    #[serde(default)]
    protocol: Transport,
}

impl KubectlServiceEnumerator {
    pub fn new(kubectl: Kubectl, namespaces: Vec<String>) -> Self {
        Self {
            kubectl,
            namespaces,
        }
    }

    fn flatten(list: ServiceList) -> Vec<ServiceEndpoint> {
        list.items
            .into_iter()
            .flat_map(|svc| {
                let address = svc.spec.cluster_ip.unwrap_or_default();
                let namespace = svc.metadata.namespace;
                let name = svc.metadata.name;
                svc.spec.ports.into_iter().map(move |p| ServiceEndpoint {
                    namespace: namespace.clone(),
                    service: name.clone(),
                    address: address.clone(),
                    port: p.port,
                    transport: p.protocol,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TargetEnumerator for KubectlServiceEnumerator {
    async fn endpoints(&self) -> Result<Vec<ServiceEndpoint>> {
        if self.namespaces.is_empty() {
            let list: ServiceList = self
                .kubectl
                .get_json(&["get", "services", "--all-namespaces"])
                .await?;
            return Ok(Self::flatten(list));
        }

        let mut endpoints = Vec::new();
        for ns in &self.namespaces {
            let list: ServiceList = self
                .kubectl
                .get_json(&["get", "services", "-n", ns])
                .await?;
            endpoints.extend(Self::flatten(list));
        }
        Ok(endpoints)
    }
}
