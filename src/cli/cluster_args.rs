// Cluster access and target selection arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::external::ExecContext;
use crate::targets::ServiceEndpoint;
use clap::Args;

/// Where endpoints come from and where exec probes run
#[derive(Args, Debug, Clone, Default)]
pub struct ClusterArgs {
    /// Endpoint to check, as namespace/service/address:port (repeatable)
    #[arg(long = "target", value_name = "NS/SVC/ADDR:PORT", value_parser = parse_target)]
    pub targets: Vec<ServiceEndpoint>,

    /// Enumerate services with kubectl
    #[arg(long = "discover-services")]
    pub discover_services: bool,

    /// Restrict service discovery to a namespace (repeatable)
    #[arg(short = 'n', long = "namespace", value_name = "NAMESPACE")]
    pub namespaces: Vec<String>,

    /// Pod to run exec probes from, as namespace/pod/container (repeatable)
    #[arg(long = "exec-context", value_name = "NS/POD/CONTAINER")]
    pub exec_contexts: Vec<ExecContext>,

    /// Run exec probes through the local shell instead of kubectl exec
    #[arg(long = "local-exec")]
    pub local_exec: bool,

    /// Path to kubectl
    #[arg(long = "kubectl", value_name = "PATH")]
    pub kubectl_path: Option<String>,
}

/// Parse `namespace/service/address:port`
pub fn parse_target(s: &str) -> Result<ServiceEndpoint, String> {
    let invalid = || format!("Invalid target '{}', expected namespace/service/address:port", s);

    let mut parts = s.splitn(3, '/');
    let (Some(namespace), Some(service), Some(addr)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let (address, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
    let address = address.trim_start_matches('[').trim_end_matches(']');
    let port: u16 = port.parse().map_err(|_| invalid())?;

    if namespace.is_empty() || service.is_empty() || address.is_empty() {
        return Err(invalid());
    }

    Ok(ServiceEndpoint::tcp(namespace, service, address, port))
}
