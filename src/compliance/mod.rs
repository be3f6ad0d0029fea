// Compliance module - Assesses every service endpoint against the cluster TLS policy
//
// Results are grouped into compliant and non-compliant report objects. Endpoints
// that could not be reached or do not speak TLS are reported as compliant,
// with the reason saying why.

pub mod checker;

use crate::policy::{ProfileType, TlsPolicy};
use crate::probe::{ProbeMode, TlsProbeResult};
use crate::protocols::Protocol;
use crate::targets::ServiceEndpoint;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use checker::{ComplianceChecker, ExecFallback};

/// Overall compliance status for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    /// Every endpoint honors the policy
    Pass,
    /// At least one endpoint does not
    Fail,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Pass => write!(f, "PASS"),
            ComplianceStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Per-endpoint report entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportObject {
    pub object_type: String,
    pub namespace: String,
    pub service_name: String,
    pub port_number: u16,
    pub port_protocol: String,
    pub compliant: bool,
    pub reachable: bool,
    pub is_tls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_version: Option<String>,
    pub reason: String,
    pub probe: ProbeMode,
}

impl ReportObject {
    pub fn new(endpoint: &ServiceEndpoint, result: &TlsProbeResult, probe: ProbeMode) -> Self {
        Self {
            object_type: "Service".to_string(),
            namespace: endpoint.namespace.clone(),
            service_name: endpoint.service.clone(),
            port_number: endpoint.port,
            port_protocol: endpoint.transport.to_string(),
            compliant: result.compliant,
            reachable: result.reachable,
            is_tls: result.is_tls,
            tls_version: result.negotiated_version.map(|v| v.to_string()),
            reason: result.reason.clone(),
            probe,
        }
    }
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceOutcome {
    pub profile: ProfileType,
    pub min_version: Protocol,
    pub checked_at: DateTime<Utc>,
    pub compliant: Vec<ReportObject>,
    pub non_compliant: Vec<ReportObject>,
}

impl ComplianceOutcome {
    pub fn new(policy: &TlsPolicy) -> Self {
        Self {
            profile: policy.profile_type(),
            min_version: policy.min_version(),
            checked_at: Utc::now(),
            compliant: Vec::new(),
            non_compliant: Vec::new(),
        }
    }

    pub fn record(&mut self, report: ReportObject) {
        if report.compliant {
            self.compliant.push(report);
        } else {
            self.non_compliant.push(report);
        }
    }

    pub fn status(&self) -> ComplianceStatus {
        if self.non_compliant.is_empty() {
            ComplianceStatus::Pass
        } else {
            ComplianceStatus::Fail
        }
    }

    pub fn total(&self) -> usize {
        self.compliant.len() + self.non_compliant.len()
    }

    /// Compliant entries that were actually verified over TLS
    pub fn verified_tls(&self) -> usize {
        self.compliant.iter().filter(|r| r.is_tls).count()
    }
}
