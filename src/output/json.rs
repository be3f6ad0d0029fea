// JSON Output Module

use crate::Result;
use crate::compliance::ComplianceOutcome;
use std::path::Path;

/// Generate JSON output from a compliance run
pub fn generate_json(outcome: &ComplianceOutcome, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(outcome)?)
    } else {
        Ok(serde_json::to_string(outcome)?)
    }
}

/// Write JSON to file
pub fn write_json_file(outcome: &ComplianceOutcome, path: &Path, pretty: bool) -> Result<()> {
    let json = generate_json(outcome, pretty)?;
    std::fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("Failed to write JSON report {:?}: {}", path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ReportObject;
    use crate::policy::default_policy;
    use crate::probe::{NegotiatedVersion, ProbeMode, TlsProbeResult};
    use crate::protocols::Protocol;
    use crate::targets::ServiceEndpoint;

    fn outcome() -> ComplianceOutcome {
        let mut outcome = ComplianceOutcome::new(&default_policy());
        outcome.record(ReportObject::new(
            &ServiceEndpoint::tcp("tenant", "api", "172.30.10.5", 8443),
            &TlsProbeResult::non_compliant(
                Some(NegotiatedVersion::Exactly(Protocol::TLS11)),
                "server accepts TLS 1.1".to_string(),
            ),
            ProbeMode::Exec,
        ));
        outcome
    }

    #[test]
    fn test_json_generation() {
        let json = generate_json(&outcome(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["profile"], "Intermediate");
        assert_eq!(value["non_compliant"][0]["service_name"], "api");
        assert_eq!(value["non_compliant"][0]["tls_version"], "TLS 1.1");
        assert_eq!(value["non_compliant"][0]["probe"], "exec");
        assert!(value["compliant"].as_array().unwrap().is_empty());

        let pretty_json = generate_json(&outcome(), true).unwrap();
        assert!(pretty_json.contains('\n'));
    }

    #[test]
    fn test_write_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json_file(&outcome(), &path, true).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"namespace\": \"tenant\""));
    }
}
