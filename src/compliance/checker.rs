// Compliance checker - probes every endpoint, falling back to in-cluster exec

use super::{ComplianceOutcome, ReportObject};
use crate::Result;
use crate::external::{ExecContext, RemoteExecutor};
use crate::policy::TlsPolicy;
use crate::probe::{ExecProber, NativeProber, ProbeMode, ProbeSettings, Prober, TlsProbeResult};
use crate::targets::{ServiceEndpoint, TargetEnumerator, probeable};
use futures::stream::{self, StreamExt};

/// Pods an exec probe can be run from
pub struct ExecFallback<'a> {
    pub executor: &'a dyn RemoteExecutor,
    pub contexts: Vec<ExecContext>,
}

impl<'a> ExecFallback<'a> {
    pub fn new(executor: &'a dyn RemoteExecutor, contexts: Vec<ExecContext>) -> Self {
        Self { executor, contexts }
    }
}

/// Runs the assessment over all enumerated endpoints
pub struct ComplianceChecker {
    settings: ProbeSettings,
    native: NativeProber,
    concurrency: usize,
}

impl ComplianceChecker {
    /// Checker that probes endpoints one after another
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            native: NativeProber::new(settings.clone()),
            settings,
            concurrency: 1,
        }
    }

    /// Probe up to `concurrency` endpoints at the same time
    ///
    /// Each endpoint is still assessed by one sequential ladder, and reports
    /// keep enumeration order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Assess every probeable endpoint the enumerator yields
    ///
    /// Fails only when enumeration fails; probe failures are results.
    pub async fn check(
        &self,
        policy: &TlsPolicy,
        enumerator: &dyn TargetEnumerator,
        fallback: Option<&ExecFallback<'_>>,
    ) -> Result<ComplianceOutcome> {
        let endpoints = probeable(enumerator.endpoints().await?);
        tracing::info!(
            "Checking {} endpoint(s) against {} profile (min {})",
            endpoints.len(),
            policy.profile_type(),
            policy.min_version()
        );

        let probes: Vec<_> = endpoints
            .iter()
            .map(|endpoint| async move {
                let (result, mode) = self.check_endpoint(policy, endpoint, fallback).await;
                ReportObject::new(endpoint, &result, mode)
            })
            .collect();
        let reports: Vec<ReportObject> = stream::iter(probes)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = ComplianceOutcome::new(policy);
        for report in reports {
            outcome.record(report);
        }
        Ok(outcome)
    }

    /// Probe one endpoint natively, then from the first exec context if unreachable
    pub async fn check_endpoint(
        &self,
        policy: &TlsPolicy,
        endpoint: &ServiceEndpoint,
        fallback: Option<&ExecFallback<'_>>,
    ) -> (TlsProbeResult, ProbeMode) {
        let native = self
            .native
            .probe(&endpoint.address, endpoint.port, policy)
            .await;
        tracing::debug!("{} native: {}", endpoint, native.reason);

        if native.reachable {
            return (native, ProbeMode::Native);
        }

        let Some((fb, context)) = fallback.and_then(|fb| fb.contexts.first().map(|c| (fb, c)))
        else {
            return (native, ProbeMode::Native);
        };

        tracing::debug!("{} unreachable natively, retrying from {}", endpoint, context);
        let prober = ExecProber::new(fb.executor, context, self.settings.clone());
        let result = prober.probe(&endpoint.address, endpoint.port, policy).await;
        tracing::debug!("{} exec: {}", endpoint, result.reason);

        if !result.reachable {
            tracing::info!(
                "{} unreachable, counted as compliant: {}",
                endpoint,
                result.reason
            );
        }
        (result, ProbeMode::Exec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ExecOutput;
    use crate::policy::{ProfileType, TlsSecurityProfile, resolve_profile};
    use crate::targets::{StaticTargets, Transport};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::net::TcpListener;

    /// Answers every s_client run as a TLS 1.3-only server would
    struct Tls13OnlyPod {
        seen: Mutex<Vec<(ExecContext, String)>>,
    }

    #[async_trait]
    impl RemoteExecutor for Tls13OnlyPod {
        async fn exec(&self, context: &ExecContext, command: &str) -> ExecOutput {
            self.seen
                .lock()
                .unwrap()
                .push((context.clone(), command.to_string()));
            let stdout = if command.contains("-tls1_3") {
                "CONNECTED(00000003)\n---\nProtocol  : TLSv1.3\nCipher    : TLS_AES_256_GCM_SHA384\n---"
            } else {
                "CONNECTED(00000003)\nerror:0A00042E:SSL routines::tlsv1 alert protocol version\n---"
            };
            ExecOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                error: None,
            }
        }
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn fast_checker() -> ComplianceChecker {
        ComplianceChecker::new(ProbeSettings {
            dial_timeout: std::time::Duration::from_secs(1),
            ..Default::default()
        })
        .with_concurrency(4)
    }

    #[test]
    fn test_endpoints_are_sequential_unless_requested() {
        assert_eq!(ComplianceChecker::new(ProbeSettings::default()).concurrency, 1);
        assert_eq!(
            ComplianceChecker::new(ProbeSettings::default())
                .with_concurrency(0)
                .concurrency,
            1
        );
        assert_eq!(fast_checker().concurrency, 4);
    }

    #[tokio::test]
    async fn test_unreachable_without_fallback_is_compliant() {
        let port = closed_port().await;
        let targets = StaticTargets::new(vec![ServiceEndpoint::tcp("ns", "svc", "127.0.0.1", port)]);

        let outcome = fast_checker()
            .check(&resolve_profile(None), &targets, None)
            .await
            .unwrap();

        assert_eq!(outcome.compliant.len(), 1);
        assert!(!outcome.compliant[0].reachable);
        assert_eq!(outcome.compliant[0].probe, ProbeMode::Native);
    }

    #[tokio::test]
    async fn test_exec_fallback_uses_first_context() {
        let port = closed_port().await;
        let targets = StaticTargets::new(vec![ServiceEndpoint::tcp("tenant", "api", "127.0.0.1", port)]);
        let pod = Tls13OnlyPod {
            seen: Mutex::new(Vec::new()),
        };
        let fallback = ExecFallback::new(
            &pod,
            vec![
                ExecContext::new("probe", "probe-a", "probe"),
                ExecContext::new("probe", "probe-b", "probe"),
            ],
        );

        let outcome = fast_checker()
            .check(&resolve_profile(None), &targets, Some(&fallback))
            .await
            .unwrap();

        assert_eq!(outcome.non_compliant.len(), 1);
        let report = &outcome.non_compliant[0];
        assert_eq!(report.probe, ProbeMode::Exec);
        assert_eq!(report.tls_version.as_deref(), Some("< TLS 1.2"));
        assert_eq!(report.service_name, "api");
        assert!(
            pod.seen
                .lock()
                .unwrap()
                .iter()
                .all(|(ctx, _)| ctx.pod == "probe-a")
        );
    }

    #[tokio::test]
    async fn test_modern_via_fallback_is_compliant() {
        let port = closed_port().await;
        let targets = StaticTargets::new(vec![ServiceEndpoint::tcp("tenant", "api", "127.0.0.1", port)]);
        let pod = Tls13OnlyPod {
            seen: Mutex::new(Vec::new()),
        };
        let fallback = ExecFallback::new(&pod, vec![ExecContext::new("probe", "probe-a", "probe")]);
        let policy = resolve_profile(Some(&TlsSecurityProfile::named(ProfileType::Modern)));

        let outcome = fast_checker()
            .check(&policy, &targets, Some(&fallback))
            .await
            .unwrap();

        assert_eq!(outcome.compliant.len(), 1);
        assert_eq!(outcome.compliant[0].tls_version.as_deref(), Some("TLS 1.3"));
    }

    #[tokio::test]
    async fn test_filtered_endpoints_are_not_probed() {
        let mut udp = ServiceEndpoint::tcp("ns", "dns", "10.0.0.10", 53);
        udp.transport = Transport::Udp;
        let headless = ServiceEndpoint::tcp("ns", "db", "None", 5432);
        let targets = StaticTargets::new(vec![udp, headless]);

        let outcome = fast_checker()
            .check(&resolve_profile(None), &targets, None)
            .await
            .unwrap();
        assert_eq!(outcome.total(), 0);
    }

    struct BrokenEnumerator;

    #[async_trait]
    impl TargetEnumerator for BrokenEnumerator {
        async fn endpoints(&self) -> Result<Vec<ServiceEndpoint>> {
            anyhow::bail!("services is forbidden")
        }
    }

    #[tokio::test]
    async fn test_enumeration_failure_is_an_error() {
        let result = fast_checker()
            .check(&resolve_profile(None), &BrokenEnumerator, None)
            .await;
        assert!(result.is_err());
    }
}
