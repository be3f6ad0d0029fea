// Integration tests for the compliance checker

mod common;

use common::{closed_port, plain_server, tls_server};
use openssl::ssl::SslVersion;
use tlsprofile::compliance::{ComplianceChecker, ComplianceStatus, ExecFallback};
use tlsprofile::external::{ExecContext, LocalShellExecutor, check_tool_available};
use tlsprofile::policy::{ProfileType, TlsSecurityProfile, resolve_profile};
use tlsprofile::probe::{ExecProber, NativeProber, ProbeMode, ProbeSettings, Prober};
use tlsprofile::targets::{ServiceEndpoint, StaticTargets};
use std::time::Duration;

fn settings() -> ProbeSettings {
    ProbeSettings {
        dial_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_mixed_cluster_against_modern() {
    let tls13 = tls_server(SslVersion::TLS1_3, SslVersion::TLS1_3, None);
    let tls12 = tls_server(SslVersion::TLS1_2, SslVersion::TLS1_3, None);
    let plain = plain_server();
    let closed = closed_port();

    let headless = ServiceEndpoint::tcp("tenant", "headless", "None", 443);

    let targets = StaticTargets::new(vec![
        ServiceEndpoint::tcp("tenant", "strict", "127.0.0.1", tls13),
        ServiceEndpoint::tcp("tenant", "legacy", "127.0.0.1", tls12),
        ServiceEndpoint::tcp("tenant", "metrics", "127.0.0.1", plain),
        ServiceEndpoint::tcp("tenant", "gone", "127.0.0.1", closed),
        headless,
    ]);
    let policy = resolve_profile(Some(&TlsSecurityProfile::named(ProfileType::Modern)));

    let outcome = ComplianceChecker::new(settings())
        .with_concurrency(4)
        .check(&policy, &targets, None)
        .await
        .unwrap();

    assert_eq!(outcome.status(), ComplianceStatus::Fail);
    assert_eq!(outcome.total(), 4, "headless service is skipped");
    assert_eq!(outcome.non_compliant.len(), 1);
    assert_eq!(outcome.non_compliant[0].service_name, "legacy");
    assert_eq!(outcome.non_compliant[0].tls_version.as_deref(), Some("TLS 1.2"));
    assert_eq!(outcome.verified_tls(), 1);

    let metrics = outcome
        .compliant
        .iter()
        .find(|r| r.service_name == "metrics")
        .unwrap();
    assert!(metrics.reachable && !metrics.is_tls);

    let gone = outcome
        .compliant
        .iter()
        .find(|r| r.service_name == "gone")
        .unwrap();
    assert!(!gone.reachable);
    assert_eq!(gone.probe, ProbeMode::Native);
}

#[tokio::test]
async fn test_fallback_is_used_only_for_unreachable_endpoints() {
    let tls13 = tls_server(SslVersion::TLS1_3, SslVersion::TLS1_3, None);
    let targets = StaticTargets::new(vec![ServiceEndpoint::tcp(
        "tenant", "strict", "127.0.0.1", tls13,
    )]);
    let policy = resolve_profile(Some(&TlsSecurityProfile::named(ProfileType::Modern)));

    let executor = LocalShellExecutor::new(Duration::from_secs(10));
    let fallback = ExecFallback::new(&executor, vec![ExecContext::new("local", "local", "local")]);

    let outcome = ComplianceChecker::new(settings())
        .check(&policy, &targets, Some(&fallback))
        .await
        .unwrap();

    assert_eq!(outcome.status(), ComplianceStatus::Pass);
    assert_eq!(outcome.compliant[0].probe, ProbeMode::Native);
}

#[tokio::test]
async fn test_exec_probe_agrees_with_native_probe() {
    if !check_tool_available("openssl") || !check_tool_available("timeout") {
        return;
    }

    let executor = LocalShellExecutor::new(Duration::from_secs(10));
    let context = ExecContext::new("local", "local", "local");
    let exec = ExecProber::new(&executor, &context, settings());
    let native = NativeProber::new(settings());

    let servers = [
        tls_server(SslVersion::TLS1_3, SslVersion::TLS1_3, None),
        tls_server(SslVersion::TLS1_2, SslVersion::TLS1_3, None),
    ];

    for profile_type in [ProfileType::Modern, ProfileType::Intermediate] {
        let policy = resolve_profile(Some(&TlsSecurityProfile::named(profile_type)));
        for port in servers {
            let n = native.probe("127.0.0.1", port, &policy).await;
            let e = exec.probe("127.0.0.1", port, &policy).await;
            assert_eq!(n.compliant, e.compliant, "{} / {}", n.reason, e.reason);
            assert_eq!(n.negotiated_version, e.negotiated_version);
            assert!(e.reason.ends_with("(via exec probe)"));
        }
    }
}
