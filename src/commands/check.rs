// CheckCommand - Assess cluster endpoints against the TLS security profile
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::{Command, CommandExit};
use crate::compliance::{ComplianceChecker, ComplianceOutcome, ComplianceStatus, ExecFallback};
use crate::config::AppConfig;
use crate::external::{ExecContext, Kubectl, LocalShellExecutor, RemoteExecutor};
use crate::output::{OutputFormat, json};
use crate::output::terminal::TerminalReport;
use crate::policy::{
    KubectlPolicySource, PolicySource, StaticPolicySource, TlsPolicy, resolve_from_source,
};
use crate::targets::{KubectlServiceEnumerator, ServiceEndpoint, StaticTargets, TargetEnumerator};
use crate::{Args, Result, TlsError};
use async_trait::async_trait;
use std::time::Duration;

/// CheckCommand runs one full compliance pass
///
/// Policy, targets and the exec fallback come from the merged
/// configuration (file first, command line on top).
pub struct CheckCommand {
    args: Args,
}

impl CheckCommand {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    fn kubectl(config: &AppConfig) -> Kubectl {
        Kubectl::new(&config.kubernetes.kubectl_path)
            .with_timeout(Duration::from_secs(config.kubernetes.request_timeout_secs))
    }

    async fn resolve_policy(config: &AppConfig) -> TlsPolicy {
        let source: Box<dyn PolicySource> = match &config.policy {
            Some(profile) => Box::new(StaticPolicySource::new(Some(profile.clone()))),
            None if config.kubernetes.policy_from_cluster => {
                Box::new(KubectlPolicySource::new(Self::kubectl(config)))
            }
            None => Box::new(StaticPolicySource::default()),
        };
        resolve_from_source(source.as_ref()).await
    }

    async fn collect_endpoints(config: &AppConfig) -> Result<Vec<ServiceEndpoint>> {
        let mut endpoints = StaticTargets::new(config.targets.clone()).endpoints().await?;

        if config.kubernetes.discover_services {
            let discovered = KubectlServiceEnumerator::new(
                Self::kubectl(config),
                config.kubernetes.namespaces.clone(),
            )
            .endpoints()
            .await?;
            tracing::info!("Discovered {} service port(s)", discovered.len());
            endpoints.extend(discovered);
        }

        Ok(endpoints)
    }

    /// Executor and contexts for endpoints the tool cannot reach itself
    fn exec_fallback(
        &self,
        config: &AppConfig,
    ) -> (Option<Box<dyn RemoteExecutor>>, Vec<ExecContext>) {
        let mut contexts = config.exec_contexts.clone();

        if self.args.cluster.local_exec {
            if contexts.is_empty() {
                contexts.push(ExecContext::new("local", "local", "local"));
            }
            // The shell wrapper needs longer than the s_client timeout inside it
            let limit = Duration::from_secs(config.probe.exec_timeout_secs + 5);
            let executor: Box<dyn RemoteExecutor> = Box::new(LocalShellExecutor::new(limit));
            return (Some(executor), contexts);
        }

        if contexts.is_empty() {
            tracing::debug!("No exec context configured, unreachable endpoints are not retried");
            return (None, contexts);
        }

        let executor: Box<dyn RemoteExecutor> = Box::new(Self::kubectl(config));
        (Some(executor), contexts)
    }

    fn report(&self, outcome: &ComplianceOutcome) -> Result<()> {
        let output = &self.args.output;

        if let Some(path) = &output.json {
            json::write_json_file(outcome, path, output.json_pretty)?;
            if !output.json_stdout {
                println!("✓ Results exported to JSON: {}", path.display());
            }
        }

        let format = if output.json_stdout {
            OutputFormat::json(output.json_pretty)
        } else {
            OutputFormat::Terminal
        };

        match format {
            OutputFormat::Terminal => {
                println!("{}", TerminalReport::new(outcome).quiet(output.quiet))
            }
            OutputFormat::JSON | OutputFormat::JSONPretty => {
                println!("{}", json::generate_json(outcome, format.is_pretty())?)
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self) -> Result<CommandExit> {
        let config = self.args.effective_config()?;

        if config.targets.is_empty() && !config.kubernetes.discover_services {
            return Err(TlsError::InvalidInput {
                message: "No endpoints to check: use --target, --discover-services or a config file"
                    .to_string(),
            }
            .into());
        }

        let policy = Self::resolve_policy(&config).await;
        let endpoints = Self::collect_endpoints(&config).await?;

        let (executor, contexts) = self.exec_fallback(&config);
        let fallback = executor
            .as_deref()
            .map(|executor| ExecFallback::new(executor, contexts));

        let checker = ComplianceChecker::new(config.probe.settings())
            .with_concurrency(config.probe.concurrency);
        let outcome = checker
            .check(&policy, &StaticTargets::new(endpoints), fallback.as_ref())
            .await?;

        self.report(&outcome)?;

        Ok(match outcome.status() {
            ComplianceStatus::Pass => CommandExit::Success,
            ComplianceStatus::Fail => CommandExit::NonCompliant,
        })
    }

    fn name(&self) -> &'static str {
        "CheckCommand"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tokio::net::TcpListener;

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_unreachable_target_passes_and_writes_report() {
        let port = closed_port().await;
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.json");

        let args = Args::try_parse_from([
            "tlsprofile".to_string(),
            "--target".to_string(),
            format!("tenant/api/127.0.0.1:{}", port),
            "--dial-timeout".to_string(),
            "1".to_string(),
            "--json".to_string(),
            report.display().to_string(),
            "-q".to_string(),
        ])
        .unwrap();

        let exit = CheckCommand::new(args).execute().await.unwrap();
        assert_eq!(exit, CommandExit::Success);

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
        assert_eq!(value["compliant"][0]["reachable"], false);
        assert_eq!(value["profile"], "Intermediate");
    }

    #[tokio::test]
    async fn test_no_targets_is_an_error() {
        let args = Args::try_parse_from(["tlsprofile"]).unwrap();
        assert!(CheckCommand::new(args).execute().await.is_err());
    }

    #[tokio::test]
    async fn test_cli_profile_wins_over_cluster_lookup() {
        let mut config = AppConfig::default();
        config.policy = Some(crate::policy::TlsSecurityProfile::named(
            crate::policy::ProfileType::Modern,
        ));
        config.kubernetes.policy_from_cluster = true;

        let policy = CheckCommand::resolve_policy(&config).await;
        assert_eq!(policy.profile_type(), crate::policy::ProfileType::Modern);
    }
}
