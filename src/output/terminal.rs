// Terminal Output Module

//! Human-readable report for a compliance run

use crate::compliance::{ComplianceOutcome, ComplianceStatus, ReportObject};
use crate::probe::ProbeMode;
use colored::*;
use std::fmt;

/// Terminal rendering of a [`ComplianceOutcome`]
pub struct TerminalReport<'a> {
    outcome: &'a ComplianceOutcome,
    quiet: bool,
}

impl<'a> TerminalReport<'a> {
    pub fn new(outcome: &'a ComplianceOutcome) -> Self {
        Self {
            outcome,
            quiet: false,
        }
    }

    /// Only list non-compliant endpoints
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    fn write_entry(f: &mut fmt::Formatter<'_>, report: &ReportObject) -> fmt::Result {
        let symbol = if !report.compliant {
            "✗".red()
        } else if report.is_tls {
            "✓".green()
        } else {
            "-".yellow()
        };

        let endpoint = format!(
            "{}/{}:{}/{}",
            report.namespace, report.service_name, report.port_number, report.port_protocol
        );
        let version = report.tls_version.as_deref().unwrap_or("n/a");
        let probe = match report.probe {
            ProbeMode::Native => "native".normal(),
            ProbeMode::Exec => "exec".magenta(),
        };

        writeln!(
            f,
            "  {} {:<50} {:<10} {:<7} {}",
            symbol,
            endpoint.cyan(),
            version,
            probe,
            report.reason
        )
    }
}

impl fmt::Display for TerminalReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.outcome;

        writeln!(f)?;
        writeln!(f, "{}", "TLS Security Profile Compliance".cyan().bold())?;
        writeln!(f, "{}", "═".repeat(60))?;
        writeln!(
            f,
            "Profile: {} (minimum {})",
            outcome.profile.to_string().bold(),
            outcome.min_version
        )?;
        writeln!(
            f,
            "Checked: {}",
            outcome.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(f)?;

        if !outcome.non_compliant.is_empty() {
            writeln!(f, "{}", "Non-compliant:".red().bold())?;
            for report in &outcome.non_compliant {
                Self::write_entry(f, report)?;
            }
            writeln!(f)?;
        }

        if !self.quiet && !outcome.compliant.is_empty() {
            writeln!(f, "{}", "Compliant:".green().bold())?;
            for report in &outcome.compliant {
                Self::write_entry(f, report)?;
            }
            writeln!(f)?;
        }

        let status = match outcome.status() {
            ComplianceStatus::Pass => outcome.status().to_string().green().bold(),
            ComplianceStatus::Fail => outcome.status().to_string().red().bold(),
        };
        writeln!(
            f,
            "Result: {}  {} endpoints, {} non-compliant, {} verified over TLS",
            status,
            outcome.total(),
            outcome.non_compliant.len(),
            outcome.verified_tls()
        )
    }
}
