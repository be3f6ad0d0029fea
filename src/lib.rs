// tlsprofile - TLS security profile compliance checker for cluster services
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

//! tlsprofile verifies that every TLS-serving endpoint of a cluster honors
//! the configured TLS security profile (Old, Intermediate, Modern or Custom).
//! Endpoints are probed with a native TLS client and, when the tool cannot
//! reach them, with `openssl s_client` run inside a cluster pod.

pub mod ciphers;
pub mod cli;
pub mod commands;
pub mod compliance;
pub mod config;
pub mod error;
pub mod external;
pub mod output;
pub mod policy;
pub mod probe;
pub mod protocols;
pub mod security;
pub mod targets;
pub mod utils;

// Re-export commonly used types
pub use crate::cli::Args;
pub use crate::compliance::{ComplianceChecker, ComplianceOutcome, ComplianceStatus};
pub use crate::error::TlsError;
pub use crate::output::OutputFormat;
pub use crate::policy::{TlsPolicy, resolve_profile};
pub use crate::probe::{TlsProbeResult, probe_tls, probe_tls_via_exec};

/// Result type for tlsprofile operations
pub type Result<T> = anyhow::Result<T>;

/// Error type for tlsprofile operations
pub use anyhow::Error;
