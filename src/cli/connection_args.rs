// Connection and timeout configuration arguments
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use clap::Args;

/// Probe timeouts and parallelism; unset values come from the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// TCP connect and handshake timeout in seconds
    #[arg(long = "dial-timeout", value_name = "SECONDS")]
    pub dial_timeout: Option<u64>,

    /// Timeout for one openssl s_client run in a pod, in seconds
    #[arg(long = "exec-timeout", value_name = "SECONDS")]
    pub exec_timeout: Option<u64>,

    /// Number of endpoints probed concurrently (default: one at a time)
    #[arg(long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// Path to the openssl binary inside probe pods
    #[arg(long = "openssl", value_name = "PATH")]
    pub openssl_path: Option<String>,
}
