// Command trait - Defines the interface for all command implementations
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use crate::Result;
use async_trait::async_trait;

/// How a command finished, mapped to the process exit code by main
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandExit {
    Success,
    /// At least one endpoint violates the policy
    NonCompliant,
}

impl CommandExit {
    pub fn code(&self) -> i32 {
        match self {
            CommandExit::Success => 0,
            CommandExit::NonCompliant => 1,
        }
    }
}

/// One operational mode of the tool
///
/// Commands validate their own preconditions. Errors are returned for
/// failures that prevent a verdict; a failed verdict is a `CommandExit`.
#[async_trait]
pub trait Command: Send + Sync {
    /// Execute the command asynchronously
    async fn execute(&self) -> Result<CommandExit>;

    /// Get a human-readable name for this command (for logging/debugging)
    fn name(&self) -> &'static str;
}
