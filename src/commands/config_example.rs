// ConfigExampleCommand - Writes an example configuration file
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::{Command, CommandExit};
use crate::Result;
use crate::config::AppConfig;
use async_trait::async_trait;
use std::path::PathBuf;

pub struct ConfigExampleCommand {
    path: PathBuf,
}

impl ConfigExampleCommand {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Command for ConfigExampleCommand {
    async fn execute(&self) -> Result<CommandExit> {
        AppConfig::example().save_to_file(&self.path)?;
        println!(
            "✓ Example configuration saved to: {}",
            self.path.display()
        );
        Ok(CommandExit::Success)
    }

    fn name(&self) -> &'static str {
        "ConfigExampleCommand"
    }
}
