// Commands module - Command Pattern implementation
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

mod command;
mod router;

// Individual command implementations
mod check;
mod config_example;

pub use command::{Command, CommandExit};
pub use router::CommandRouter;

pub use check::CheckCommand;
pub use config_example::ConfigExampleCommand;
