// CommandRouter - Routes CLI arguments to appropriate Command
// Copyright (C) 2025 Marc Rivero (@seifreed)
// Licensed under GPL-3.0

use super::{CheckCommand, Command, ConfigExampleCommand};
use crate::{Args, Result};

/// CommandRouter determines which Command to execute based on CLI arguments
///
/// 1. Example configuration (--config-example)
/// 2. Compliance check (default)
pub struct CommandRouter;

impl CommandRouter {
    /// Route CLI arguments to the appropriate Command
    pub fn route(args: Args) -> Result<Box<dyn Command>> {
        args.validate()?;

        if let Some(path) = &args.config_example {
            return Ok(Box::new(ConfigExampleCommand::new(path.clone())));
        }

        Ok(Box::new(CheckCommand::new(args)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_routing() {
        let args = Args::try_parse_from(["tlsprofile", "--config-example", "out.toml"]).unwrap();
        assert_eq!(CommandRouter::route(args).unwrap().name(), "ConfigExampleCommand");

        let args = Args::try_parse_from(["tlsprofile", "--target", "ns/svc/10.0.0.1:443"]).unwrap();
        assert_eq!(CommandRouter::route(args).unwrap().name(), "CheckCommand");
    }

    #[test]
    fn test_invalid_args_are_not_routed() {
        let args =
            Args::try_parse_from(["tlsprofile", "--profile", "old", "--policy-from-cluster"])
                .unwrap();
        assert!(CommandRouter::route(args).is_err());
    }
}
