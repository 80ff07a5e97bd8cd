//! Bridge command building logic for subprocess transport

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::channel::BridgeEnds;
use crate::types::options::SupervisorOptions;

use super::config::{BRIDGE_ENV, BRIDGE_SUBCOMMAND};

/// Command builder for the bridge process
pub struct BridgeCommand<'a> {
    bridge_program: &'a Path,
    options: &'a SupervisorOptions,
}

impl<'a> BridgeCommand<'a> {
    /// Create a new command builder
    pub fn new(bridge_program: &'a Path, options: &'a SupervisorOptions) -> Self {
        Self {
            bridge_program,
            options,
        }
    }

    /// Arguments passed to the bridge program
    #[must_use]
    pub fn args(&self) -> Vec<std::ffi::OsString> {
        vec![
            BRIDGE_SUBCOMMAND.into(),
            "--".into(),
            self.options.interpreter.clone().into(),
            self.options.file.clone().into_os_string(),
        ]
    }

    /// Build the bridge command wired to the given channel ends
    ///
    /// The command takes ownership of the ends; dropping it after spawning
    /// closes the supervisor's copies.
    pub fn build(&self, ends: BridgeEnds) -> Command {
        let (stdin, stdout) = ends.into_stdio();
        let mut cmd = Command::new(self.bridge_program);
        cmd.args(self.args())
            .env(BRIDGE_ENV, "1")
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::inherit());
        cmd
    }
}
