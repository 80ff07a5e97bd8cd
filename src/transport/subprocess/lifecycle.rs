//! Lifecycle management for subprocess transport (connect, reap, close)

use std::ffi::OsStr;

use crate::channel::DuplexChannel;
use crate::error::{EsoplayError, Result};

use super::command::BridgeCommand;
use super::config::{BRIDGE_ENV, BRIDGE_SUBCOMMAND, LAUNCH_FAILED_EXIT_CODE};
use super::transport::InterpreterTransport;

/// Refuse to start a session from inside a bridge process
///
/// A bridge program that never dispatched the bridge subcommand would
/// otherwise start another session, which spawns another bridge, and so on.
fn ensure_not_bridge(marker: Option<&OsStr>) -> Result<()> {
    match marker {
        Some(_) => Err(EsoplayError::spawn(format!(
            "bridge program did not handle `{BRIDGE_SUBCOMMAND}`; \
             call esoplay::bridge::dispatch_if_bridge() first in main"
        ))),
        None => Ok(()),
    }
}

impl InterpreterTransport {
    /// Connect the transport
    ///
    /// Creates both pipes, spawns the bridge on the far ends and keeps the
    /// near ends. The bridge's ends are closed here as soon as it is running.
    ///
    /// # Errors
    /// Returns error if pipe creation or bridge spawning fails
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.bridge.is_some() {
            return Ok(());
        }
        ensure_not_bridge(std::env::var_os(BRIDGE_ENV).as_deref())?;

        let (near, far) = DuplexChannel::open()?.split();

        let child = {
            let mut cmd = BridgeCommand::new(&self.bridge_program, &self.options).build(far);
            cmd.spawn().map_err(|e| {
                EsoplayError::spawn(format!("{}: {e}", self.bridge_program.display()))
            })?
            // cmd dropped here, closing the supervisor's copies of the bridge ends
        };

        log::debug!(
            "bridge spawned (pid {:?}) for {} {}",
            child.id(),
            self.options.interpreter,
            self.options.file.display()
        );

        let (input, output) = near.into_async()?;
        self.input = Some(input);
        self.output = Some(output);
        self.bridge = Some(child);
        self.ready = true;

        Ok(())
    }

    /// Wait for the bridge to exit and interpret its status
    ///
    /// # Errors
    /// Returns `EsoplayError::LaunchFailed` when the bridge exits with the
    /// launch failure status, or an I/O error if waiting fails
    pub(super) async fn wait_bridge_impl(&mut self) -> Result<()> {
        let Some(mut child) = self.bridge.take() else {
            return Ok(());
        };

        let status = child.wait().await?;
        log::debug!("bridge exited with {status}");

        match status.code() {
            Some(0) => Ok(()),
            Some(LAUNCH_FAILED_EXIT_CODE) => Err(EsoplayError::launch_failed(
                self.options.interpreter.clone(),
                LAUNCH_FAILED_EXIT_CODE,
            )),
            _ => {
                log::warn!("bridge exited abnormally: {status}");
                Ok(())
            }
        }
    }

    /// Release the supervisor's channel ends
    pub(super) fn close_impl(&mut self) {
        self.ready = false;
        self.input = None;
        self.output = None;
    }
}

impl Drop for InterpreterTransport {
    fn drop(&mut self) {
        // The process tree is never signalled; an unreaped bridge is only reported
        if let Some(pid) = self.bridge_pid() {
            log::debug!("transport dropped before bridge {pid} was reaped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_allowed_outside_bridge() {
        assert!(ensure_not_bridge(None).is_ok());
    }

    #[test]
    fn test_session_refused_inside_bridge() {
        let result = ensure_not_bridge(Some(OsStr::new("1")));
        assert!(matches!(
            result,
            Err(EsoplayError::Spawn(msg)) if msg.contains("dispatch_if_bridge")
        ));
    }
}
