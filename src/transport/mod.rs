//! Transport layer between the supervisor and the interpreter
//!
//! This module provides the seams the tick loop is written against:
//! [`Transport`] for the duplex channel to the bridge and interpreter, and
//! [`KeySource`] for sampling keyboard input within a tick window.

pub mod subprocess;

use std::time::Duration;

use crate::error::Result;
use crate::types::TickMessage;

/// Transport trait for talking to the interpreter
///
/// Implementations own the supervisor's ends of the duplex channel and the
/// handle of the bridge process.
pub trait Transport: Send {
    /// Create the channel and spawn the bridge
    ///
    /// # Errors
    /// Returns error if the channel cannot be created or the bridge cannot be spawned
    fn connect(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Write one tick message to the interpreter's input
    ///
    /// # Errors
    /// Returns error if the write fails; a broken pipe means the interpreter
    /// side no longer reads its input
    fn write(&mut self, message: TickMessage)
    -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read whatever output is available without waiting
    ///
    /// Returns `Ok(0)` at end of stream and an error of kind
    /// `WouldBlock` when no bytes are available right now.
    ///
    /// # Errors
    /// Returns `WouldBlock` or the underlying read error
    fn try_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;

    /// Read output, waiting until bytes arrive or the stream ends
    ///
    /// # Errors
    /// Returns the underlying read error
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl std::future::Future<Output = std::io::Result<usize>> + Send;

    /// Close the interpreter's input
    ///
    /// # Errors
    /// Returns error if flushing the pending input fails
    fn end_input(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Wait for the bridge process to exit
    ///
    /// # Errors
    /// Returns `EsoplayError::LaunchFailed` if the bridge reports that the
    /// interpreter could not be launched
    fn wait_bridge(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Check if transport is ready for communication
    fn is_ready(&self) -> bool;

    /// Release the remaining channel ends
    fn close(&mut self);
}

/// Source of keyboard tokens
pub trait KeySource: Send {
    /// Wait up to `window` for one whitespace-delimited token, as raw bytes
    ///
    /// Returns `Ok(None)` when the window elapsed without input.
    ///
    /// # Errors
    /// Returns error if reading the terminal failed
    fn next_key(
        &mut self,
        window: Duration,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
}

pub use subprocess::InterpreterTransport;
