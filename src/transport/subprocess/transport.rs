//! Subprocess transport implementation over the duplex channel

use futures::SinkExt;
use std::path::PathBuf;
use tokio::net::unix::pipe;
use tokio::process::Child;
use tokio_util::codec::FramedWrite;

use crate::Transport;
use crate::error::{EsoplayError, Result};
use crate::message::TickCodec;
use crate::types::TickMessage;
use crate::types::options::SupervisorOptions;

/// Transport to an interpreter launched through a bridge process
pub struct InterpreterTransport {
    pub(super) options: SupervisorOptions,
    pub(super) bridge_program: PathBuf,
    pub(super) bridge: Option<Child>,
    pub(super) input: Option<FramedWrite<pipe::Sender, TickCodec>>,
    pub(super) output: Option<pipe::Receiver>,
    pub(super) ready: bool,
}

impl InterpreterTransport {
    /// Create a new transport
    ///
    /// # Errors
    /// Returns error if the options are invalid or the bridge program cannot be resolved
    pub fn new(options: SupervisorOptions) -> Result<Self> {
        options.validate()?;
        let bridge_program = options.resolve_bridge_program()?;

        Ok(Self {
            options,
            bridge_program,
            bridge: None,
            input: None,
            output: None,
            ready: false,
        })
    }

    /// Process id of the bridge, while it has not been reaped
    #[must_use]
    pub fn bridge_pid(&self) -> Option<u32> {
        self.bridge.as_ref().and_then(Child::id)
    }
}

impl Transport for InterpreterTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn write(&mut self, message: TickMessage) -> Result<()> {
        if !self.is_ready() {
            return Err(EsoplayError::transport("Transport is not ready for writing"));
        }

        let input = self
            .input
            .as_mut()
            .ok_or_else(|| EsoplayError::transport("interpreter input not available"))?;

        input.send(message).await?;
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.try_read_impl(buf)
    }

    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read_impl(buf).await
    }

    async fn end_input(&mut self) -> Result<()> {
        if let Some(mut input) = self.input.take() {
            input
                .close()
                .await
                .map_err(|e| EsoplayError::transport(format!("Failed to close input: {e}")))?;
        }
        Ok(())
    }

    async fn wait_bridge(&mut self) -> Result<()> {
        self.wait_bridge_impl().await
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn close(&mut self) {
        self.close_impl();
    }
}
