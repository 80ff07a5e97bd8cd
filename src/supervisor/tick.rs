//! One iteration of the fixed-rate tick loop

use std::io::ErrorKind;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::transport::subprocess::config::MAX_DRAIN_BYTES_PER_TICK;
use crate::transport::{KeySource, Transport};
use crate::types::{Session, Termination};

use super::Supervisor;

/// Bytes gathered by one drain
#[derive(Debug, Default)]
pub(super) struct Drain {
    pub frame: Vec<u8>,
    pub end_of_stream: bool,
}

impl<T, K, W> Supervisor<T, K, W>
where
    T: Transport,
    K: KeySource,
    W: AsyncWrite + Unpin + Send,
{
    /// Run one tick: sample a key, send the tick message, drain and relay output
    ///
    /// Keyboard, read and terminal errors are logged and the tick carries on.
    /// A failed input write terminates the session before anything is drained.
    pub(super) async fn tick(&mut self, session: &mut Session) {
        let key = match self.keys.next_key(self.options.tick_period()).await {
            Ok(key) => key,
            Err(e) => {
                log::warn!("keyboard wait failed: {e}");
                None
            }
        };

        let Some(message) = session.next_message(key) else {
            return;
        };
        log::trace!("tick {}: {message}", session.ticks_sent());

        if let Err(e) = self.transport.write(message).await {
            if e.is_broken_pipe() {
                log::warn!("interpreter closed its input");
            } else {
                log::warn!("write to interpreter failed: {e}");
            }
            session.terminate(Termination::InputClosed);
            return;
        }

        let drain = self.drain();

        let scan = self.scanner.feed(&drain.frame);
        if scan.found && session.terminate(Termination::Sentinel) {
            log::debug!("sentinel received");
        }
        if drain.end_of_stream && session.terminate(Termination::OutputClosed) {
            log::debug!("interpreter output closed without sentinel");
        }

        self.forward(&scan.output).await;
    }

    /// Read everything currently available without blocking
    pub(super) fn drain(&mut self) -> Drain {
        let mut drain = Drain::default();

        while drain.frame.len() < MAX_DRAIN_BYTES_PER_TICK {
            match self.transport.try_read(&mut self.buffer) {
                Ok(0) => {
                    drain.end_of_stream = true;
                    break;
                }
                Ok(n) => drain.frame.extend_from_slice(&self.buffer[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    log::warn!("read from interpreter failed: {e}");
                    break;
                }
            }
        }

        drain
    }

    /// Write bytes to the terminal and flush them
    pub(super) async fn forward(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let result = match self.terminal.write_all(bytes).await {
            Ok(()) => self.terminal.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::warn!("write to terminal failed: {e}");
        }
    }
}
