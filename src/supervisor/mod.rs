//! Top-level supervisor
//!
//! Wires the pieces together for one session: connect the transport (pipes
//! and bridge), run the tick loop until the session terminates, then reap
//! the process tree and forward whatever output is left.

mod reaper;
mod tick;

use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::keyboard::TerminalKeys;
use crate::message::SentinelScanner;
use crate::transport::{InterpreterTransport, KeySource, Transport};
use crate::types::options::SupervisorOptions;
use crate::types::{Session, Termination};

/// Drives one interpreter session
pub struct Supervisor<T, K, W> {
    transport: T,
    keys: K,
    terminal: W,
    options: SupervisorOptions,
    scanner: SentinelScanner,
    buffer: Vec<u8>,
}

impl<T, K, W> Supervisor<T, K, W>
where
    T: Transport,
    K: KeySource,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a supervisor over explicit collaborators
    pub fn new(transport: T, keys: K, terminal: W, options: SupervisorOptions) -> Self {
        let buffer = vec![0u8; options.read_buffer_size.max(1)];
        Self {
            transport,
            keys,
            terminal,
            options,
            scanner: SentinelScanner::new(),
            buffer,
        }
    }

    /// The transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The terminal output sink
    pub fn terminal(&self) -> &W {
        &self.terminal
    }

    /// Run the session to completion
    ///
    /// Connects, ticks until the session terminates, then reaps. Reaping
    /// happens on every termination path, including a failed input write.
    ///
    /// # Errors
    /// Returns error if connecting fails, or if reaping reveals that the
    /// interpreter could not be launched
    pub async fn run(&mut self) -> Result<Termination> {
        self.transport.connect().await?;

        let mut session = Session::start();
        let termination = loop {
            self.tick(&mut session).await;
            if let Some(reason) = session.termination() {
                break reason;
            }
        };
        log::info!(
            "session terminated ({termination:?}) after {} ticks",
            session.ticks_sent()
        );

        self.reap().await?;
        Ok(termination)
    }
}

/// Run a session against the real terminal
///
/// Keys are read from standard input and output is relayed to standard output.
///
/// # Errors
/// Returns error on invalid options, channel or spawn failure, or interpreter launch failure
pub async fn run(options: SupervisorOptions) -> Result<Termination> {
    let transport = InterpreterTransport::new(options.clone())?;
    let keys = TerminalKeys::spawn()?;
    let mut supervisor = Supervisor::new(transport, keys, tokio::io::stdout(), options);
    supervisor.run().await
}
