//! Duplex channel between the supervisor and the bridge
//!
//! Two anonymous pipes are created before any subprocess exists:
//!
//! - the *stdin pipe* carries tick messages from the supervisor to the interpreter
//! - the *stdout pipe* carries interpreter output back to the supervisor
//!
//! Both pipes are opened close-on-exec, so a spawned process only holds the
//! ends it is explicitly handed as standard streams. [`DuplexChannel::split`]
//! separates the supervisor's ends from the bridge's ends; each side drops
//! the other's.

use std::io::{PipeReader, PipeWriter};
use std::os::fd::OwnedFd;
use std::process::Stdio;

use tokio::net::unix::pipe;
use tokio_util::codec::FramedWrite;

use crate::error::{EsoplayError, Result};
use crate::message::TickCodec;

/// Both pipes, all four ends still held by the creating process
#[derive(Debug)]
pub struct DuplexChannel {
    stdin_read: PipeReader,
    stdin_write: PipeWriter,
    stdout_read: PipeReader,
    stdout_write: PipeWriter,
}

/// Ends used by the supervisor: write the stdin pipe, read the stdout pipe
#[derive(Debug)]
pub struct SupervisorEnds {
    /// Write end of the stdin pipe
    pub input: PipeWriter,
    /// Read end of the stdout pipe
    pub output: PipeReader,
}

/// Ends handed to the bridge: read the stdin pipe, write the stdout pipe
#[derive(Debug)]
pub struct BridgeEnds {
    /// Read end of the stdin pipe
    pub input: PipeReader,
    /// Write end of the stdout pipe
    pub output: PipeWriter,
}

impl DuplexChannel {
    /// Create both pipes
    ///
    /// # Errors
    /// Returns `EsoplayError::Channel` if either pipe cannot be created
    pub fn open() -> Result<Self> {
        let (stdin_read, stdin_write) = std::io::pipe()
            .map_err(|e| EsoplayError::channel(format!("cannot create stdin pipe: {e}")))?;
        let (stdout_read, stdout_write) = std::io::pipe()
            .map_err(|e| EsoplayError::channel(format!("cannot create stdout pipe: {e}")))?;

        Ok(Self {
            stdin_read,
            stdin_write,
            stdout_read,
            stdout_write,
        })
    }

    /// Separate the supervisor's ends from the bridge's ends
    #[must_use]
    pub fn split(self) -> (SupervisorEnds, BridgeEnds) {
        (
            SupervisorEnds {
                input: self.stdin_write,
                output: self.stdout_read,
            },
            BridgeEnds {
                input: self.stdin_read,
                output: self.stdout_write,
            },
        )
    }
}

impl SupervisorEnds {
    /// Register both ends with the async runtime
    ///
    /// The input end is wrapped in a [`TickCodec`] sink. Must be called from
    /// within a tokio runtime.
    ///
    /// # Errors
    /// Returns `EsoplayError::Channel` if an end cannot be switched to
    /// non-blocking mode or registered
    pub fn into_async(self) -> Result<(FramedWrite<pipe::Sender, TickCodec>, pipe::Receiver)> {
        let sender = pipe::Sender::from_owned_fd(OwnedFd::from(self.input))
            .map_err(|e| EsoplayError::channel(format!("cannot register stdin pipe: {e}")))?;
        let receiver = pipe::Receiver::from_owned_fd(OwnedFd::from(self.output))
            .map_err(|e| EsoplayError::channel(format!("cannot register stdout pipe: {e}")))?;

        Ok((FramedWrite::new(sender, TickCodec), receiver))
    }
}

impl BridgeEnds {
    /// Convert into the bridge's standard input and output
    #[must_use]
    pub fn into_stdio(self) -> (Stdio, Stdio) {
        (Stdio::from(self.input), Stdio::from(self.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn test_pipes_are_independent() {
        let (near, far) = DuplexChannel::open().unwrap().split();
        let SupervisorEnds { mut input, mut output } = near;
        let BridgeEnds {
            input: mut bridge_in,
            output: mut bridge_out,
        } = far;

        input.write_all(b"K=T=0\n").unwrap();
        drop(input);
        let mut received = String::new();
        bridge_in.read_to_string(&mut received).unwrap();
        assert_eq!(received, "K=T=0\n");

        bridge_out.write_all(b"OUT").unwrap();
        drop(bridge_out);
        let mut relayed = Vec::new();
        output.read_to_end(&mut relayed).unwrap();
        assert_eq!(relayed, b"OUT");
    }

    #[test]
    fn test_stream_ends_when_all_writers_close() {
        let (near, far) = DuplexChannel::open().unwrap().split();
        let second_writer = far.output.try_clone().unwrap();
        let mut output = near.output;

        drop(far);
        drop(second_writer);
        let mut buf = [0u8; 8];
        assert_eq!(output.read(&mut buf).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_async_ends_round_trip() {
        use futures::SinkExt;
        use tokio::io::AsyncReadExt;

        use crate::types::TickMessage;

        let (near, far) = DuplexChannel::open().unwrap().split();
        let (mut input, mut output) = near.into_async().unwrap();
        let BridgeEnds {
            input: mut bridge_in,
            output: mut bridge_out,
        } = far;

        input
            .send(TickMessage::new(Some(b"a".to_vec()), 7))
            .await
            .unwrap();
        drop(input);
        let line = tokio::task::spawn_blocking(move || {
            let mut line = String::new();
            bridge_in.read_to_string(&mut line).map(|_| line)
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(line, "K=aT=7\n");

        bridge_out.write_all(b"frame").unwrap();
        drop(bridge_out);
        let mut relayed = Vec::new();
        output.read_to_end(&mut relayed).await.unwrap();
        assert_eq!(relayed, b"frame");
    }
}
