//! Keyboard sampling over the process's standard input
//!
//! Standard input is read on a dedicated thread: a blocking terminal read
//! cannot be cancelled, and parking it on the runtime's blocking pool would
//! hold up shutdown until the user presses enter. Tokens are handed to the
//! tick loop through an unbounded channel.

use std::io::Read;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::error::Result;
use crate::message::TokenCodec;
use crate::transport::KeySource;

const STDIN_READ_CHUNK: usize = 256;

/// [`KeySource`] fed by a token stream
pub struct TerminalKeys {
    tokens: Option<mpsc::UnboundedReceiver<std::io::Result<Vec<u8>>>>,
}

impl TerminalKeys {
    /// Start reading tokens from standard input
    ///
    /// # Errors
    /// Returns error if the reader thread cannot be started
    pub fn spawn() -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("esoplay-keyboard".to_string())
            .spawn(move || read_tokens(std::io::stdin().lock(), &tx))?;
        Ok(Self::from_receiver(rx))
    }

    /// Build from an existing token receiver
    #[must_use]
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<std::io::Result<Vec<u8>>>) -> Self {
        Self { tokens: Some(rx) }
    }
}

impl KeySource for TerminalKeys {
    async fn next_key(&mut self, window: Duration) -> Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + window;

        let Some(tokens) = self.tokens.as_mut() else {
            tokio::time::sleep_until(deadline).await;
            return Ok(None);
        };

        match tokio::time::timeout_at(deadline, tokens.recv()).await {
            Err(_) => Ok(None),
            Ok(Some(Ok(token))) => Ok(Some(token)),
            Ok(Some(Err(e))) => Err(e.into()),
            Ok(None) => {
                // Input closed: keep pacing ticks without keys
                log::debug!("keyboard input closed");
                self.tokens = None;
                tokio::time::sleep_until(deadline).await;
                Ok(None)
            }
        }
    }
}

/// Decode whitespace-delimited tokens from `reader` until end of input
///
/// Read errors are forwarded and end the reader; so does a dropped receiver.
pub fn read_tokens<R: Read>(
    mut reader: R,
    tx: &mpsc::UnboundedSender<std::io::Result<Vec<u8>>>,
) {
    let mut codec = TokenCodec;
    let mut buf = BytesMut::with_capacity(STDIN_READ_CHUNK);
    let mut chunk = [0u8; STDIN_READ_CHUNK];

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => {
                while let Ok(Some(token)) = codec.decode_eof(&mut buf) {
                    if tx.send(Ok(token)).is_err() {
                        return;
                    }
                }
                return;
            }
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                while let Ok(Some(token)) = codec.decode(&mut buf) {
                    if tx.send(Ok(token)).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_tokens_splits_on_whitespace() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        read_tokens(&b"a bb\n  ccc"[..], &tx);
        drop(tx);

        let mut tokens = Vec::new();
        while let Ok(token) = rx.try_recv() {
            tokens.push(token.unwrap());
        }
        assert_eq!(tokens, vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_elapses_without_key() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut keys = TerminalKeys::from_receiver(rx);
        let key = keys.next_key(Duration::from_millis(100)).await.unwrap();
        assert_eq!(key, None);
    }

    #[tokio::test]
    async fn test_key_ready_within_window() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut keys = TerminalKeys::from_receiver(rx);
        tx.send(Ok(b"a".to_vec())).unwrap();
        let key = keys.next_key(Duration::from_secs(5)).await.unwrap();
        assert_eq!(key.as_deref(), Some(&b"a"[..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_still_paces_ticks() {
        let (tx, rx) = mpsc::unbounded_channel::<std::io::Result<Vec<u8>>>();
        drop(tx);
        let mut keys = TerminalKeys::from_receiver(rx);

        let started = Instant::now();
        assert_eq!(keys.next_key(Duration::from_millis(100)).await.unwrap(), None);
        assert_eq!(keys.next_key(Duration::from_millis(100)).await.unwrap(), None);
        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_read_error_is_reported() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut keys = TerminalKeys::from_receiver(rx);
        tx.send(Err(std::io::Error::other("tty gone"))).unwrap();
        assert!(keys.next_key(Duration::from_secs(5)).await.is_err());
    }
}
