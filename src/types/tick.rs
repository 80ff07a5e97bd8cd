//! Tick message sent to the interpreter once per tick

use std::fmt;

/// One outbound tick record
///
/// Serialized on the wire as `K=<key>T=<elapsed_ms>` followed by a newline.
/// `key` is empty when nothing was typed during the tick window. Key bytes
/// are passed through as typed, whether or not they are valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMessage {
    /// Key token read during this tick, if any
    pub key: Option<Vec<u8>>,
    /// Milliseconds since the session started
    pub elapsed_ms: u64,
}

impl TickMessage {
    /// Create a tick message
    pub fn new(key: Option<Vec<u8>>, elapsed_ms: u64) -> Self {
        Self { key, elapsed_ms }
    }

    /// Key as written on the wire (empty when absent)
    #[must_use]
    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_deref().unwrap_or_default()
    }

    /// Line body without its terminator, exactly as sent
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let elapsed = self.elapsed_ms.to_string();
        let mut line = Vec::with_capacity(4 + self.key_bytes().len() + elapsed.len());
        line.extend_from_slice(b"K=");
        line.extend_from_slice(self.key_bytes());
        line.extend_from_slice(b"T=");
        line.extend_from_slice(elapsed.as_bytes());
        line
    }
}

/// Formats the line body for logs; invalid UTF-8 in the key is shown lossily
impl fmt::Display for TickMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "K={}T={}",
            String::from_utf8_lossy(self.key_bytes()),
            self.elapsed_ms
        )
    }
}
