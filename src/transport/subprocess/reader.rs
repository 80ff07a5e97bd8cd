//! Output reading logic for subprocess transport

use tokio::io::AsyncReadExt;

use super::transport::InterpreterTransport;

impl InterpreterTransport {
    /// Read available output without waiting
    ///
    /// A released output end reads as end of stream.
    pub(super) fn try_read_impl(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.output {
            Some(ref output) => output.try_read(buf),
            None => Ok(0),
        }
    }

    /// Read output, waiting for bytes or end of stream
    ///
    /// End of stream arrives once every writer (bridge and interpreter) has
    /// closed its copy of the write end.
    pub(super) async fn read_impl(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.output {
            Some(ref mut output) => output.read(buf).await,
            None => Ok(0),
        }
    }
}
