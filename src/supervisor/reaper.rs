//! Final synchronization with the process tree

use tokio::io::AsyncWrite;

use crate::error::Result;
use crate::transport::{KeySource, Transport};

use super::Supervisor;

impl<T, K, W> Supervisor<T, K, W>
where
    T: Transport,
    K: KeySource,
    W: AsyncWrite + Unpin + Send,
{
    /// Wait for the bridge and the interpreter, then release the channel
    ///
    /// The interpreter's input is closed first so an interpreter reading to
    /// end of input can finish. The output pipe is then read to end of
    /// stream, which only arrives once the interpreter (the last writer) has
    /// exited; remaining output is forwarded with sentinels stripped. There
    /// is no timeout: an interpreter that never exits blocks here forever.
    ///
    /// # Errors
    /// Returns `EsoplayError::LaunchFailed` if the bridge could not launch the interpreter
    pub(super) async fn reap(&mut self) -> Result<()> {
        if let Err(e) = self.transport.end_input().await {
            log::warn!("{e}");
        }

        let bridge = self.transport.wait_bridge().await;

        loop {
            match self.transport.read(&mut self.buffer).await {
                Ok(0) => break,
                Ok(n) => {
                    let scan = self.scanner.feed(&self.buffer[..n]);
                    self.forward(&scan.output).await;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    log::warn!("read from interpreter failed: {e}");
                    break;
                }
            }
        }

        let rest = self.scanner.finish();
        self.forward(&rest).await;

        self.transport.close();
        log::debug!("process tree reaped");
        bridge
    }
}
