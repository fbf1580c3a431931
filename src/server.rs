//! The module loop.
//!
//! `Module` reads packages from the host one at a time, hands each to the
//! [`Dispatcher`], and writes the reply before reading the next package.
//! Configuration and request packages share this single loop, so at most
//! one package (and at most one HTTP call) is in flight.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::dispatcher::Dispatcher;
use crate::protocol::{read_package, write_package, FrameError};

/// A DutyCalls module bound to a host channel.
pub struct Module<R, W> {
    dispatcher: Dispatcher,
    reader: R,
    writer: W,
}

impl<R, W> Module<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a module reading packages from `reader` and writing replies to `writer`.
    pub fn new(dispatcher: Dispatcher, reader: R, writer: W) -> Self {
        Self {
            dispatcher,
            reader,
            writer,
        }
    }

    /// Runs until the host closes the channel.
    ///
    /// # Errors
    ///
    /// Returns `FrameError` if a package cannot be read or a reply cannot be
    /// written. The host is expected to restart the module in that case.
    pub async fn run(mut self) -> Result<(), FrameError> {
        while let Some(pkg) = read_package(&mut self.reader).await? {
            tracing::trace!(pid = pkg.pid, tp = pkg.tp, size = pkg.data.len(), "Package received");

            if let Some(reply) = self.dispatcher.handle_package(pkg).await {
                write_package(&mut self.writer, &reply).await?;
            }
        }

        tracing::info!("Host closed the channel");
        Ok(())
    }
}
