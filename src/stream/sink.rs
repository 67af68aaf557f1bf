// src/stream/sink.rs

use std::io::{self, Write};

use tokio::sync::mpsc;

/// Producer side of a [`StreamAdapter`](super::StreamAdapter).
///
/// Each write enqueues one chunk; writes never block and never drop bytes
/// while the adapter's reader is alive. Dropping every clone of the sink is
/// the end-of-stream signal for the reader loop.
#[derive(Debug, Clone)]
pub struct StreamSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl StreamSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Vec<u8>>) -> Self {
        Self { tx }
    }

    /// Enqueue a chunk for delivery.
    ///
    /// Fails with `BrokenPipe` once the adapter has stopped reading.
    pub fn write_chunk(&self, chunk: &[u8]) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx.send(chunk.to_vec()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::BrokenPipe,
                "stream adapter is no longer reading",
            )
        })
    }

    /// Whether the reading side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Write for StreamSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
