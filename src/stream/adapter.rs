// src/stream/adapter.rs

//! Background read loop that forwards sink chunks to a callback.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{Result, SeqexecError};

use super::sink::StreamSink;

type ChunkCallback = Box<dyn FnMut(&[u8]) + Send + 'static>;

enum Reader {
    /// Constructed, loop not spawned yet. Writes are buffered in `rx`.
    Pending {
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
        callback: ChunkCallback,
    },
    Running {
        stop: oneshot::Sender<()>,
        handle: JoinHandle<()>,
    },
    Stopped,
}

/// Bridges a push-style [`StreamSink`] to a callback running on its own
/// Tokio task.
///
/// Byte order across writes is preserved end to end. [`stop`](Self::stop)
/// drains: every chunk written before it was called reaches the callback
/// before it returns.
pub struct StreamAdapter {
    label: &'static str,
    sink: Option<StreamSink>,
    reader: Reader,
}

impl StreamAdapter {
    /// Create an adapter; the read loop is not running until [`start`](Self::start).
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            label: "stream",
            sink: Some(StreamSink::new(tx)),
            reader: Reader::Pending {
                rx,
                callback: Box::new(callback),
            },
        }
    }

    /// Name used in log fields (e.g. "stdout").
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// A sink for producers.
    ///
    /// After [`stop`](Self::stop) this returns a sink whose writes fail.
    pub fn writer(&self) -> StreamSink {
        match &self.sink {
            Some(sink) => sink.clone(),
            None => {
                let (tx, _rx) = mpsc::unbounded_channel();
                StreamSink::new(tx)
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.reader, Reader::Running { .. })
    }

    /// Spawn the read loop on the current Tokio runtime.
    ///
    /// Chunks already written are delivered first, in order.
    pub fn start(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.reader, Reader::Stopped) {
            Reader::Pending { rx, callback } => {
                let (stop_tx, stop_rx) = oneshot::channel();
                let label = self.label;
                let handle = tokio::spawn(async move {
                    read_loop(rx, callback, stop_rx).await;
                    debug!(stream = label, "stream reader finished");
                });
                self.reader = Reader::Running {
                    stop: stop_tx,
                    handle,
                };
                Ok(())
            }
            other => {
                self.reader = other;
                Err(SeqexecError::AdapterAlreadyStarted)
            }
        }
    }

    /// Stop the read loop after draining everything written so far, and wait
    /// for it to exit.
    ///
    /// If the loop was never started, the buffer is drained on the caller's
    /// task instead.
    pub async fn stop(&mut self) {
        // Our own copy of the sink would otherwise keep the stream open.
        self.sink.take();

        match std::mem::replace(&mut self.reader, Reader::Stopped) {
            Reader::Pending {
                mut rx,
                mut callback,
            } => {
                rx.close();
                while let Ok(chunk) = rx.try_recv() {
                    callback(&chunk);
                }
            }
            Reader::Running { stop, handle } => {
                // The loop may already have exited on end-of-stream.
                let _ = stop.send(());
                if let Err(err) = handle.await {
                    warn!(stream = self.label, error = %err, "stream reader terminated abnormally");
                }
            }
            Reader::Stopped => {}
        }
    }
}

async fn read_loop(
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
    mut callback: ChunkCallback,
    mut stop_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;

            chunk = rx.recv() => match chunk {
                Some(chunk) => callback(&chunk),
                // Every sink dropped: normal end-of-stream.
                None => break,
            },

            _ = &mut stop_rx => {
                rx.close();
                while let Ok(chunk) = rx.try_recv() {
                    callback(&chunk);
                }
                break;
            }
        }
    }
}
