//! The in-process channel backing one logical URI.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use pipewright_core::ChannelUri;
use tokio::sync::{Mutex, mpsc};

use crate::error::{ChannelError, ChannelResult};
use crate::traits::{Reader, Writer};

/// An unbounded FIFO of byte payloads with terminal close semantics.
///
/// A `Channel` carries both roles for one URI: the dispatch side writes
/// payloads into it, the owning processor reads them out in write order.
/// Closing is terminal; once closed and drained, reads return end-of-stream
/// permanently. The channel is never reopened.
pub struct Channel {
    uri: ChannelUri,
    tx: mpsc::UnboundedSender<Option<Bytes>>,
    rx: Mutex<mpsc::UnboundedReceiver<Option<Bytes>>>,
    closed: AtomicBool,
    drained: AtomicBool,
}

impl Channel {
    /// Create an open, empty channel for the given URI
    #[must_use]
    pub fn new(uri: impl Into<ChannelUri>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            uri: uri.into(),
            tx,
            rx: Mutex::new(rx),
            closed: AtomicBool::new(false),
            drained: AtomicBool::new(false),
        }
    }

    /// The URI this channel carries
    #[must_use]
    pub fn uri(&self) -> &ChannelUri {
        &self.uri
    }
}

#[async_trait]
impl Reader for Channel {
    async fn read(&self) -> Option<Bytes> {
        if self.drained.load(Ordering::Acquire) {
            return None;
        }

        let mut rx = self.rx.lock().await;
        match rx.recv().await {
            Some(Some(payload)) => Some(payload),
            // The `None` sentinel marks end-of-stream; latch it so later
            // reads terminate without touching the queue.
            Some(None) | None => {
                self.drained.store(true, Ordering::Release);
                None
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Writer for Channel {
    async fn write(&self, payload: Bytes) -> ChannelResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelError::WriteAfterClose {
                uri: self.uri.clone(),
            });
        }

        self.tx
            .send(Some(payload))
            .map_err(|_| ChannelError::Disconnected {
                uri: self.uri.clone(),
            })
    }

    async fn close(&self) -> ChannelResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.tx.send(None).map_err(|_| ChannelError::Disconnected {
                uri: self.uri.clone(),
            })?;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
