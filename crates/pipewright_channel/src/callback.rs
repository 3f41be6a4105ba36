//! A writer whose effects are delegated to caller-supplied callbacks.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use pipewright_core::ChannelUri;

use crate::error::{ChannelError, ChannelResult};
use crate::traits::Writer;

/// Callback invoked for every written payload
pub type WriteCallback = Box<dyn Fn(Bytes) -> BoxFuture<'static, ChannelResult<()>> + Send + Sync>;

/// Callback invoked exactly once, on the first close
pub type CloseCallback = Box<dyn Fn() -> BoxFuture<'static, ChannelResult<()>> + Send + Sync>;

/// A `Writer` that forwards writes and the close signal to callbacks
/// instead of buffering locally.
///
/// Used to bridge a processor's output into the outgoing-message pipeline.
/// The writer owns its own closed flag, checked and set atomically with
/// respect to its callers: the close callback fires exactly once, and a
/// write after close fails rather than invoking the callback.
pub struct CallbackWriter {
    uri: ChannelUri,
    on_write: WriteCallback,
    on_close: CloseCallback,
    closed: AtomicBool,
}

impl CallbackWriter {
    /// Create a writer delegating to the given callbacks
    #[must_use]
    pub fn new(uri: impl Into<ChannelUri>, on_write: WriteCallback, on_close: CloseCallback) -> Self {
        Self {
            uri: uri.into(),
            on_write,
            on_close,
            closed: AtomicBool::new(false),
        }
    }

    /// The URI this writer produces for
    #[must_use]
    pub fn uri(&self) -> &ChannelUri {
        &self.uri
    }
}

#[async_trait]
impl Writer for CallbackWriter {
    async fn write(&self, payload: Bytes) -> ChannelResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelError::WriteAfterClose {
                uri: self.uri.clone(),
            });
        }

        (self.on_write)(payload).await
    }

    async fn close(&self) -> ChannelResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        (self.on_close)().await
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    fn counting_writer(
        uri: &str,
        written: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
    ) -> CallbackWriter {
        let on_write: WriteCallback = Box::new(move |_| {
            let written = Arc::clone(&written);
            async move {
                written.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        });
        let on_close: CloseCallback = Box::new(move || {
            let closes = Arc::clone(&closes);
            async move {
                closes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            .boxed()
        });
        CallbackWriter::new(uri, on_write, on_close)
    }

    #[tokio::test]
    async fn test_write_invokes_callback() {
        let written = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let writer = counting_writer("w1", Arc::clone(&written), Arc::clone(&closes));

        writer.write(Bytes::from_static(b"a")).await.unwrap();
        writer.write(Bytes::from_static(b"b")).await.unwrap();

        assert_eq!(written.load(Ordering::SeqCst), 2);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_callback_fires_exactly_once() {
        let written = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let writer = counting_writer("w1", written, Arc::clone(&closes));

        writer.close().await.unwrap();
        writer.close().await.unwrap();
        writer.close().await.unwrap();

        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(writer.is_closed());
    }

    #[tokio::test]
    async fn test_write_after_close_rejected_without_callback() {
        let written = Arc::new(AtomicUsize::new(0));
        let closes = Arc::new(AtomicUsize::new(0));
        let writer = counting_writer("w1", Arc::clone(&written), closes);

        writer.close().await.unwrap();
        let err = writer.write(Bytes::from_static(b"late")).await.unwrap_err();

        assert_eq!(
            err,
            ChannelError::WriteAfterClose {
                uri: ChannelUri::new("w1")
            }
        );
        assert_eq!(written.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bridges_into_pipeline() {
        // The intended wiring: callbacks enqueue onto a shared pipeline.
        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(4);

        let write_tx = tx.clone();
        let on_write: WriteCallback = Box::new(move |payload: Bytes| {
            let tx = write_tx.clone();
            async move {
                tx.send(payload.to_vec())
                    .await
                    .map_err(|_| ChannelError::Disconnected {
                        uri: ChannelUri::new("w1"),
                    })
            }
            .boxed()
        });
        let on_close: CloseCallback = Box::new(move || {
            let tx = tx.clone();
            async move {
                tx.send(Vec::new())
                    .await
                    .map_err(|_| ChannelError::Disconnected {
                        uri: ChannelUri::new("w1"),
                    })
            }
            .boxed()
        });

        let writer = CallbackWriter::new("w1", on_write, on_close);
        writer.write(Bytes::from_static(b"hello")).await.unwrap();
        writer.close().await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), b"hello");
        assert_eq!(rx.recv().await.unwrap(), Vec::<u8>::new());
    }
}
