//! Reader and writer capability traits.
//!
//! Processors program against these traits only; the concrete backing
//! (in-process queue, callback bridge) is chosen by the channel repository.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ChannelResult;

/// Consumption capability over a byte-message stream with close semantics
#[async_trait]
pub trait Reader: Send + Sync {
    /// Receive the next payload in write order.
    ///
    /// Suspends until a payload is available or the channel is closed.
    /// Returns `None` once the channel is closed and drained; every
    /// subsequent call returns `None` as well.
    async fn read(&self) -> Option<Bytes>;

    /// Whether the channel has been closed (pending payloads may remain)
    fn is_closed(&self) -> bool;
}

/// Production capability over a byte-message stream with close semantics
#[async_trait]
pub trait Writer: Send + Sync {
    /// Produce a payload.
    ///
    /// # Errors
    ///
    /// Returns `ChannelError::WriteAfterClose` if `close` was already
    /// called on this writer.
    async fn write(&self, payload: Bytes) -> ChannelResult<()>;

    /// Signal that no more payloads will follow.
    ///
    /// Idempotent: the first call has the downstream effect, repeats are
    /// no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error if the close signal cannot be delivered.
    async fn close(&self) -> ChannelResult<()>;

    /// Whether `close` has been called on this writer
    fn is_closed(&self) -> bool;
}
