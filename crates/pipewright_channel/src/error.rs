//! Channel error types.

use pipewright_core::ChannelUri;

/// Channel result type
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors raised by channel operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// A payload was written to a writer that was already closed.
    ///
    /// This is a programming-contract violation by the caller, never
    /// silently accepted or dropped.
    #[error("Write after close on channel {uri}")]
    WriteAfterClose {
        /// The channel the write was addressed to
        uri: ChannelUri,
    },

    /// The outgoing pipeline the writer feeds no longer has a consumer
    #[error("Outgoing pipeline disconnected for channel {uri}")]
    Disconnected {
        /// The channel the message was addressed to
        uri: ChannelUri,
    },
}
