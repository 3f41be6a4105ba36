//! The wire unit relayed between the orchestrator and the runner.
//!
//! Per channel URI the orchestrator and runner both uphold one invariant:
//! CLOSE is sent at most once, and no DATA follows a CLOSE.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::uri::ChannelUri;

/// What a channel message carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// A payload for the channel
    Data(Bytes),
    /// The terminal close signal for the channel
    Close,
}

/// A single message addressed to one channel URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The addressed channel
    pub channel: ChannelUri,
    /// Payload or close signal
    pub kind: MessageKind,
}

impl ChannelMessage {
    /// Create a DATA message
    #[must_use]
    pub fn data(channel: impl Into<ChannelUri>, payload: impl Into<Bytes>) -> Self {
        Self {
            channel: channel.into(),
            kind: MessageKind::Data(payload.into()),
        }
    }

    /// Create a CLOSE message
    #[must_use]
    pub fn close(channel: impl Into<ChannelUri>) -> Self {
        Self {
            channel: channel.into(),
            kind: MessageKind::Close,
        }
    }

    /// Whether this is a close signal
    #[must_use]
    pub fn is_close(&self) -> bool {
        matches!(self.kind, MessageKind::Close)
    }

    /// The payload, if this is a DATA message
    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        match &self.kind {
            MessageKind::Data(payload) => Some(payload),
            MessageKind::Close => None,
        }
    }
}
