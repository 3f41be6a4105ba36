//! URI newtypes for Pipewright entities.
//!
//! Stages and channels are identified by opaque URIs assigned by the
//! orchestrator. The runner never interprets them beyond equality.

use serde::{Deserialize, Serialize};

/// Identifies one logical data path between the orchestrator and the runner.
///
/// The same URI may carry multiple independent local reader registrations
/// (fan-out), but represents a single orchestrator-visible channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelUri(String);

impl ChannelUri {
    /// Create a channel URI from any string-like value
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Get as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChannelUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for ChannelUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl std::fmt::Display for ChannelUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one declared stage, bound to exactly one processor instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageUri(String);

impl StageUri {
    /// Create a stage URI from any string-like value
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Get as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StageUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl From<String> for StageUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl std::fmt::Display for StageUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
