//! Runtime error types.

use pipewright_core::{ChannelUri, StageUri};
use pipewright_processor::{BuildError, LoadError, ProcessorError};

/// Runtime result type
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// A violation of the channel message protocol by the remote peer.
///
/// The original design killed the process on these; here they fail the
/// offending Exec call with a structured status and leave the process alive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// A message was addressed to a URI with no registered readers
    #[error("message addressed to unregistered channel '{uri}'")]
    UnregisteredChannel {
        /// The unknown channel
        uri: ChannelUri,
    },

    /// A DATA message arrived for a channel that was already closed
    #[error("DATA after CLOSE on channel '{uri}'")]
    DataAfterClose {
        /// The closed channel
        uri: ChannelUri,
    },

    /// The message could not be understood at all
    #[error("malformed channel message: {reason}")]
    Malformed {
        /// Why decoding failed
        reason: String,
    },
}

/// Errors raised by the router's Load and Exec operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// The stage descriptor is missing required metadata
    #[error("Invalid stage: {reason}")]
    InvalidStage {
        /// What is missing or malformed
        reason: String,
    },

    /// The processor constructor could not be loaded into the runtime
    #[error("constructor load failed: {source}")]
    ConstructorLoad {
        /// The underlying loader failure
        #[source]
        source: LoadError,
    },

    /// The processor could not be instantiated from its arguments
    #[error("instantiation failed: {source}")]
    Instantiation {
        /// The underlying construction failure
        #[source]
        source: BuildError,
    },

    /// The inbound stream violated the channel message protocol
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// A processor's entry point returned an error
    #[error("Stage '{uri}' failed: {source}")]
    StageFailed {
        /// The failing stage
        uri: StageUri,
        /// The processor's error
        #[source]
        source: ProcessorError,
    },

    /// An execution task ended abnormally (panic)
    #[error("Execution task failed: {reason}")]
    Execution {
        /// What happened to the task
        reason: String,
    },

    /// Exec was invoked more than once on the same router
    #[error("The pipeline run was already started; the router is one-shot")]
    AlreadyExecuting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_violation_display() {
        let err = ProtocolViolation::UnregisteredChannel {
            uri: ChannelUri::new("c1"),
        };
        assert_eq!(
            err.to_string(),
            "message addressed to unregistered channel 'c1'"
        );
    }

    #[test]
    fn test_runtime_error_display() {
        let err = RuntimeError::InvalidStage {
            reason: "missing `class_name` metadata".to_string(),
        };
        assert!(err.to_string().contains("class_name"));

        let err = RuntimeError::ConstructorLoad {
            source: LoadError::Resolution {
                module: "m".to_string(),
                class: "C".to_string(),
            },
        };
        assert!(err.to_string().starts_with("constructor load failed"));
    }

    #[test]
    fn test_protocol_violation_converts() {
        let err: RuntimeError = ProtocolViolation::Malformed {
            reason: "unknown message type".to_string(),
        }
        .into();
        assert!(matches!(err, RuntimeError::Protocol(_)));
    }
}
