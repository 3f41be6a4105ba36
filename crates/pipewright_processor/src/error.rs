//! Processor, argument, and loader error types.

use pipewright_channel::ChannelError;

/// Errors raised by the typed argument getters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgumentError {
    /// The requested key is not present in the argument map
    #[error("Argument '{key}' is not set")]
    Missing {
        /// The requested key
        key: String,
    },

    /// The stored argument does not match the requested accessor
    #[error("Argument '{key}' is a {actual}, expected {expected}")]
    TypeMismatch {
        /// The requested key
        key: String,
        /// The kind the accessor requires
        expected: &'static str,
        /// The kind actually stored
        actual: &'static str,
    },
}

/// Errors raised while making a processor implementation available
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The bundle named by the entrypoint could not be fetched or unpacked
    #[error("Bundle '{entrypoint}' could not be staged: {reason}")]
    Bundle {
        /// The opaque entrypoint reference
        entrypoint: String,
        /// Why staging failed
        reason: String,
    },

    /// No implementation is registered under the module/class pair
    #[error("No processor registered for module '{module}', class '{class}'")]
    Resolution {
        /// The module identifier
        module: String,
        /// The class identifier
        class: String,
    },
}

/// Errors raised by a factory while constructing a processor
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Argument resolution failed
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The constructor itself failed
    #[error("Processor construction failed: {0}")]
    Failed(String),
}

/// Errors raised by a running processor's entry point
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessorError {
    /// A channel contract violation, fatal to this processor's execution
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Processor-specific failure
    #[error("Processor failed: {0}")]
    Failed(String),
}
