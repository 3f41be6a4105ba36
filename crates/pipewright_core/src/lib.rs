//! Pipewright Core Types
//!
//! This crate contains pure types and logic with no I/O: URIs, stage and
//! processor descriptors, the argument model, and the channel message unit
//! exchanged with the orchestrator.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod argument;
pub mod message;
pub mod stage;
pub mod uri;

// Re-exports
pub use argument::{Argument, Direction, Literal};
pub use message::{ChannelMessage, MessageKind};
pub use stage::{ProcessorSpec, StageSpec, METADATA_CLASS_NAME, METADATA_MODULE_NAME};
pub use uri::{ChannelUri, StageUri};
