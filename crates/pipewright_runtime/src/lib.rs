//! Pipewright Runtime
//!
//! The channel-routing and stage-execution engine. The `Router` owns the
//! stage registry, the per-URI reader fan-out table, and the shared
//! outgoing-message queue; it implements the Load and Exec operations and
//! the demultiplex/execute/multiplex concurrency algorithm at the heart of
//! the runner.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod exec;
pub mod router;

pub use error::{ProtocolViolation, RuntimeError, RuntimeResult};
pub use router::{Router, RouterConfig};
