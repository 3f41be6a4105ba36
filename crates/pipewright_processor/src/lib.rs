//! Pipewright Processors
//!
//! The processor capability contract (`Processor`, `Factory`), the typed
//! `Arguments` resolver that wires construction arguments to literals and
//! live channel handles, the statically linked `ProcessorRegistry`, and the
//! `Loader` that resolves an opaque entrypoint plus module/class identifiers
//! into a factory.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arguments;
pub mod builtin;
pub mod error;
pub mod loader;
pub mod processor;
pub mod registry;

pub use arguments::Arguments;
pub use builtin::Transparent;
pub use error::{ArgumentError, BuildError, LoadError, ProcessorError};
pub use loader::{Loader, RegistryLoader};
pub use processor::{Factory, Processor};
pub use registry::ProcessorRegistry;
