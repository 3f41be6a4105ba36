//! The processor capability contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::arguments::Arguments;
use crate::error::{BuildError, ProcessorError};

/// User-supplied pipeline logic.
///
/// A processor consumes its bound readers until exhaustion and writes to its
/// bound writers, closing every writer it owns before returning. The router
/// never cancels a running processor; an entry point that does not terminate
/// stalls the pipeline run.
#[async_trait]
pub trait Processor: Send + Sync {
    /// Run the processor to completion.
    ///
    /// # Errors
    ///
    /// Returns an error on a channel contract violation or a
    /// processor-specific failure; either fails the pipeline run.
    async fn exec(&mut self) -> Result<(), ProcessorError>;
}

/// A pure constructor from resolved arguments to a processor instance.
///
/// Factories capture no loader-internal state; everything a processor needs
/// is taken from the `Arguments` at construction time.
pub type Factory = Arc<dyn Fn(&Arguments<'_>) -> Result<Box<dyn Processor>, BuildError> + Send + Sync>;
