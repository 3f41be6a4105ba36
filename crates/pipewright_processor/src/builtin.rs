//! Built-in processors shipped with the runner.

use std::sync::Arc;

use async_trait::async_trait;
use pipewright_channel::{Reader, Writer};

use crate::arguments::Arguments;
use crate::error::{BuildError, ProcessorError};
use crate::processor::{Factory, Processor};

/// Forwards every payload from its `input` reader to its `output` writer.
///
/// Closes the writer once the input reaches end-of-stream. Useful both as a
/// pipeline pass-through and as the canonical exercise of the factory and
/// argument machinery.
pub struct Transparent {
    input: Arc<dyn Reader>,
    output: Arc<dyn Writer>,
}

impl Transparent {
    /// Module identifier this processor registers under
    pub const MODULE: &'static str = "builtin";

    /// Class identifier this processor registers under
    pub const CLASS: &'static str = "Transparent";

    /// Factory constructing a `Transparent` from `input`/`output` arguments
    #[must_use]
    pub fn factory() -> Factory {
        Arc::new(
            |args: &Arguments<'_>| -> Result<Box<dyn Processor>, BuildError> {
                Ok(Box::new(Self {
                    input: args.reader("input")?,
                    output: args.writer("output")?,
                }))
            },
        )
    }
}

#[async_trait]
impl Processor for Transparent {
    async fn exec(&mut self) -> Result<(), ProcessorError> {
        while let Some(payload) = self.input.read().await {
            self.output.write(payload).await?;
        }
        self.output.close().await?;
        Ok(())
    }
}
