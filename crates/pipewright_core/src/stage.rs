//! Stage and processor descriptors as declared by the orchestrator.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::argument::Argument;
use crate::uri::StageUri;

/// Metadata key naming the type to construct inside a bundle
pub const METADATA_CLASS_NAME: &str = "class_name";

/// Metadata key naming the module that declares the type
pub const METADATA_MODULE_NAME: &str = "module_name";

/// Describes the processor implementation backing a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorSpec {
    /// The processor's own URI
    pub uri: String,
    /// Opaque locator of the installable bundle
    pub entrypoint: String,
    /// Free-form metadata; must carry `module_name` and `class_name`
    pub metadata: IndexMap<String, String>,
}

impl ProcessorSpec {
    /// Create a processor descriptor with empty metadata
    #[must_use]
    pub fn new(uri: impl Into<String>, entrypoint: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            entrypoint: entrypoint.into(),
            metadata: IndexMap::new(),
        }
    }

    /// Add a metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata value
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// One declared unit of pipeline work, bound to one processor instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// The stage's URI
    pub uri: StageUri,
    /// The processor implementation to instantiate
    pub processor: ProcessorSpec,
    /// Construction arguments, keyed by parameter name
    pub arguments: IndexMap<String, Argument>,
}

impl StageSpec {
    /// Create a stage with no arguments
    #[must_use]
    pub fn new(uri: impl Into<StageUri>, processor: ProcessorSpec) -> Self {
        Self {
            uri: uri.into(),
            processor,
            arguments: IndexMap::new(),
        }
    }

    /// Add a construction argument
    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, argument: Argument) -> Self {
        self.arguments.insert(key.into(), argument);
        self
    }
}
