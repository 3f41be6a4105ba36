//! Resolving an entrypoint and module/class identifiers into a factory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::LoadError;
use crate::processor::Factory;
use crate::registry::ProcessorRegistry;

/// Makes a processor implementation available given an opaque entrypoint
/// reference and its identifying metadata.
pub trait Loader: Send + Sync {
    /// Load a factory for the named implementation.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Bundle` if the entrypoint's bundle cannot be
    /// fetched or unpacked, and `LoadError::Resolution` if no implementation
    /// answers to the module/class pair.
    fn load(&self, entrypoint: &str, module: &str, class: &str) -> Result<Factory, LoadError>;
}

/// Loader backed by the statically linked processor registry.
///
/// Bundle handling stages the entrypoint's content under a deterministic
/// destination derived from the entrypoint, replacing any previous staging
/// of the same bundle. Resolution then goes through the registry only; the
/// staged content carries a processor's private assets, never code the
/// runner would interpret.
pub struct RegistryLoader {
    registry: ProcessorRegistry,
    staging_root: PathBuf,
}

impl RegistryLoader {
    /// Create a loader over the given registry, staging under the system
    /// temporary directory
    #[must_use]
    pub fn new(registry: ProcessorRegistry) -> Self {
        Self {
            registry,
            staging_root: std::env::temp_dir().join("pipewright"),
        }
    }

    /// Override the staging root directory
    #[must_use]
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    /// Stage the bundle named by the entrypoint, replacing any previous copy.
    ///
    /// An empty entrypoint means the implementation is fully statically
    /// linked and nothing is staged.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Bundle` if the bundle is missing or cannot be
    /// replicated to its destination.
    pub fn stage_bundle(&self, entrypoint: &str) -> Result<Option<PathBuf>, LoadError> {
        if entrypoint.is_empty() {
            return Ok(None);
        }

        let source = PathBuf::from(entrypoint.strip_prefix("file://").unwrap_or(entrypoint));
        if !source.exists() {
            return Err(LoadError::Bundle {
                entrypoint: entrypoint.to_string(),
                reason: "no such file or directory".to_string(),
            });
        }

        let name = source
            .file_name()
            .ok_or_else(|| LoadError::Bundle {
                entrypoint: entrypoint.to_string(),
                reason: "entrypoint has no terminal path component".to_string(),
            })?
            .to_owned();
        let destination = self.staging_root.join(name);

        self.replicate(&source, &destination)
            .map_err(|err| LoadError::Bundle {
                entrypoint: entrypoint.to_string(),
                reason: err.to_string(),
            })?;

        tracing::debug!(entrypoint, destination = %destination.display(), "staged bundle");
        Ok(Some(destination))
    }

    // Idempotent by replacement: an existing destination is removed first.
    fn replicate(&self, source: &Path, destination: &Path) -> io::Result<()> {
        if destination.exists() {
            if destination.is_dir() {
                fs::remove_dir_all(destination)?;
            } else {
                fs::remove_file(destination)?;
            }
        }
        fs::create_dir_all(&self.staging_root)?;

        if source.is_dir() {
            copy_tree(source, destination)
        } else {
            fs::copy(source, destination).map(|_| ())
        }
    }
}

impl Loader for RegistryLoader {
    fn load(&self, entrypoint: &str, module: &str, class: &str) -> Result<Factory, LoadError> {
        self.stage_bundle(entrypoint)?;
        self.registry.resolve(module, class)
    }
}

fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
