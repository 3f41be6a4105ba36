//! Typed access to a stage's declared argument map.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use pipewright_channel::{ChannelRepository, Reader, Writer};
use pipewright_core::{Argument, Direction, Literal};

use crate::error::ArgumentError;

/// Wraps a raw argument map and a channel repository behind typed getters.
///
/// Getters are idempotent; for channel types every call is a fresh
/// registration through the repository, which is deliberate fan-out support.
/// Numeric getters accept any integer width as `int` and any floating width
/// as `double`, and never coerce from strings.
pub struct Arguments<'a> {
    values: &'a IndexMap<String, Argument>,
    channels: &'a dyn ChannelRepository,
}

impl<'a> Arguments<'a> {
    /// Wrap an argument map and the repository resolving its channel references
    #[must_use]
    pub fn new(
        values: &'a IndexMap<String, Argument>,
        channels: &'a dyn ChannelRepository,
    ) -> Self {
        Self { values, channels }
    }

    fn get(&self, key: &str) -> Result<&Argument, ArgumentError> {
        self.values.get(key).ok_or_else(|| ArgumentError::Missing {
            key: key.to_string(),
        })
    }

    fn mismatch(key: &str, expected: &'static str, argument: &Argument) -> ArgumentError {
        ArgumentError::TypeMismatch {
            key: key.to_string(),
            expected,
            actual: argument.kind(),
        }
    }

    /// Get an integer literal
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not an integer literal
    pub fn int(&self, key: &str) -> Result<i64, ArgumentError> {
        match self.get(key)? {
            Argument::Literal(Literal::Int(value)) => Ok(*value),
            other => Err(Self::mismatch(key, "int", other)),
        }
    }

    /// Get a floating-point literal
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a floating-point literal
    pub fn double(&self, key: &str) -> Result<f64, ArgumentError> {
        match self.get(key)? {
            Argument::Literal(Literal::Double(value)) => Ok(*value),
            other => Err(Self::mismatch(key, "double", other)),
        }
    }

    /// Get a string literal
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a string literal
    pub fn string(&self, key: &str) -> Result<String, ArgumentError> {
        match self.get(key)? {
            Argument::Literal(Literal::String(value)) => Ok(value.clone()),
            other => Err(Self::mismatch(key, "string", other)),
        }
    }

    /// Get a timestamp literal
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a timestamp literal
    pub fn date(&self, key: &str) -> Result<DateTime<Utc>, ArgumentError> {
        match self.get(key)? {
            Argument::Literal(Literal::Date(value)) => Ok(*value),
            other => Err(Self::mismatch(key, "date", other)),
        }
    }

    /// Get a live reader for a reader-direction channel reference
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a reader reference
    pub fn reader(&self, key: &str) -> Result<Arc<dyn Reader>, ArgumentError> {
        match self.get(key)? {
            Argument::Channel {
                uri,
                direction: Direction::Reader,
            } => Ok(self.channels.create_reader(uri)),
            other => Err(Self::mismatch(key, "reader", other)),
        }
    }

    /// Get a live writer for a writer-direction channel reference
    ///
    /// # Errors
    ///
    /// Returns an error if the key is absent or not a writer reference
    pub fn writer(&self, key: &str) -> Result<Arc<dyn Writer>, ArgumentError> {
        match self.get(key)? {
            Argument::Channel {
                uri,
                direction: Direction::Writer,
            } => Ok(self.channels.create_writer(uri)),
            other => Err(Self::mismatch(key, "writer", other)),
        }
    }
}
