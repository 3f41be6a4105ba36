//! The seam between argument resolution and the router.

use std::sync::Arc;

use pipewright_core::ChannelUri;

use crate::traits::{Reader, Writer};

/// Creates and registers live reader and writer handles keyed by URI.
///
/// Implemented by the router: `create_reader` registers a fresh channel in
/// the fan-out table (appending, never replacing — every registered reader
/// receives every message delivered for the URI), and `create_writer`
/// returns a writer bound to the outgoing-message pipeline. Each call is a
/// fresh registration; repeated calls for one URI are intentional fan-out,
/// not an error.
pub trait ChannelRepository: Send + Sync {
    /// Allocate and register a reader for the given URI
    fn create_reader(&self, uri: &ChannelUri) -> Arc<dyn Reader>;

    /// Allocate a writer for the given URI, bound to the outgoing pipeline
    fn create_writer(&self, uri: &ChannelUri) -> Arc<dyn Writer>;
}
