//! Pipewright Channels
//!
//! In-process byte-message channels with close semantics: the `Reader` and
//! `Writer` capability traits, the single-URI `Channel` implementing both
//! roles, the `CallbackWriter` bridging into an outgoing pipeline, and the
//! `ChannelRepository` seam through which argument resolution obtains live
//! reader and writer handles.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod callback;
pub mod channel;
pub mod error;
pub mod repository;
pub mod traits;

pub use callback::CallbackWriter;
pub use channel::Channel;
pub use error::{ChannelError, ChannelResult};
pub use repository::ChannelRepository;
pub use traits::{Reader, Writer};
