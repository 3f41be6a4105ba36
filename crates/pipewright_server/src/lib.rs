//! Pipewright Server
//!
//! The gRPC surface of the runner: the generated protocol types, the
//! conversions between wire messages and the core data model, and the
//! `Runner` service implementation that drives the router.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Generated protocol types for `pipewright.v1`.
pub mod proto {
    #![allow(missing_docs)]
    #![allow(clippy::all)]

    tonic::include_proto!("pipewright.v1");
}

pub mod convert;
pub mod service;

pub use convert::DecodeError;
pub use service::RunnerService;
