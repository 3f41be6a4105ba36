//! The `Runner` gRPC service.

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use pipewright_runtime::{ProtocolViolation, Router, RuntimeError};
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status, Streaming};

use crate::convert;
use crate::proto;
use crate::proto::runner_server::Runner;

/// Serves the runner protocol on top of a [`Router`].
///
/// Load calls land on the router directly; an Exec call hands the decoded
/// inbound stream to the router and relays its outbound queue back to the
/// caller. Failures are returned as gRPC statuses and leave the process
/// running.
pub struct RunnerService {
    router: Arc<Router>,
}

impl RunnerService {
    /// Create a service around a configured router.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }
}

/// Map a runtime failure onto the gRPC status taxonomy.
fn status_from_runtime(err: &RuntimeError) -> Status {
    match err {
        RuntimeError::InvalidStage { .. } => Status::invalid_argument(err.to_string()),
        RuntimeError::Protocol(_) | RuntimeError::AlreadyExecuting => {
            Status::failed_precondition(err.to_string())
        }
        RuntimeError::ConstructorLoad { .. }
        | RuntimeError::Instantiation { .. }
        | RuntimeError::StageFailed { .. }
        | RuntimeError::Execution { .. } => Status::internal(err.to_string()),
    }
}

#[tonic::async_trait]
impl Runner for RunnerService {
    async fn load(&self, request: Request<proto::Stage>) -> Result<Response<proto::Ack>, Status> {
        let stage = convert::stage_from_proto(request.into_inner())
            .map_err(|err| Status::invalid_argument(err.to_string()))?;

        self.router
            .load(stage)
            .map_err(|err| status_from_runtime(&err))?;
        Ok(Response::new(proto::Ack {}))
    }

    type ExecStream =
        Pin<Box<dyn Stream<Item = Result<proto::ChannelMessage, Status>> + Send + 'static>>;

    async fn exec(
        &self,
        request: Request<Streaming<proto::ChannelMessage>>,
    ) -> Result<Response<Self::ExecStream>, Status> {
        tracing::info!("exec requested");

        let inbound = request.into_inner().map(|item| match item {
            Ok(message) => convert::message_from_proto(message).map_err(|err| {
                RuntimeError::Protocol(ProtocolViolation::Malformed {
                    reason: err.to_string(),
                })
            }),
            Err(status) => Err(RuntimeError::Execution {
                reason: status.to_string(),
            }),
        });

        let outgoing = self
            .router
            .exec(inbound)
            .map_err(|err| status_from_runtime(&err))?;

        let outbound = ReceiverStream::new(outgoing).map(|item| {
            item.map(convert::message_to_proto)
                .map_err(|err| status_from_runtime(&err))
        });
        Ok(Response::new(Box::pin(outbound)))
    }
}
