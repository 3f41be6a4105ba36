//! The Exec operation: demultiplex, execute, multiplex.
//!
//! One Exec call runs N+2 concurrent units of work: a dispatch task feeding
//! inbound messages into the fan-out channels, one execution task per loaded
//! stage, and the multiplexing loop relaying outgoing messages. The call
//! moves RUNNING -> DRAINING -> CLOSED and never back: once every execution
//! task has finished, dispatch is cancelled, the queue is flushed, and the
//! outbound stream terminates exactly once.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use indexmap::IndexMap;
use pipewright_channel::{Channel, Writer};
use pipewright_core::{ChannelMessage, ChannelUri, MessageKind, StageUri};
use pipewright_processor::Processor;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{ProtocolViolation, RuntimeError, RuntimeResult};
use crate::router::Router;

impl Router {
    /// Execute the pipeline run.
    ///
    /// Consumes the inbound message stream and returns the outbound stream
    /// as a channel receiver. Messages are relayed as they become available;
    /// a fatal error (protocol violation, failing stage) is delivered as the
    /// final `Err` item. Dropping the receiver stops the relay.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExecuting` if called a second time; the router is
    /// one-shot by design.
    pub fn exec<S>(&self, inbound: S) -> RuntimeResult<mpsc::Receiver<RuntimeResult<ChannelMessage>>>
    where
        S: Stream<Item = RuntimeResult<ChannelMessage>> + Send + 'static,
    {
        let (stages, fanout, outgoing) = self.take_run_state()?;
        let (emit_tx, emit_rx) = mpsc::channel(self.config().outgoing_capacity);

        tokio::spawn(run_pipeline(
            stages,
            fanout,
            outgoing,
            inbound.boxed(),
            emit_tx,
        ));

        Ok(emit_rx)
    }
}

async fn run_pipeline(
    stages: IndexMap<StageUri, Box<dyn Processor>>,
    fanout: IndexMap<ChannelUri, Vec<Arc<Channel>>>,
    outgoing: mpsc::Receiver<ChannelMessage>,
    inbound: BoxStream<'static, RuntimeResult<ChannelMessage>>,
    emit: mpsc::Sender<RuntimeResult<ChannelMessage>>,
) {
    if let Err(err) = drive(stages, fanout, outgoing, inbound, &emit).await {
        tracing::error!(error = %err, "pipeline run failed");
        let _ = emit.send(Err(err)).await;
    }
    // `emit` drops here; the outbound stream terminates exactly once.
}

async fn drive(
    stages: IndexMap<StageUri, Box<dyn Processor>>,
    fanout: IndexMap<ChannelUri, Vec<Arc<Channel>>>,
    mut outgoing: mpsc::Receiver<ChannelMessage>,
    inbound: BoxStream<'static, RuntimeResult<ChannelMessage>>,
    emit: &mpsc::Sender<RuntimeResult<ChannelMessage>>,
) -> RuntimeResult<()> {
    let mut dispatch = tokio::spawn(dispatch(inbound, fanout));
    let mut dispatch_done = false;

    let mut executions = JoinSet::new();
    for (uri, mut processor) in stages {
        executions.spawn(async move {
            let result = processor.exec().await;
            (uri, result)
        });
    }
    tracing::debug!(stages = executions.len(), "pipeline running");

    // RUNNING: race new outgoing messages against execution completion.
    while !executions.is_empty() {
        tokio::select! {
            message = outgoing.recv() => {
                // The router keeps a sender alive, so `recv` only yields
                // real messages here.
                if let Some(message) = message {
                    if emit.send(Ok(message)).await.is_err() {
                        // The orchestrator went away; nothing left to relay to.
                        dispatch.abort();
                        return Ok(());
                    }
                }
            }
            joined = executions.join_next() => {
                match joined {
                    Some(Ok((uri, Ok(())))) => {
                        tracing::debug!(uri = %uri, "stage finished");
                    }
                    Some(Ok((uri, Err(source)))) => {
                        dispatch.abort();
                        return Err(RuntimeError::StageFailed { uri, source });
                    }
                    Some(Err(join_err)) => {
                        dispatch.abort();
                        return Err(RuntimeError::Execution {
                            reason: join_err.to_string(),
                        });
                    }
                    None => {}
                }
            }
            result = &mut dispatch, if !dispatch_done => {
                dispatch_done = true;
                match result {
                    // Inbound stream exhausted; executions keep running on
                    // whatever is already in their channels.
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => return Err(err),
                    Err(join_err) => {
                        return Err(RuntimeError::Execution {
                            reason: join_err.to_string(),
                        });
                    }
                }
            }
        }
    }

    // DRAINING: no more producers can enqueue, but already-enqueued
    // messages must still go out before the stream closes.
    dispatch.abort();
    tracing::debug!("executions finished, draining outgoing queue");
    while let Ok(message) = outgoing.try_recv() {
        if emit.send(Ok(message)).await.is_err() {
            break;
        }
    }

    Ok(())
}

/// Consume the inbound stream to completion, fanning every message out to
/// the readers registered for its URI.
async fn dispatch(
    mut inbound: BoxStream<'static, RuntimeResult<ChannelMessage>>,
    fanout: IndexMap<ChannelUri, Vec<Arc<Channel>>>,
) -> RuntimeResult<()> {
    while let Some(message) = inbound.next().await {
        let message = message?;
        let uri = message.channel.clone();

        let channels = fanout.get(&uri).ok_or_else(|| {
            ProtocolViolation::UnregisteredChannel { uri: uri.clone() }
        })?;

        match message.kind {
            MessageKind::Data(payload) => {
                for channel in channels {
                    channel
                        .write(payload.clone())
                        .await
                        .map_err(|_| ProtocolViolation::DataAfterClose { uri: uri.clone() })?;
                }
            }
            MessageKind::Close => {
                for channel in channels {
                    channel.close().await.map_err(|_| {
                        ProtocolViolation::Malformed {
                            reason: format!("close signal undeliverable for '{uri}'"),
                        }
                    })?;
                }
            }
        }
    }

    tracing::debug!("inbound stream exhausted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RouterConfig;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::stream;
    use pipewright_channel::Reader;
    use pipewright_core::{
        Argument, METADATA_CLASS_NAME, METADATA_MODULE_NAME, ProcessorSpec, StageSpec,
    };
    use pipewright_processor::{
        Arguments, BuildError, Factory, Loader, ProcessorError, ProcessorRegistry, RegistryLoader,
        Transparent,
    };

    fn loader_with(registry: ProcessorRegistry) -> Arc<dyn Loader> {
        Arc::new(RegistryLoader::new(registry))
    }

    fn default_loader() -> Arc<dyn Loader> {
        loader_with(ProcessorRegistry::new().with(
            Transparent::MODULE,
            Transparent::CLASS,
            Transparent::factory(),
        ))
    }

    fn forwarding_stage(uri: &str, input: &str, output: &str) -> StageSpec {
        let processor = ProcessorSpec::new("urn:proc/transparent", "")
            .with_metadata(METADATA_MODULE_NAME, Transparent::MODULE)
            .with_metadata(METADATA_CLASS_NAME, Transparent::CLASS);
        StageSpec::new(uri, processor)
            .with_argument("input", Argument::reader(input))
            .with_argument("output", Argument::writer(output))
    }

    fn inbound(
        messages: Vec<ChannelMessage>,
    ) -> impl Stream<Item = RuntimeResult<ChannelMessage>> + Send + 'static {
        stream::iter(messages.into_iter().map(Ok))
    }

    async fn collect(
        mut rx: mpsc::Receiver<RuntimeResult<ChannelMessage>>,
    ) -> Vec<RuntimeResult<ChannelMessage>> {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_forwarding_scenario() {
        let router = Router::new(default_loader(), RouterConfig::default());
        router.load(forwarding_stage("urn:stage/1", "r1", "w1")).unwrap();

        let rx = router
            .exec(inbound(vec![
                ChannelMessage::data("r1", Bytes::from_static(b"hello")),
                ChannelMessage::close("r1"),
            ]))
            .unwrap();

        let items = collect(rx).await;
        assert_eq!(
            items,
            vec![
                Ok(ChannelMessage::data("w1", Bytes::from_static(b"hello"))),
                Ok(ChannelMessage::close("w1")),
            ]
        );
    }

    #[tokio::test]
    async fn test_fanout_broadcast() {
        // Two stages read the same URI; one inbound DATA yields two
        // independent deliveries.
        let router = Router::new(default_loader(), RouterConfig::default());
        router
            .load(forwarding_stage("urn:stage/1", "shared-in", "w1"))
            .unwrap();
        router
            .load(forwarding_stage("urn:stage/2", "shared-in", "w2"))
            .unwrap();

        let rx = router
            .exec(inbound(vec![
                ChannelMessage::data("shared-in", Bytes::from_static(b"x")),
                ChannelMessage::close("shared-in"),
            ]))
            .unwrap();

        let items = collect(rx).await;
        let data: Vec<_> = items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .filter(|msg| !msg.is_close())
            .map(|msg| msg.channel.as_str().to_string())
            .collect();
        let mut closes: Vec<_> = items
            .iter()
            .filter_map(|item| item.as_ref().ok())
            .filter(|msg| msg.is_close())
            .map(|msg| msg.channel.as_str().to_string())
            .collect();
        closes.sort();

        let mut sorted_data = data.clone();
        sorted_data.sort();
        assert_eq!(sorted_data, vec!["w1", "w2"]);
        assert_eq!(closes, vec!["w1", "w2"]);
    }

    #[tokio::test]
    async fn test_unregistered_uri_fails_exec() {
        let router = Router::new(default_loader(), RouterConfig::default());
        // A stage whose input never closes, so executions alone would
        // keep the run alive.
        router.load(forwarding_stage("urn:stage/1", "r1", "w1")).unwrap();

        let rx = router
            .exec(inbound(vec![ChannelMessage::data(
                "nobody-home",
                Bytes::from_static(b"x"),
            )]))
            .unwrap();

        let items = collect(rx).await;
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0],
            Err(RuntimeError::Protocol(
                ProtocolViolation::UnregisteredChannel {
                    uri: ChannelUri::new("nobody-home")
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_exec_is_one_shot() {
        let router = Router::new(default_loader(), RouterConfig::default());

        let _rx = router.exec(inbound(vec![])).unwrap();
        let err = router.exec(inbound(vec![])).unwrap_err();
        assert_eq!(err, RuntimeError::AlreadyExecuting);
    }

    #[tokio::test]
    async fn test_exec_without_stages_terminates_cleanly() {
        let router = Router::new(default_loader(), RouterConfig::default());

        let rx = router.exec(inbound(vec![])).unwrap();
        assert!(collect(rx).await.is_empty());
    }

    // Writes a burst of payloads, closes, and returns immediately; used to
    // exercise drain-before-terminate under a small queue.
    struct Burst {
        output: Arc<dyn Writer>,
        count: usize,
    }

    impl Burst {
        fn factory(count: usize) -> Factory {
            Arc::new(
                move |args: &Arguments<'_>| -> Result<Box<dyn Processor>, BuildError> {
                    Ok(Box::new(Burst {
                        output: args.writer("output")?,
                        count,
                    }))
                },
            )
        }
    }

    #[async_trait]
    impl Processor for Burst {
        async fn exec(&mut self) -> Result<(), ProcessorError> {
            for index in 0..self.count {
                self.output
                    .write(Bytes::from(index.to_string().into_bytes()))
                    .await?;
            }
            self.output.close().await?;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_before_terminate_under_small_queue() {
        let registry = ProcessorRegistry::new().with("test", "Burst", Burst::factory(16));
        let router = Router::new(
            loader_with(registry),
            RouterConfig {
                outgoing_capacity: 2,
            },
        );

        let processor = ProcessorSpec::new("urn:proc/burst", "")
            .with_metadata(METADATA_MODULE_NAME, "test")
            .with_metadata(METADATA_CLASS_NAME, "Burst");
        let stage = StageSpec::new("urn:stage/burst", processor)
            .with_argument("output", Argument::writer("w1"));
        router.load(stage).unwrap();

        let rx = router.exec(inbound(vec![])).unwrap();
        let items = collect(rx).await;

        // Every enqueued payload arrives, in order, and CLOSE is last.
        assert_eq!(items.len(), 17);
        for (index, item) in items.iter().take(16).enumerate() {
            assert_eq!(
                *item,
                Ok(ChannelMessage::data(
                    "w1",
                    Bytes::from(index.to_string().into_bytes())
                ))
            );
        }
        assert_eq!(items[16], Ok(ChannelMessage::close("w1")));
    }

    // Fails as soon as it reads anything.
    struct Faulty {
        input: Arc<dyn pipewright_channel::Reader>,
    }

    impl Faulty {
        fn factory() -> Factory {
            Arc::new(
                |args: &Arguments<'_>| -> Result<Box<dyn Processor>, BuildError> {
                    Ok(Box::new(Faulty {
                        input: args.reader("input")?,
                    }))
                },
            )
        }
    }

    #[async_trait]
    impl Processor for Faulty {
        async fn exec(&mut self) -> Result<(), ProcessorError> {
            let _ = self.input.read().await;
            Err(ProcessorError::Failed("deliberate".to_string()))
        }
    }

    #[tokio::test]
    async fn test_stage_failure_fails_exec() {
        let registry = ProcessorRegistry::new().with("test", "Faulty", Faulty::factory());
        let router = Router::new(loader_with(registry), RouterConfig::default());

        let processor = ProcessorSpec::new("urn:proc/faulty", "")
            .with_metadata(METADATA_MODULE_NAME, "test")
            .with_metadata(METADATA_CLASS_NAME, "Faulty");
        let stage = StageSpec::new("urn:stage/faulty", processor)
            .with_argument("input", Argument::reader("r1"));
        router.load(stage).unwrap();

        let rx = router
            .exec(inbound(vec![ChannelMessage::data(
                "r1",
                Bytes::from_static(b"boom"),
            )]))
            .unwrap();

        let items = collect(rx).await;
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(RuntimeError::StageFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_fifo_preserved_end_to_end() {
        let router = Router::new(default_loader(), RouterConfig::default());
        router.load(forwarding_stage("urn:stage/1", "r1", "w1")).unwrap();

        let payloads: Vec<Bytes> = (0..32)
            .map(|index: u32| Bytes::from(index.to_string().into_bytes()))
            .collect();
        let mut messages: Vec<ChannelMessage> = payloads
            .iter()
            .map(|payload| ChannelMessage::data("r1", payload.clone()))
            .collect();
        messages.push(ChannelMessage::close("r1"));

        let rx = router.exec(inbound(messages)).unwrap();
        let items = collect(rx).await;

        assert_eq!(items.len(), 33);
        for (index, payload) in payloads.iter().enumerate() {
            assert_eq!(
                items[index],
                Ok(ChannelMessage::data("w1", payload.clone()))
            );
        }
        assert_eq!(items[32], Ok(ChannelMessage::close("w1")));
    }
}
