//! The router: stage registry, fan-out table, and outgoing queue.

use std::sync::{Arc, Mutex, RwLock};

use bytes::Bytes;
use futures::FutureExt;
use indexmap::IndexMap;
use pipewright_channel::{
    CallbackWriter, Channel, ChannelError, ChannelRepository, Reader, Writer,
};
use pipewright_core::{
    ChannelMessage, ChannelUri, METADATA_CLASS_NAME, METADATA_MODULE_NAME, StageSpec, StageUri,
};
use pipewright_processor::{Arguments, Loader, Processor};
use tokio::sync::mpsc;

use crate::error::{RuntimeError, RuntimeResult};

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Capacity of the shared outgoing-message queue.
    ///
    /// Writers suspend when the queue is full until the multiplexing loop
    /// drains, so queue growth stays bounded regardless of how fast
    /// processors produce.
    pub outgoing_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            outgoing_capacity: 1024,
        }
    }
}

/// Owns all state of one pipeline run.
///
/// Stages are declared through [`Router::load`] and executed, once, through
/// [`Router::exec`]. The stage registry and fan-out table are populated
/// during the Load phase only and are read-only once Exec starts; the
/// outgoing queue is the single structure mutated concurrently, by every
/// callback writer on the producing side and the multiplexing loop on the
/// consuming side.
pub struct Router {
    loader: Arc<dyn Loader>,
    config: RouterConfig,
    stages: RwLock<IndexMap<StageUri, Box<dyn Processor>>>,
    readers: RwLock<IndexMap<ChannelUri, Vec<Arc<Channel>>>>,
    outgoing_tx: mpsc::Sender<ChannelMessage>,
    outgoing_rx: Mutex<Option<mpsc::Receiver<ChannelMessage>>>,
}

impl Router {
    /// Create a router for one pipeline run
    #[must_use]
    pub fn new(loader: Arc<dyn Loader>, config: RouterConfig) -> Self {
        let (outgoing_tx, outgoing_rx) = mpsc::channel(config.outgoing_capacity);
        Self {
            loader,
            config,
            stages: RwLock::new(IndexMap::new()),
            readers: RwLock::new(IndexMap::new()),
            outgoing_tx,
            outgoing_rx: Mutex::new(Some(outgoing_rx)),
        }
    }

    /// The router configuration
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Number of loaded stages
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.read().unwrap().len()
    }

    /// Declare a stage: load its processor implementation, resolve its
    /// arguments, and store the constructed instance under the stage URI.
    ///
    /// A failing load is scoped to this stage only; the router and any other
    /// loaded stages are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStage` if the descriptor is missing the `class_name`
    /// or `module_name` metadata, `ConstructorLoad` if the loader cannot
    /// produce a factory, and `Instantiation` if argument resolution or
    /// construction fails.
    pub fn load(&self, stage: StageSpec) -> RuntimeResult<()> {
        tracing::info!(uri = %stage.uri, "loading stage");

        let class = stage
            .processor
            .metadata(METADATA_CLASS_NAME)
            .ok_or_else(|| RuntimeError::InvalidStage {
                reason: format!("processor metadata is missing `{METADATA_CLASS_NAME}`"),
            })?;
        let module = stage
            .processor
            .metadata(METADATA_MODULE_NAME)
            .ok_or_else(|| RuntimeError::InvalidStage {
                reason: format!("processor metadata is missing `{METADATA_MODULE_NAME}`"),
            })?;

        let factory = self
            .loader
            .load(&stage.processor.entrypoint, module, class)
            .map_err(|source| RuntimeError::ConstructorLoad { source })?;

        let arguments = Arguments::new(&stage.arguments, self);
        let processor =
            factory(&arguments).map_err(|source| RuntimeError::Instantiation { source })?;

        self.stages.write().unwrap().insert(stage.uri, processor);
        Ok(())
    }

    /// Take the pieces Exec consumes: the stage registry, the fan-out table
    /// snapshot, and the outgoing queue receiver. One-shot.
    pub(crate) fn take_run_state(
        &self,
    ) -> RuntimeResult<(
        IndexMap<StageUri, Box<dyn Processor>>,
        IndexMap<ChannelUri, Vec<Arc<Channel>>>,
        mpsc::Receiver<ChannelMessage>,
    )> {
        let outgoing = self
            .outgoing_rx
            .lock()
            .unwrap()
            .take()
            .ok_or(RuntimeError::AlreadyExecuting)?;
        let stages = std::mem::take(&mut *self.stages.write().unwrap());
        let fanout = self.readers.read().unwrap().clone();
        Ok((stages, fanout, outgoing))
    }
}

impl ChannelRepository for Router {
    fn create_reader(&self, uri: &ChannelUri) -> Arc<dyn Reader> {
        let channel = Arc::new(Channel::new(uri.clone()));
        self.readers
            .write()
            .unwrap()
            .entry(uri.clone())
            .or_default()
            .push(Arc::clone(&channel));
        channel
    }

    fn create_writer(&self, uri: &ChannelUri) -> Arc<dyn Writer> {
        let write_tx = self.outgoing_tx.clone();
        let write_uri = uri.clone();
        let on_write = Box::new(move |payload: Bytes| {
            let tx = write_tx.clone();
            let uri = write_uri.clone();
            async move {
                tx.send(ChannelMessage::data(uri.clone(), payload))
                    .await
                    .map_err(|_| ChannelError::Disconnected { uri })
            }
            .boxed()
        });

        let close_tx = self.outgoing_tx.clone();
        let close_uri = uri.clone();
        let on_close = Box::new(move || {
            let tx = close_tx.clone();
            let uri = close_uri.clone();
            async move {
                tx.send(ChannelMessage::close(uri.clone()))
                    .await
                    .map_err(|_| ChannelError::Disconnected { uri })
            }
            .boxed()
        });

        Arc::new(CallbackWriter::new(uri.clone(), on_write, on_close))
    }
}
