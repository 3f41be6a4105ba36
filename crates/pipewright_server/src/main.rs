//! Pipewright Server
//!
//! gRPC runner process: loads pipeline stages and executes them over a
//! bidirectional message stream.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pipewright_processor::{ProcessorRegistry, RegistryLoader, Transparent};
use pipewright_runtime::{Router, RouterConfig};
use pipewright_server::RunnerService;
use pipewright_server::proto::runner_server::RunnerServer;

#[derive(Parser)]
#[command(name = "pipewright-server")]
#[command(about = "Pipewright pipeline-stage runner", long_about = None)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1:50051")]
    bind: String,

    /// Directory where processor bundles are staged
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Capacity of the outgoing message queue
    #[arg(long, default_value_t = 1024)]
    outgoing_capacity: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter("pipewright=debug,tonic=info")
        .init();

    let registry = ProcessorRegistry::new().with(
        Transparent::MODULE,
        Transparent::CLASS,
        Transparent::factory(),
    );
    let mut loader = RegistryLoader::new(registry);
    if let Some(dir) = args.staging_dir {
        loader = loader.with_staging_root(dir);
    }

    let router = Router::new(
        Arc::new(loader),
        RouterConfig {
            outgoing_capacity: args.outgoing_capacity,
        },
    );
    let service = RunnerService::new(Arc::new(router));

    let addr = args.bind.parse()?;
    tracing::info!(%addr, "runner listening");
    tonic::transport::Server::builder()
        .add_service(RunnerServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
