//! Shroud relay server binary.
//!
//! Connects to the analyzer, then accepts client submissions until Ctrl-C.
//! On shutdown, full batches already queued for the analyzer are written out
//! within the drain timeout. Ciphertexts still below their policy's
//! threshold are discarded, never flushed early.

use std::process::ExitCode;

use clap::Parser;
use shroud_core::ShuffleDispatcher;
use shroud_server::{ChannelAnalyzer, Cli, Relay, ServerConfig, ServerError, forward_batches};
use tokio::{
    net::{TcpListener, TcpStream},
    time::timeout,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let result = match ServerConfig::try_from(cli) {
        Ok(config) => run(config).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "relay stopped");
            ExitCode::FAILURE
        },
    }
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let (analyzer, batches) = ChannelAnalyzer::new();
    let backlog = analyzer.backlog();
    let relay = Relay::new(ShuffleDispatcher::new(config.dispatcher, analyzer)?);

    let mut upstream = TcpStream::connect(config.analyzer_addr).await?;
    tracing::info!(analyzer = %config.analyzer_addr, "connected to analyzer");
    let forwarder_backlog = backlog.clone();
    let mut forwarder = tokio::spawn(async move {
        forward_batches(batches, &mut upstream, forwarder_backlog).await
    });

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "relay listening");

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "signal handler failed, shutting down");
        }
    };

    let served = tokio::select! {
        result = relay.serve_until(listener, shutdown) => result,
        joined = &mut forwarder => {
            let forwarded = joined??;
            tracing::warn!(forwarded, "forwarder exited");
            return Ok(());
        },
    };

    let stranded: usize =
        relay.dispatcher().pending_by_policy().iter().map(|(_, pending)| pending).sum();
    tracing::info!(stranded, queued = backlog.get(), "shutting down, draining analyzer queue");

    // Last sender goes with the dispatcher; the forwarder ends once drained
    drop(relay);
    match timeout(config.drain_timeout, &mut forwarder).await {
        Ok(Ok(Ok(forwarded))) => tracing::info!(forwarded, "analyzer queue drained"),
        Ok(Ok(Err(err))) => {
            tracing::warn!(error = %err, undelivered = backlog.get(), "forwarder failed during drain");
        },
        Ok(Err(err)) => tracing::warn!(error = %err, undelivered = backlog.get(), "forwarder task failed"),
        Err(_) => {
            forwarder.abort();
            tracing::warn!(undelivered = backlog.get(), "drain timed out, batches not delivered");
        },
    }

    served
}
