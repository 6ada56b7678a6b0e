//! Server configuration and command-line parsing.

use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use shroud_core::{DispatcherConfig, RoutingPolicy};
use shroud_proto::FrameHeader;

use crate::ServerError;

/// Shroud shuffling relay
///
/// Accepts encrypted submissions from clients, batches them per routing
/// policy and forwards shuffled batches to the analyzer.
#[derive(Debug, Clone, Parser)]
#[command(name = "shroud-server", version, about, long_about = None)]
pub struct Cli {
    /// Address to accept client submissions on
    #[arg(long, default_value = "127.0.0.1:7400")]
    pub bind: SocketAddr,

    /// Analyzer address to forward batches to
    #[arg(long)]
    pub analyzer: SocketAddr,

    /// Batch threshold for policies without an override
    #[arg(long, default_value_t = 100)]
    pub threshold: usize,

    /// Threshold override for one policy (repeatable)
    #[arg(long = "policy-threshold", value_name = "METRIC:DAY=N", value_parser = parse_policy_threshold)]
    pub policy_thresholds: Vec<(RoutingPolicy, usize)>,

    /// Largest accepted ciphertext in bytes
    #[arg(long, default_value_t = 64 * 1024)]
    pub max_ciphertext_bytes: usize,

    /// Seconds to spend delivering queued batches on shutdown
    #[arg(long, default_value_t = 10)]
    pub drain_timeout_secs: u64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

fn parse_policy_threshold(s: &str) -> Result<(RoutingPolicy, usize), String> {
    let (policy, threshold) =
        s.split_once('=').ok_or_else(|| format!("expected METRIC:DAY=N, got {s:?}"))?;
    let policy = policy.parse::<RoutingPolicy>().map_err(|err| err.to_string())?;
    let threshold = threshold
        .trim()
        .parse::<usize>()
        .map_err(|err| format!("invalid threshold {threshold:?}: {err}"))?;
    Ok((policy, threshold))
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Client listen address
    pub bind_addr: SocketAddr,
    /// Analyzer address
    pub analyzer_addr: SocketAddr,
    /// Batching thresholds and limits
    pub dispatcher: DispatcherConfig,
    /// How long shutdown waits for queued batches to reach the analyzer
    pub drain_timeout: Duration,
}

impl ServerConfig {
    /// Check the dispatcher settings and that every possible batch fits in
    /// one frame.
    ///
    /// # Errors
    ///
    /// `Dispatch` for invalid thresholds, `Config` if a full batch of
    /// maximum-size ciphertexts would exceed the frame payload limit.
    pub fn validate(&self) -> Result<(), ServerError> {
        self.dispatcher.validate()?;

        let max_len = self.dispatcher.max_ciphertext_len;
        let largest_threshold = self
            .dispatcher
            .thresholds
            .values()
            .copied()
            .chain(std::iter::once(self.dispatcher.default_threshold))
            .max()
            .unwrap_or(self.dispatcher.default_threshold);

        // count prefix plus a length prefix per entry
        let worst_case = largest_threshold.saturating_mul(max_len.saturating_add(4)).saturating_add(4);
        if worst_case > FrameHeader::MAX_PAYLOAD_SIZE {
            return Err(ServerError::Config(format!(
                "a batch of {largest_threshold} ciphertexts of {max_len} bytes exceeds the {} byte frame limit",
                FrameHeader::MAX_PAYLOAD_SIZE
            )));
        }
        Ok(())
    }
}

impl TryFrom<Cli> for ServerConfig {
    type Error = ServerError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut dispatcher = DispatcherConfig {
            default_threshold: cli.threshold,
            max_ciphertext_len: cli.max_ciphertext_bytes,
            ..DispatcherConfig::default()
        };
        for (policy, threshold) in cli.policy_thresholds {
            if dispatcher.thresholds.insert(policy, threshold).is_some() {
                return Err(ServerError::Config(format!("duplicate threshold for policy {policy}")));
            }
        }

        let config = Self {
            bind_addr: cli.bind,
            analyzer_addr: cli.analyzer,
            dispatcher,
            drain_timeout: Duration::from_secs(cli.drain_timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }
}
