//! Server error types.

use std::io;

use shroud_core::DispatchError;
use shroud_proto::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the relay server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Peer sent a malformed frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Dispatcher rejected the configuration or a submission.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Command-line settings could not be turned into a configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Background task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Connection closed in the middle of a frame.
    #[error("connection closed mid-frame")]
    UnexpectedEof,
}
