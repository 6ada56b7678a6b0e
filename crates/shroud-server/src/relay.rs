//! Client-facing relay.
//!
//! Each client connection carries a stream of `Submit` frames. Frames are
//! decoded and handed to the dispatcher; nothing is ever written back.
//!
//! # Error Handling
//!
//! - A malformed frame closes that connection only.
//! - A submission the dispatcher rejects (empty or oversized ciphertext) is
//!   dropped and the connection stays open.

use std::sync::Arc;

use shroud_core::{Analyzer, Ciphertext, RoutingPolicy, ShuffleDispatcher};
use shroud_proto::{Opcode, ProtocolError};
use tokio::{io::AsyncRead, net::TcpListener, task::JoinSet};

use crate::{ServerError, framing::read_frame};

/// Accepts client connections and feeds a shared dispatcher.
pub struct Relay<A> {
    dispatcher: Arc<ShuffleDispatcher<A>>,
}

impl<A> Clone for Relay<A> {
    fn clone(&self) -> Self {
        Self { dispatcher: Arc::clone(&self.dispatcher) }
    }
}

impl<A: Analyzer + 'static> Relay<A> {
    /// Wrap a dispatcher.
    pub fn new(dispatcher: ShuffleDispatcher<A>) -> Self {
        Self { dispatcher: Arc::new(dispatcher) }
    }

    /// Shared dispatcher.
    pub fn dispatcher(&self) -> &ShuffleDispatcher<A> {
        &self.dispatcher
    }

    /// Accept connections forever, one task per client.
    ///
    /// # Errors
    ///
    /// Returns only if accepting fails.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        self.serve_until(listener, std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// On return the listener is closed and every connection task has been
    /// stopped, so no further submissions reach the dispatcher. Tasks only
    /// stop at socket reads; a submission is never cut off halfway through.
    ///
    /// # Errors
    ///
    /// Returns if accepting fails, after stopping the connection tasks.
    pub async fn serve_until<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                () = &mut shutdown => break Ok(()),
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => break Err(err.into()),
                    };
                    tracing::debug!(%peer, "client connected");

                    let relay = self.clone();
                    connections.spawn(async move {
                        let mut stream = stream;
                        match relay.handle_connection(&mut stream).await {
                            Ok(accepted) => tracing::debug!(%peer, accepted, "client disconnected"),
                            Err(err) => tracing::warn!(%peer, error = %err, "closing client connection"),
                        }
                    });
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {},
            }
        };

        drop(listener);
        let open = connections.len();
        connections.shutdown().await;
        tracing::debug!(open, "stopped client connections");
        result
    }

    /// Read submissions from one client until it disconnects.
    ///
    /// Returns the number of submissions the dispatcher accepted.
    ///
    /// # Errors
    ///
    /// Any framing or I/O error. Dispatcher rejections are not errors.
    pub async fn handle_connection<S>(&self, stream: &mut S) -> Result<u64, ServerError>
    where
        S: AsyncRead + Unpin,
    {
        let max_payload = self.dispatcher.config().max_ciphertext_len;
        let mut accepted = 0;

        while let Some(frame) = read_frame(stream, max_payload).await? {
            let opcode = frame.opcode()?;
            if opcode != Opcode::Submit {
                return Err(ProtocolError::UnexpectedOpcode { expected: Opcode::Submit, actual: opcode }
                    .into());
            }

            let policy = RoutingPolicy::new(frame.header.metric_id(), frame.header.day_index());
            match self.dispatcher.submit(policy, Ciphertext::from(frame.payload)) {
                Ok(_) => accepted += 1,
                Err(err) => tracing::debug!(error = %err, "submission rejected"),
            }
        }

        Ok(accepted)
    }
}
