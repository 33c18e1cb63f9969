// MIT License - Copyright (c) 2026 Peter Wright
// Single-worker request queue in front of the transport

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{OperationError, RejectReason};
use crate::protocol::{Request, Response};
use crate::transport::Transport;

pub(crate) type ResponseSender = oneshot::Sender<Result<Response, OperationError>>;

/// A queued request and the channel its result goes back on.
pub(crate) struct Envelope {
    pub request: Request,
    pub response_tx: ResponseSender,
    /// Detached requests run even after the caller drops its handle.
    pub detached: bool,
}

impl Envelope {
    /// Answer without running the request.
    ///
    /// Nobody may be waiting on a detached request, so its failure is
    /// logged here.
    pub(crate) fn reject(self, error: OperationError) {
        if self.detached {
            warn!("Could not send {}: {}", self.request.describe(), error);
        }
        let _ = self.response_tx.send(Err(error));
    }
}

pub(crate) type EnvelopeSender = mpsc::UnboundedSender<Envelope>;
pub(crate) type EnvelopeReceiver = mpsc::UnboundedReceiver<Envelope>;

/// Interpret a command's response: only an ACK counts as success.
pub(crate) fn command_outcome(result: &Result<Response, OperationError>) -> Result<(), OperationError> {
    match result {
        Ok(Response::Ack) => Ok(()),
        Ok(Response::Nak) => Err(OperationError::Rejected(RejectReason::Nak)),
        Ok(other) => Err(OperationError::invalid(format!(
            "unexpected {} response to command",
            other.kind()
        ))),
        Err(e) => Err(e.clone()),
    }
}

/// Run queued requests against the transport one at a time.
///
/// Requests whose caller has gone away before they are dequeued are
/// dropped without reaching the transport. On cancellation the in-flight
/// request and everything still queued fail with `NotConnected`.
pub(crate) async fn run_worker<F>(
    transport: Arc<dyn Transport>,
    mut rx: EnvelopeReceiver,
    cancel: CancellationToken,
    on_offline: F,
) where
    F: Fn(&OperationError) + Send + 'static,
{
    loop {
        let envelope = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = rx.recv() => match envelope {
                Some(envelope) => envelope,
                None => break,
            },
        };

        if !envelope.detached && envelope.response_tx.is_closed() {
            debug!("Skipping cancelled request: {}", envelope.request.describe());
            continue;
        }

        let description = envelope.request.describe();
        let is_command = matches!(envelope.request, Request::Command { .. });
        debug!("Executing {}", description);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let error = OperationError::NotConnected;
                if envelope.detached {
                    warn!("Could not send {}: {}", description, error);
                }
                let _ = envelope.response_tx.send(Err(error));
                break;
            }
            result = transport.request(envelope.request) => result,
        };

        if let Err(e) = &result {
            if e.indicates_offline() {
                on_offline(e);
            }
        }

        if envelope.detached && is_command {
            if let Err(e) = command_outcome(&result) {
                warn!("Could not send {}: {}", description, e);
            }
        }

        let _ = envelope.response_tx.send(result);
    }

    rx.close();
    let mut drained = 0usize;
    while let Ok(envelope) = rx.try_recv() {
        envelope.reject(OperationError::NotConnected);
        drained += 1;
    }
    debug!("Request worker stopped ({} queued requests failed)", drained);
}
