// MIT License - Copyright (c) 2026 Peter Wright
// Connection session: lifecycle, serialized request queue, notification delivery

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::{BridgeConfig, Credentials, Endpoint};
use crate::constants::{CommandCode, ObjectType};
use crate::error::{ConnectError, OperationError, RejectReason};
use crate::event::{NotificationReceiver, StatusEvent, TransportEvent, notification_channel};
use crate::protocol::{Request, Response, SystemInfo};
use crate::router::NotificationRouter;
use crate::transport::Transport;
use crate::transport::worker::{Envelope, EnvelopeSender, command_outcome, run_worker};

/// Connection lifecycle as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The link was lost or could not be established; `connect` may be
    /// called again.
    Failed,
}

/// Result of a queued request.
///
/// Dropping it, or calling [`cancel`](Self::cancel), before the worker
/// dequeues the request means the request never reaches the transport.
#[derive(Debug)]
pub struct PendingRequest {
    rx: oneshot::Receiver<Result<Response, OperationError>>,
}

impl PendingRequest {
    pub fn cancel(mut self) {
        self.rx.close();
    }

    /// Wait at most `timeout`; on expiry the request is abandoned.
    pub async fn with_timeout(self, timeout: Duration) -> Result<Response, OperationError> {
        match tokio::time::timeout(timeout, self).await {
            Ok(result) => result,
            Err(_) => Err(OperationError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

impl Future for PendingRequest {
    type Output = Result<Response, OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(OperationError::Cancelled)))
    }
}

/// Handle to a fire-and-forget command.
///
/// The command runs whether or not the handle is kept. Awaiting it yields
/// `Ok(())` on acknowledgement.
#[derive(Debug)]
pub struct CommandHandle {
    pending: PendingRequest,
}

impl Future for CommandHandle {
    type Output = Result<(), OperationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.pending)
            .poll(cx)
            .map(|result| command_outcome(&result))
    }
}

struct Link {
    cancel: CancellationToken,
    worker: JoinHandle<()>,
    delivery: JoinHandle<()>,
}

struct SessionInner {
    transport: Arc<dyn Transport>,
    router: Arc<NotificationRouter>,
    request_timeout: Option<Duration>,
    notification_buffer: usize,
    state: Arc<watch::Sender<ConnectionState>>,
    queue: Mutex<Option<EnvelopeSender>>,
    link: tokio::sync::Mutex<Option<Link>>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(link) = self.link.get_mut().take() {
            link.cancel.cancel();
            link.worker.abort();
            link.delivery.abort();
        }
    }
}

/// A session with one controller.
///
/// All requests go through a single worker task, so the transport only
/// ever sees one request at a time, in submission order. Status
/// notifications are forwarded to the router as they arrive.
///
/// Cloning is cheap; clones share the same link.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    pub fn new(
        transport: Arc<dyn Transport>,
        router: Arc<NotificationRouter>,
        config: &BridgeConfig,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(SessionInner {
                transport,
                router,
                request_timeout: config.request_timeout,
                notification_buffer: config.notification_buffer,
                state: Arc::new(state),
                queue: Mutex::new(None),
                link: tokio::sync::Mutex::new(None),
            }),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Subscribe to connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn router(&self) -> &Arc<NotificationRouter> {
        &self.inner.router
    }

    fn queue(&self) -> MutexGuard<'_, Option<EnvelopeSender>> {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Open the link, enable notifications and start the worker.
    ///
    /// Calling this while connected is a no-op. Calling it after a failure
    /// tears down the old link first.
    pub async fn connect(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<(), ConnectError> {
        let mut link = self.inner.link.lock().await;
        if link.is_some() && self.is_connected() {
            debug!("Already connected to {}", endpoint);
            return Ok(());
        }
        if let Some(stale) = link.take() {
            debug!("Releasing previous link before reconnecting");
            self.teardown(stale).await;
        }

        self.inner.state.send_replace(ConnectionState::Connecting);
        info!("Connecting to controller at {}", endpoint);

        if let Err(e) = self.inner.transport.open(endpoint, credentials).await {
            error!("Failed to connect to {}: {}", endpoint, e);
            self.inner.state.send_replace(ConnectionState::Failed);
            return Err(e);
        }

        let (events_tx, events_rx) = notification_channel(self.inner.notification_buffer);
        if let Err(e) = self.inner.transport.enable_notifications(events_tx).await {
            error!("Failed to enable notifications: {}", e);
            self.inner.transport.close().await;
            self.inner.state.send_replace(ConnectionState::Failed);
            return Err(ConnectError::ProtocolMismatch {
                details: format!("could not enable notifications: {}", e),
            });
        }

        let cancel = CancellationToken::new();
        let (queue_tx, queue_rx) = mpsc::unbounded_channel();

        let state = Arc::clone(&self.inner.state);
        let worker = tokio::spawn(run_worker(
            Arc::clone(&self.inner.transport),
            queue_rx,
            cancel.clone(),
            move |e: &OperationError| {
                mark_failed(&state, &e.to_string());
            },
        ));
        let delivery = tokio::spawn(run_delivery(
            events_rx,
            Arc::clone(&self.inner.router),
            Arc::clone(&self.inner.state),
            cancel.clone(),
        ));

        *self.queue() = Some(queue_tx);
        *link = Some(Link {
            cancel,
            worker,
            delivery,
        });
        self.inner.state.send_replace(ConnectionState::Connected);
        info!("Connected to controller at {}", endpoint);
        Ok(())
    }

    /// Close the link. Queued requests fail with `NotConnected`.
    pub async fn disconnect(&self) {
        let mut link = self.inner.link.lock().await;
        match link.take() {
            Some(current) => {
                info!("Disconnecting from controller");
                self.teardown(current).await;
            }
            None => debug!("Disconnect requested with no open link"),
        }
        self.inner.state.send_if_modified(|state| {
            let changed = *state != ConnectionState::Disconnected;
            *state = ConnectionState::Disconnected;
            changed
        });
    }

    async fn teardown(&self, link: Link) {
        self.queue().take();
        link.cancel.cancel();
        self.inner.transport.disable_notifications().await;
        let _ = link.worker.await;
        let _ = link.delivery.await;
        self.inner.transport.close().await;
    }

    /// Move a connected session to `Failed`.
    pub(crate) fn mark_failed(&self, reason: &str) {
        mark_failed(&self.inner.state, reason);
    }

    fn enqueue(&self, request: Request, detached: bool) -> PendingRequest {
        let (response_tx, rx) = oneshot::channel();
        let envelope = Envelope {
            request,
            response_tx,
            detached,
        };

        let queue = if self.is_connected() {
            self.queue().clone()
        } else {
            None
        };
        match queue {
            Some(queue) => {
                if let Err(mpsc::error::SendError(envelope)) = queue.send(envelope) {
                    envelope.reject(OperationError::NotConnected);
                }
            }
            None => envelope.reject(OperationError::NotConnected),
        }
        PendingRequest { rx }
    }

    /// Queue a request behind any already submitted.
    pub fn submit(&self, request: Request) -> PendingRequest {
        self.enqueue(request, false)
    }

    /// Submit and wait, applying the configured timeout if one is set.
    pub async fn request(&self, request: Request) -> Result<Response, OperationError> {
        let pending = self.submit(request);
        match self.inner.request_timeout {
            Some(timeout) => pending.with_timeout(timeout).await,
            None => pending.await,
        }
    }

    /// Send a command without requiring the caller to wait for it.
    ///
    /// Failures are logged by the worker whether or not the handle is
    /// awaited.
    pub fn send_command(&self, code: CommandCode, p1: u8, p2: u16) -> CommandHandle {
        debug!("Queueing command {:?}({}, {})", code, p1, p2);
        CommandHandle {
            pending: self.enqueue(Request::Command { code, p1, p2 }, true),
        }
    }

    /// Current status of objects `start..=end`.
    pub async fn request_status(
        &self,
        object_type: ObjectType,
        start: u16,
        end: u16,
    ) -> Result<Vec<StatusEvent>, OperationError> {
        let response = self
            .request(Request::ObjectStatus {
                object_type,
                start,
                end,
            })
            .await?;
        match response {
            Response::Statuses(events) => Ok(events),
            Response::Nak => Err(OperationError::Rejected(RejectReason::NoSuchObject)),
            other => Err(OperationError::invalid(format!(
                "expected statuses, got {}",
                other.kind()
            ))),
        }
    }

    pub async fn system_information(&self) -> Result<SystemInfo, OperationError> {
        match self.request(Request::SystemInformation).await? {
            Response::SystemInformation(info) => Ok(info),
            other => Err(OperationError::invalid(format!(
                "expected system information, got {}",
                other.kind()
            ))),
        }
    }
}

fn mark_failed(state: &watch::Sender<ConnectionState>, reason: &str) {
    let changed = state.send_if_modified(|current| {
        if *current == ConnectionState::Connected {
            *current = ConnectionState::Failed;
            true
        } else {
            false
        }
    });
    if changed {
        error!("Controller link lost: {}", reason);
    }
}

async fn run_delivery(
    mut events: NotificationReceiver,
    router: Arc<NotificationRouter>,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };
        match event {
            Some(TransportEvent::Status(batch)) => {
                router.on_notification(&batch);
            }
            Some(TransportEvent::Other(codes)) => {
                debug!("Ignoring {} non-status event(s): {:?}", codes.len(), codes);
            }
            Some(TransportEvent::Closed { reason }) => mark_failed(&state, &reason),
            None => {
                mark_failed(&state, "notification stream ended");
                break;
            }
        }
    }
    debug!("Notification delivery stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::simulated::SimulatedController;

    fn config() -> BridgeConfig {
        BridgeConfig::builder()
            .keys("0011223344556677", "8899aabbccddeeff")
            .build()
    }

    fn session(sim: &Arc<SimulatedController>) -> Session {
        let transport: Arc<dyn Transport> = sim.clone();
        Session::new(transport, Arc::new(NotificationRouter::new()), &config())
    }

    #[tokio::test]
    async fn test_submit_while_disconnected() {
        let sim = Arc::new(SimulatedController::new());
        let session = session(&sim);
        let err = session.submit(Request::SystemInformation).await.unwrap_err();
        assert_eq!(err, OperationError::NotConnected);
        assert!(sim.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let sim = Arc::new(SimulatedController::new());
        let session = session(&sim);
        let config = config();

        session
            .connect(&config.endpoint, &config.credentials)
            .await
            .unwrap();
        assert_eq!(session.state(), ConnectionState::Connected);
        assert!(sim.notifications_enabled());

        // second connect is a no-op
        session
            .connect(&config.endpoint, &config.credentials)
            .await
            .unwrap();

        let info = session.system_information().await.unwrap();
        assert_eq!(info.model, 30);

        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert!(!sim.is_open());
        assert!(!sim.notifications_enabled());

        // idempotent
        session.disconnect().await;
        assert_eq!(session.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_connect_failure_sets_failed() {
        let sim = Arc::new(SimulatedController::new());
        sim.set_reachable(false);
        let session = session(&sim);
        let config = config();

        let err = session
            .connect(&config.endpoint, &config.credentials)
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::Unreachable { .. }));
        assert_eq!(session.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_command_rejected() {
        let sim = Arc::new(SimulatedController::new());
        sim.set_command_response(Response::Nak);
        let session = session(&sim);
        let config = config();
        session
            .connect(&config.endpoint, &config.credentials)
            .await
            .unwrap();

        let result = session.send_command(CommandCode::UnitOn, 0, 5).await;
        assert_eq!(result, Err(OperationError::Rejected(RejectReason::Nak)));
        assert_eq!(sim.commands(), vec![(CommandCode::UnitOn, 0, 5)]);
    }

    #[tokio::test]
    async fn test_request_status_missing_object() {
        let sim = Arc::new(SimulatedController::new());
        let session = session(&sim);
        let config = config();
        session
            .connect(&config.endpoint, &config.credentials)
            .await
            .unwrap();

        let err = session
            .request_status(ObjectType::Zone, 9, 9)
            .await
            .unwrap_err();
        assert_eq!(err, OperationError::Rejected(RejectReason::NoSuchObject));
    }
}
