// MIT License - Copyright (c) 2026 Peter Wright
// Controller client boundary

pub mod simulated;
pub(crate) mod worker;

use async_trait::async_trait;

use crate::config::{Credentials, Endpoint};
use crate::error::{ConnectError, OperationError};
use crate::event::NotificationSender;
use crate::protocol::{Request, Response};

/// A client for the controller's wire protocol.
///
/// The session calls `request` from a single worker task only, so
/// implementations need not support concurrent requests. Notifications
/// are pushed through the sender handed to `enable_notifications` and may
/// arrive at any time, interleaved with request/response cycles.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the link and authenticate with the session key.
    async fn open(&self, endpoint: &Endpoint, credentials: &Credentials)
        -> Result<(), ConnectError>;

    /// Send one request and wait for its response.
    async fn request(&self, request: Request) -> Result<Response, OperationError>;

    /// Start pushing notifications to `sink`, replacing any previous sink.
    async fn enable_notifications(&self, sink: NotificationSender) -> Result<(), OperationError>;

    /// Stop pushing notifications.
    async fn disable_notifications(&self);

    /// Release the link. Must be safe to call more than once.
    async fn close(&self);
}
