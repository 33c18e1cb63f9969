// MIT License - Copyright (c) 2026 Peter Wright
// Error taxonomy for the controller integration layer

use std::fmt;

/// Why a session could not be established.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("Controller unreachable at {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("Controller rejected the session key")]
    AuthRejected,

    #[error("Protocol mismatch: {details}")]
    ProtocolMismatch { details: String },
}

impl ConnectError {
    /// Whether another attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ConnectError::Unreachable { .. })
    }
}

/// Failure of a single request or command on an established session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperationError {
    #[error("Not connected to controller")]
    NotConnected,

    #[error("Invalid response: {details}")]
    InvalidResponse { details: String },

    #[error("Unknown message type: {message_type}")]
    UnknownMessage { message_type: u8 },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request cancelled before execution")]
    Cancelled,

    #[error("Controller rejected request: {0}")]
    Rejected(RejectReason),
}

impl OperationError {
    /// Whether this error means the session itself is gone, as opposed to a
    /// single malformed or slow exchange.
    pub fn indicates_offline(&self) -> bool {
        matches!(self, OperationError::NotConnected)
    }

    pub(crate) fn invalid(details: impl Into<String>) -> Self {
        OperationError::InvalidResponse {
            details: details.into(),
        }
    }
}

/// Reason carried by a negative acknowledgement from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The controller answered with a NAK.
    Nak,
    /// The object addressed by the request does not exist.
    NoSuchObject,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nak => f.write_str("negative acknowledgement"),
            Self::NoSuchObject => f.write_str("no such object"),
        }
    }
}

/// All errors surfaced by the omnilink-bridge library.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A discovery scan is already running")]
    ScanInProgress,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Whether the error means the controller link is down.
    pub fn indicates_offline(&self) -> bool {
        match self {
            BridgeError::Connect(_) => true,
            BridgeError::Operation(e) => e.indicates_offline(),
            _ => false,
        }
    }
}

impl From<toml::de::Error> for BridgeError {
    fn from(e: toml::de::Error) -> Self {
        BridgeError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
