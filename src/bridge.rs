// MIT License - Copyright (c) 2026 Peter Wright
// Host-facing facade over session, router and discovery

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::command::DeviceCommand;
use crate::config::BridgeConfig;
use crate::constants::ObjectType;
use crate::discovery::{DeviceDescriptor, DeviceSink, DiscoveryEngine};
use crate::error::{BridgeError, ConnectError, Result};
use crate::router::{DispatchReport, NotificationRouter, Registration, Target, TargetKind};
use crate::session::{CommandHandle, ConnectionState, Session};
use crate::transport::Transport;

/// The integration layer for one controller, as a host sees it.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use omnilink_bridge::transport::simulated::SimulatedController;
/// use omnilink_bridge::{BridgeConfig, DeviceCommand, DeviceDescriptor, ObjectType, OmniBridge};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = BridgeConfig::builder()
///         .host("192.168.0.100")
///         .keys("00-11-22-33-44-55-66-77", "88-99-aa-bb-cc-dd-ee-ff")
///         .build();
///
///     let bridge = OmniBridge::activate(config, Arc::new(SimulatedController::new())).await?;
///
///     let devices = bridge
///         .discover(&|d: &DeviceDescriptor| println!("Found {} {}", d.thing_type(), d.label))
///         .await?;
///     println!("{} devices", devices.len());
///
///     bridge
///         .issue_command(ObjectType::Unit, 1, DeviceCommand::On)?
///         .await?;
///
///     bridge.deactivate().await;
///     Ok(())
/// }
/// ```
pub struct OmniBridge {
    config: BridgeConfig,
    session: Session,
    discovery: DiscoveryEngine,
}

impl OmniBridge {
    /// Validate `config` and connect, retrying unreachable controllers
    /// with exponential backoff.
    pub async fn activate(config: BridgeConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;

        let router = Arc::new(NotificationRouter::new());
        let session = Session::new(transport, router, &config);
        let bridge = Self {
            discovery: DiscoveryEngine::new(session.clone()),
            session,
            config,
        };
        bridge.connect_with_retry().await?;
        info!("Bridge to {} active", bridge.config.endpoint);
        Ok(bridge)
    }

    async fn connect_with_retry(&self) -> Result<()> {
        let max_retries = self.config.max_connect_retries;
        let base_delay_ms = self.config.reconnect_delay_ms;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay_ms = base_delay_ms.saturating_mul(1 << (attempt - 1).min(4));
                warn!(
                    "Connection attempt {} failed, retrying in {:.1}s...",
                    attempt,
                    delay_ms as f64 / 1000.0
                );
                sleep(Duration::from_millis(delay_ms)).await;
            }

            match self
                .session
                .connect(&self.config.endpoint, &self.config.credentials)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if !e.is_retryable() || attempt == max_retries {
                        return Err(e.into());
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or(ConnectError::ProtocolMismatch {
                details: "no connection attempt made".to_string(),
            })
            .into())
    }

    /// Reconnect after the session has failed. No-op while connected.
    pub async fn reconnect(&self) -> Result<()> {
        self.connect_with_retry().await
    }

    /// Disconnect and release the transport.
    pub async fn deactivate(&self) {
        info!("Deactivating bridge to {}", self.config.endpoint);
        self.session.disconnect().await;
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn router(&self) -> &Arc<NotificationRouter> {
        self.session.router()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session.state()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.session.watch_state()
    }

    /// Route status updates for object `number` to `target`.
    pub fn register_target(&self, number: u16, area: Option<u16>, target: Target) -> Option<Registration> {
        self.router().registry().register(number, area, target)
    }

    pub fn deregister_target(&self, kind: TargetKind, number: u16) -> Option<Registration> {
        self.router().registry().deregister(kind, number)
    }

    /// Enumerate the controller's devices, streaming each to `sink`.
    pub async fn discover(&self, sink: &dyn DeviceSink) -> Result<Vec<DeviceDescriptor>> {
        self.discovery.scan(sink).await
    }

    /// Queue `command` against object `number`.
    ///
    /// Validation errors are returned immediately; controller failures are
    /// reported through the handle and logged whether or not it is awaited.
    pub fn issue_command(
        &self,
        object_type: ObjectType,
        number: u16,
        command: DeviceCommand,
    ) -> Result<CommandHandle> {
        let (code, p1, p2) = command.encode(object_type, number)?;
        debug!("Issuing {:?} to {} {}", command, object_type.as_str(), number);
        Ok(self.session.send_command(code, p1, p2))
    }

    /// Fetch the current status of one object and deliver it to its
    /// registered target.
    pub async fn refresh(&self, kind: TargetKind, number: u16) -> Result<DispatchReport> {
        if number == 0 {
            return Err(BridgeError::InvalidArgument(
                "object numbers start at 1".to_string(),
            ));
        }
        let statuses = self
            .session
            .request_status(kind.object_type(), number, number)
            .await?;
        Ok(self.router().on_notification(&statuses))
    }
}
