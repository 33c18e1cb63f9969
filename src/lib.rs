// MIT License - Copyright (c) 2026 Peter Wright
// Omni-Link controller integration layer
//
//! # omnilink-bridge
//!
//! Integration layer between an Omni-style home automation controller and
//! a host automation platform.
//!
//! - [`Session`] keeps the controller link, serializes every request
//!   through a single worker and forwards status notifications.
//! - [`NotificationRouter`] delivers each status update to the host object
//!   registered for it.
//! - [`DiscoveryEngine`] walks the controller's object tables and streams
//!   out a device descriptor for every area, unit, zone, button, thermostat
//!   and audio zone it finds.
//!
//! The wire protocol lives behind the [`Transport`] trait.
//! [`SimulatedController`](transport::simulated::SimulatedController) is an
//! in-memory implementation for tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use omnilink_bridge::transport::simulated::SimulatedController;
//! use omnilink_bridge::{BridgeConfig, DeviceDescriptor, OmniBridge};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BridgeConfig::from_toml_str(
//!         r#"
//!         host = "192.168.0.100"
//!         key1 = "00-11-22-33-44-55-66-77"
//!         key2 = "88-99-AA-BB-CC-DD-EE-FF"
//!         "#,
//!     )?;
//!
//!     let bridge = OmniBridge::activate(config, Arc::new(SimulatedController::new())).await?;
//!     bridge
//!         .discover(&|d: &DeviceDescriptor| println!("{}: {}", d.thing_type(), d.label))
//!         .await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     bridge.deactivate().await;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod command;
pub mod config;
pub mod constants;
pub mod cursor;
pub mod devices;
pub mod discovery;
pub mod error;
pub mod event;
pub mod filter;
pub mod protocol;
pub mod router;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use bridge::OmniBridge;
pub use command::DeviceCommand;
pub use config::{BridgeConfig, BridgeConfigBuilder, Credentials, Endpoint};
pub use constants::{CommandCode, ObjectType, UnitType};
pub use cursor::ObjectCursor;
pub use discovery::{ControllerFamily, DeviceDescriptor, DeviceKind, DeviceSink, DiscoveryEngine};
pub use error::{BridgeError, ConnectError, OperationError, RejectReason, Result};
pub use event::{StatusEvent, TransportEvent};
pub use filter::{ObjectFilter, PropertyFilter, filter_for_area};
pub use protocol::{ObjectRecord, Request, Response, SystemInfo};
pub use router::{
    AreaTarget, AudioZoneTarget, DeviceRegistry, DispatchReport, NotificationRouter, Registration,
    Target, TargetKind, TargetResult, ThermostatTarget, UnitTarget, ZoneTarget,
};
pub use session::{CommandHandle, ConnectionState, PendingRequest, Session};
pub use transport::Transport;
