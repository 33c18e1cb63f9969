// MIT License - Copyright (c) 2026 Peter Wright
// Status events pushed by the controller

use crate::constants::ObjectType;
use crate::devices::{AreaStatus, AudioZoneStatus, ThermostatStatus, UnitStatus, ZoneStatus};

/// One status update from the controller's push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    Unit(UnitStatus),
    Zone(ZoneStatus),
    Area(AreaStatus),
    Thermostat(ThermostatStatus),
    AudioZone(AudioZoneStatus),
}

impl StatusEvent {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Unit(_) => ObjectType::Unit,
            Self::Zone(_) => ObjectType::Zone,
            Self::Area(_) => ObjectType::Area,
            Self::Thermostat(_) => ObjectType::Thermostat,
            Self::AudioZone(_) => ObjectType::AudioZone,
        }
    }

    pub fn number(&self) -> u16 {
        match self {
            Self::Unit(s) => s.number,
            Self::Zone(s) => s.number,
            Self::Area(s) => s.number,
            Self::Thermostat(s) => s.number,
            Self::AudioZone(s) => s.number,
        }
    }

    /// Area context carried by the event, if any.
    pub fn area(&self) -> Option<u16> {
        match self {
            Self::Unit(s) => s.area,
            Self::Zone(s) => s.area,
            Self::Area(s) => Some(s.number),
            Self::Thermostat(s) => s.area,
            Self::AudioZone(_) => None,
        }
    }
}

/// Messages a transport pushes to the session outside request/response.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// A batch of object status notifications.
    Status(Vec<StatusEvent>),
    /// Raw codes of other event notifications (button presses, phone line, ...).
    Other(Vec<u16>),
    /// The link dropped underneath the session.
    Closed { reason: String },
}

/// Sender half handed to a transport when notifications are enabled.
pub type NotificationSender = tokio::sync::mpsc::Sender<TransportEvent>;

/// Receiver half drained by the session's delivery task.
pub type NotificationReceiver = tokio::sync::mpsc::Receiver<TransportEvent>;

/// Create a notification channel with the given capacity.
pub fn notification_channel(capacity: usize) -> (NotificationSender, NotificationReceiver) {
    tokio::sync::mpsc::channel(capacity)
}
