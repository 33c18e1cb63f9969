// MIT License - Copyright (c) 2026 Peter Wright
// Device registry and status notification routing

use std::error::Error;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, error, warn};

use crate::constants::ObjectType;
use crate::devices::{AreaStatus, AudioZoneStatus, ThermostatStatus, UnitStatus, ZoneStatus};
use crate::event::StatusEvent;

/// Outcome of a target handling one status update.
pub type TargetResult = Result<(), Box<dyn Error + Send + Sync>>;

pub trait UnitTarget: Send + Sync {
    fn handle_unit_status(&self, status: &UnitStatus) -> TargetResult;
}

pub trait ZoneTarget: Send + Sync {
    fn handle_zone_status(&self, status: &ZoneStatus) -> TargetResult;
}

pub trait AreaTarget: Send + Sync {
    fn handle_area_status(&self, status: &AreaStatus) -> TargetResult;
}

pub trait ThermostatTarget: Send + Sync {
    fn handle_thermostat_status(&self, status: &ThermostatStatus) -> TargetResult;
}

pub trait AudioZoneTarget: Send + Sync {
    fn handle_audio_zone_status(&self, status: &AudioZoneStatus) -> TargetResult;
}

/// The kinds of object a target can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Unit,
    Zone,
    Area,
    Thermostat,
    AudioZone,
}

impl TargetKind {
    pub fn of(event: &StatusEvent) -> Self {
        match event {
            StatusEvent::Unit(_) => Self::Unit,
            StatusEvent::Zone(_) => Self::Zone,
            StatusEvent::Area(_) => Self::Area,
            StatusEvent::Thermostat(_) => Self::Thermostat,
            StatusEvent::AudioZone(_) => Self::AudioZone,
        }
    }

    pub fn object_type(self) -> ObjectType {
        match self {
            Self::Unit => ObjectType::Unit,
            Self::Zone => ObjectType::Zone,
            Self::Area => ObjectType::Area,
            Self::Thermostat => ObjectType::Thermostat,
            Self::AudioZone => ObjectType::AudioZone,
        }
    }

    pub fn from_object_type(object_type: ObjectType) -> Option<Self> {
        match object_type {
            ObjectType::Unit => Some(Self::Unit),
            ObjectType::Zone => Some(Self::Zone),
            ObjectType::Area => Some(Self::Area),
            ObjectType::Thermostat => Some(Self::Thermostat),
            ObjectType::AudioZone => Some(Self::AudioZone),
            ObjectType::Button | ObjectType::Console => None,
        }
    }
}

/// A host-side device representation that receives status updates.
#[derive(Clone)]
pub enum Target {
    Unit(Arc<dyn UnitTarget>),
    Zone(Arc<dyn ZoneTarget>),
    Area(Arc<dyn AreaTarget>),
    Thermostat(Arc<dyn ThermostatTarget>),
    AudioZone(Arc<dyn AudioZoneTarget>),
}

impl Target {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Unit(_) => TargetKind::Unit,
            Self::Zone(_) => TargetKind::Zone,
            Self::Area(_) => TargetKind::Area,
            Self::Thermostat(_) => TargetKind::Thermostat,
            Self::AudioZone(_) => TargetKind::AudioZone,
        }
    }

    fn deliver(&self, event: &StatusEvent) -> TargetResult {
        match (self, event) {
            (Self::Unit(t), StatusEvent::Unit(s)) => t.handle_unit_status(s),
            (Self::Zone(t), StatusEvent::Zone(s)) => t.handle_zone_status(s),
            (Self::Area(t), StatusEvent::Area(s)) => t.handle_area_status(s),
            (Self::Thermostat(t), StatusEvent::Thermostat(s)) => t.handle_thermostat_status(s),
            (Self::AudioZone(t), StatusEvent::AudioZone(s)) => t.handle_audio_zone_status(s),
            _ => Err(format!(
                "{:?} target cannot take a {} status",
                self.kind(),
                event.object_type().as_str()
            )
            .into()),
        }
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target::{:?}", self.kind())
    }
}

/// A target bound to one object number.
#[derive(Debug, Clone)]
pub struct Registration {
    pub number: u16,
    /// Owning area, when the host knows it.
    pub area: Option<u16>,
    pub target: Target,
}

/// Registered targets, keyed by kind and object number.
///
/// Areas live in their own table. At most one target exists per key; a
/// second registration replaces the first and is counted as a conflict.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: DashMap<(TargetKind, u16), Registration>,
    areas: DashMap<u16, Registration>,
    conflicts: AtomicU64,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `target` to object `number`. Returns the registration it
    /// replaced, if any.
    pub fn register(&self, number: u16, area: Option<u16>, target: Target) -> Option<Registration> {
        let kind = target.kind();
        let registration = Registration {
            number,
            area,
            target,
        };
        let previous = match kind {
            TargetKind::Area => self.areas.insert(number, registration),
            _ => self.devices.insert((kind, number), registration),
        };
        match &previous {
            Some(old) => {
                self.conflicts.fetch_add(1, Ordering::Relaxed);
                warn!(
                    kind = ?kind,
                    number,
                    previous_area = ?old.area,
                    area = ?area,
                    "Duplicate registration, replacing previous target"
                );
            }
            None => debug!(kind = ?kind, number, "Registered target"),
        }
        previous
    }

    pub fn deregister(&self, kind: TargetKind, number: u16) -> Option<Registration> {
        let removed = match kind {
            TargetKind::Area => self.areas.remove(&number).map(|(_, r)| r),
            _ => self.devices.remove(&(kind, number)).map(|(_, r)| r),
        };
        if removed.is_some() {
            debug!(kind = ?kind, number, "Deregistered target");
        }
        removed
    }

    /// Clone out the registration for `(kind, number)`.
    pub fn lookup(&self, kind: TargetKind, number: u16) -> Option<Registration> {
        match kind {
            TargetKind::Area => self.areas.get(&number).map(|r| r.value().clone()),
            _ => self.devices.get(&(kind, number)).map(|r| r.value().clone()),
        }
    }

    pub fn len(&self) -> usize {
        self.devices.len() + self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registrations that replaced an existing one.
    pub fn conflicts(&self) -> u64 {
        self.conflicts.load(Ordering::Relaxed)
    }
}

/// Counts from dispatching one notification batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    /// No matching target, or the target belongs to another area.
    pub dropped: usize,
    /// The target returned an error or panicked.
    pub failed: usize,
}

enum Dispatch {
    Delivered,
    Dropped,
    Failed,
}

/// Routes status notifications to the registered target for each object.
#[derive(Default)]
pub struct NotificationRouter {
    registry: DeviceRegistry,
}

impl NotificationRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Dispatch every event in `batch`, in order.
    ///
    /// A failing or panicking target does not stop the rest of the batch.
    pub fn on_notification(&self, batch: &[StatusEvent]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for event in batch {
            match self.dispatch(event) {
                Dispatch::Delivered => report.delivered += 1,
                Dispatch::Dropped => report.dropped += 1,
                Dispatch::Failed => report.failed += 1,
            }
        }
        report
    }

    fn dispatch(&self, event: &StatusEvent) -> Dispatch {
        let kind = TargetKind::of(event);
        let number = event.number();

        // Clone the target out so no map shard is locked while it runs
        let Some(registration) = self.registry.lookup(kind, number) else {
            debug!(kind = ?kind, number, "No target registered, dropping status");
            return Dispatch::Dropped;
        };

        if kind != TargetKind::Area {
            if let (Some(event_area), Some(registered_area)) = (event.area(), registration.area) {
                if event_area != registered_area {
                    debug!(
                        kind = ?kind,
                        number,
                        event_area,
                        registered_area,
                        "Status belongs to another area, dropping"
                    );
                    return Dispatch::Dropped;
                }
            }
        }

        match catch_unwind(AssertUnwindSafe(|| registration.target.deliver(event))) {
            Ok(Ok(())) => Dispatch::Delivered,
            Ok(Err(e)) => {
                warn!(kind = ?kind, number, "Target failed to handle status: {}", e);
                Dispatch::Failed
            }
            Err(_) => {
                error!(kind = ?kind, number, "Target panicked while handling status");
                Dispatch::Failed
            }
        }
    }
}
