// MIT License - Copyright (c) 2026 Peter Wright
// Topology discovery: areas, then per-area buttons, units, zones, thermostats

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::constants::{MAIN_AREA_LABEL, ObjectType, UnitType};
use crate::cursor::ObjectCursor;
use crate::error::{BridgeError, OperationError, Result};
use crate::filter::{ObjectFilter, filter_for_area};
use crate::protocol::ObjectRecord;
use crate::session::Session;

/// Controller product line, which decides how areas are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerFamily {
    Omni,
    Lumina,
}

/// What a discovered object should be materialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Area(ControllerFamily),
    RoomController,
    Flag,
    LoadUnit,
    Zone,
    Button,
    Thermostat,
    AudioZone,
}

impl DeviceKind {
    /// Stable type identifier for the host.
    pub fn thing_type(&self) -> &'static str {
        match self {
            Self::Area(ControllerFamily::Omni) => "omni_area",
            Self::Area(ControllerFamily::Lumina) => "lumina_area",
            Self::RoomController => "room",
            Self::Flag => "flag",
            Self::LoadUnit => "upb",
            Self::Zone => "zone",
            Self::Button => "button",
            Self::Thermostat => "thermostat",
            Self::AudioZone => "audio_zone",
        }
    }
}

/// One device found during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    pub number: u16,
    /// Owning area; `None` for audio zones.
    pub area: Option<u16>,
    /// Object name as stored in the controller.
    pub name: String,
    /// Display label, which may differ from the name.
    pub label: String,
    /// Room controller a load unit belongs to.
    pub parent_room: Option<u16>,
}

impl DeviceDescriptor {
    fn from_record(kind: DeviceKind, record: &ObjectRecord, area: Option<u16>) -> Self {
        Self {
            kind,
            number: record.number,
            area,
            name: record.name.clone(),
            label: record.name.clone(),
            parent_room: None,
        }
    }

    pub fn thing_type(&self) -> &'static str {
        self.kind.thing_type()
    }

    /// Properties attached to the host's representation.
    pub fn properties(&self) -> BTreeMap<&'static str, String> {
        let mut properties = BTreeMap::new();
        properties.insert("number", self.number.to_string());
        properties.insert("name", self.name.clone());
        if let Some(area) = self.area {
            properties.insert("area", area.to_string());
        }
        properties
    }
}

/// Receives descriptors as a scan produces them.
pub trait DeviceSink: Send + Sync {
    fn device_discovered(&self, descriptor: &DeviceDescriptor);
}

impl<F> DeviceSink for F
where
    F: Fn(&DeviceDescriptor) + Send + Sync,
{
    fn device_discovered(&self, descriptor: &DeviceDescriptor) {
        self(descriptor)
    }
}

/// Enumerates the controller's objects into device descriptors.
pub struct DiscoveryEngine {
    session: Session,
    scanning: AtomicBool,
}

struct ScanGuard<'a>(&'a AtomicBool);

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DiscoveryEngine {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            scanning: AtomicBool::new(false),
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Run a full scan, streaming each descriptor to `sink` and returning
    /// them all in the same order.
    ///
    /// A failing category is logged and skipped. Losing the controller
    /// aborts the scan and marks the session failed.
    pub async fn scan(&self, sink: &dyn DeviceSink) -> Result<Vec<DeviceDescriptor>> {
        if self.scanning.swap(true, Ordering::AcqRel) {
            return Err(BridgeError::ScanInProgress);
        }
        let _guard = ScanGuard(&self.scanning);

        let mut scan = Scan {
            session: &self.session,
            sink,
            found: Vec::new(),
        };
        match scan.run().await {
            Ok(()) => {
                info!("Discovery completed: {} device(s)", scan.found.len());
                Ok(scan.found)
            }
            Err(e) => {
                self.session.mark_failed(&e.to_string());
                error!("Discovery aborted: {}", e);
                Err(e.into())
            }
        }
    }
}

struct Scan<'a> {
    session: &'a Session,
    sink: &'a dyn DeviceSink,
    found: Vec<DeviceDescriptor>,
}

impl Scan<'_> {
    fn emit(&mut self, descriptor: DeviceDescriptor) {
        self.sink.device_discovered(&descriptor);
        self.found.push(descriptor);
    }

    /// Keep going after a category failure unless the controller is gone.
    fn category_result(
        &self,
        category: &str,
        area: Option<u16>,
        result: std::result::Result<(), OperationError>,
    ) -> std::result::Result<(), OperationError> {
        match result {
            Err(e) if e.indicates_offline() => Err(e),
            Err(e) => {
                warn!(area = ?area, "Received error during {} discovery: {}", category, e);
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    async fn run(&mut self) -> std::result::Result<(), OperationError> {
        debug!("Starting device discovery");

        let family = match self.session.system_information().await {
            Ok(info) => {
                info!(
                    "Controller model {} firmware {}",
                    info.model,
                    info.version()
                );
                if info.is_lumina() {
                    ControllerFamily::Lumina
                } else {
                    ControllerFamily::Omni
                }
            }
            Err(e) if e.indicates_offline() => return Err(e),
            Err(e) => {
                warn!("Could not read system information, assuming Omni: {}", e);
                ControllerFamily::Omni
            }
        };

        let mut areas = Vec::new();
        let result = self.discover_areas(family, &mut areas).await;
        self.category_result("area", None, result)?;

        for area in areas {
            let mask = match filter_for_area(area) {
                Ok(mask) => mask,
                Err(e) => {
                    warn!("Skipping area {}: {}", area, e);
                    continue;
                }
            };

            let result = self
                .discover_simple(ObjectType::Button, DeviceKind::Button, area, mask)
                .await;
            self.category_result("button", Some(area), result)?;

            let result = self.discover_units(area, mask).await;
            self.category_result("unit", Some(area), result)?;

            let result = self
                .discover_simple(ObjectType::Zone, DeviceKind::Zone, area, mask)
                .await;
            self.category_result("zone", Some(area), result)?;

            let result = self
                .discover_simple(ObjectType::Thermostat, DeviceKind::Thermostat, area, mask)
                .await;
            self.category_result("thermostat", Some(area), result)?;
        }

        let result = self.discover_audio_zones().await;
        self.category_result("audio zone", None, result)?;
        Ok(())
    }

    async fn discover_areas(
        &mut self,
        family: ControllerFamily,
        areas: &mut Vec<u16>,
    ) -> std::result::Result<(), OperationError> {
        let mut cursor = ObjectCursor::open(self.session, ObjectType::Area, ObjectFilter::new());
        while let Some(record) = cursor.next().await? {
            let name = if record.is_named() {
                record.name.clone()
            } else if record.number == 1 {
                MAIN_AREA_LABEL.to_string()
            } else {
                // Areas are numbered contiguously; an unnamed one ends the list
                debug!("Area {} has no name, ending area discovery", record.number);
                break;
            };

            self.emit(DeviceDescriptor {
                kind: DeviceKind::Area(family),
                number: record.number,
                area: Some(record.number),
                label: name.clone(),
                name,
                parent_room: None,
            });
            areas.push(record.number);
        }
        Ok(())
    }

    async fn discover_simple(
        &mut self,
        object_type: ObjectType,
        kind: DeviceKind,
        area: u16,
        mask: u64,
    ) -> std::result::Result<(), OperationError> {
        let filter = ObjectFilter::new().named().area_mask(mask);
        let mut cursor = ObjectCursor::open(self.session, object_type, filter);
        while let Some(record) = cursor.next().await? {
            self.emit(DeviceDescriptor::from_record(kind, &record, Some(area)));
        }
        Ok(())
    }

    async fn discover_units(&mut self, area: u16, mask: u64) -> std::result::Result<(), OperationError> {
        let filter = ObjectFilter::new().named().any_load().area_mask(mask);
        let mut cursor = ObjectCursor::open(self.session, ObjectType::Unit, filter);

        // Units follow their room controller in number order
        let mut room: Option<(u16, String)> = None;

        while let Some(record) = cursor.next().await? {
            let Some(unit_type) = record.unit_type() else {
                debug!(
                    "Skipping unit {} with unknown type {:?}",
                    record.number,
                    record.unit_type_code()
                );
                continue;
            };

            if unit_type.is_room() {
                room = Some((record.number, record.name.clone()));
                self.emit(DeviceDescriptor::from_record(
                    DeviceKind::RoomController,
                    &record,
                    Some(area),
                ));
            } else if unit_type == UnitType::Flag {
                self.emit(DeviceDescriptor::from_record(DeviceKind::Flag, &record, Some(area)));
            } else if unit_type.is_supported_load() {
                let mut descriptor =
                    DeviceDescriptor::from_record(DeviceKind::LoadUnit, &record, Some(area));
                if let Some((room_number, room_name)) = &room {
                    descriptor.label = format!("{}: {}", room_name, record.name);
                    descriptor.parent_room = Some(*room_number);
                }
                self.emit(descriptor);
            } else {
                debug!("Skipping unit {} of unsupported type {:?}", record.number, unit_type);
            }
        }
        Ok(())
    }

    async fn discover_audio_zones(&mut self) -> std::result::Result<(), OperationError> {
        let mut cursor =
            ObjectCursor::open(self.session, ObjectType::AudioZone, ObjectFilter::new().named());
        while let Some(record) = cursor.next().await? {
            self.emit(DeviceDescriptor::from_record(DeviceKind::AudioZone, &record, None));
        }
        Ok(())
    }
}
