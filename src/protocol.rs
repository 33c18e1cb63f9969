// MIT License - Copyright (c) 2026 Peter Wright
// Request/response types exchanged with the controller client

use crate::constants::{CommandCode, LUMINA_MODELS, ObjectType, UnitType};
use crate::event::StatusEvent;
use crate::filter::ObjectFilter;

/// Type-specific part of an object property record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectAttributes {
    Area { mode: u8 },
    Unit { unit_type: u8, status: u8 },
    Zone { zone_type: u8, options: u8 },
    Button,
    Thermostat { thermostat_type: u8 },
    AudioZone,
    Console,
}

impl ObjectAttributes {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Area { .. } => ObjectType::Area,
            Self::Unit { .. } => ObjectType::Unit,
            Self::Zone { .. } => ObjectType::Zone,
            Self::Button => ObjectType::Button,
            Self::Thermostat { .. } => ObjectType::Thermostat,
            Self::AudioZone => ObjectType::AudioZone,
            Self::Console => ObjectType::Console,
        }
    }
}

/// Snapshot of one object's properties from a single query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub number: u16,
    pub name: String,
    /// Owning area; 0 when the controller does not scope the object.
    pub area: u16,
    pub attributes: ObjectAttributes,
}

impl ObjectRecord {
    pub fn object_type(&self) -> ObjectType {
        self.attributes.object_type()
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }

    /// Raw unit type code, for unit records.
    pub fn unit_type_code(&self) -> Option<u8> {
        match self.attributes {
            ObjectAttributes::Unit { unit_type, .. } => Some(unit_type),
            _ => None,
        }
    }

    pub fn unit_type(&self) -> Option<UnitType> {
        self.unit_type_code().and_then(UnitType::from_u8)
    }

    pub fn area(number: u16, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            area: number,
            attributes: ObjectAttributes::Area { mode: 0 },
        }
    }

    pub fn unit(number: u16, name: impl Into<String>, area: u16, unit_type: UnitType) -> Self {
        Self {
            number,
            name: name.into(),
            area,
            attributes: ObjectAttributes::Unit {
                unit_type: unit_type as u8,
                status: 0,
            },
        }
    }

    pub fn zone(number: u16, name: impl Into<String>, area: u16) -> Self {
        Self {
            number,
            name: name.into(),
            area,
            attributes: ObjectAttributes::Zone {
                zone_type: 0,
                options: 0,
            },
        }
    }

    pub fn button(number: u16, name: impl Into<String>, area: u16) -> Self {
        Self {
            number,
            name: name.into(),
            area,
            attributes: ObjectAttributes::Button,
        }
    }

    pub fn thermostat(number: u16, name: impl Into<String>, area: u16) -> Self {
        Self {
            number,
            name: name.into(),
            area,
            attributes: ObjectAttributes::Thermostat { thermostat_type: 1 },
        }
    }

    pub fn audio_zone(number: u16, name: impl Into<String>) -> Self {
        Self {
            number,
            name: name.into(),
            area: 0,
            attributes: ObjectAttributes::AudioZone,
        }
    }
}

/// Model and firmware of the connected controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub model: u8,
    pub major: u8,
    pub minor: u8,
    pub revision: i8,
    pub phone: String,
}

impl SystemInfo {
    pub fn is_lumina(&self) -> bool {
        LUMINA_MODELS.contains(&self.model)
    }

    pub fn version(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.revision)
    }
}

/// A typed request to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Properties of the next object of `object_type` numbered after `after`.
    ObjectProperties {
        object_type: ObjectType,
        after: u16,
        filter: ObjectFilter,
    },
    /// Status of objects `start..=end`.
    ObjectStatus {
        object_type: ObjectType,
        start: u16,
        end: u16,
    },
    SystemInformation,
    Command { code: CommandCode, p1: u8, p2: u16 },
}

impl Request {
    pub fn describe(&self) -> String {
        match self {
            Request::ObjectProperties {
                object_type, after, ..
            } => format!("properties of {} after #{}", object_type.as_str(), after),
            Request::ObjectStatus {
                object_type,
                start,
                end,
            } => format!("status of {} #{}-#{}", object_type.as_str(), start, end),
            Request::SystemInformation => "system information".to_string(),
            Request::Command { code, p1, p2 } => format!("command {:?}({}, {})", code, p1, p2),
        }
    }
}

/// A typed response from the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ack,
    /// Negative acknowledgement; also used when no object matches.
    Nak,
    /// No further objects after the requested cursor.
    EndOfData,
    Properties(ObjectRecord),
    Statuses(Vec<StatusEvent>),
    SystemInformation(SystemInfo),
}

impl Response {
    pub fn kind(&self) -> &'static str {
        match self {
            Response::Ack => "ack",
            Response::Nak => "nak",
            Response::EndOfData => "end-of-data",
            Response::Properties(_) => "properties",
            Response::Statuses(_) => "statuses",
            Response::SystemInformation(_) => "system-information",
        }
    }
}
