// MIT License - Copyright (c) 2026 Peter Wright
// Controller constants: object types, unit types, command codes

/// Default TCP port of an Omni-Link II controller.
pub const DEFAULT_PORT: u16 = 4369;

/// Label given to area 1 when the controller reports it without a name.
pub const MAIN_AREA_LABEL: &str = "Main Area";

/// Model numbers reported by Lumina-family controllers.
pub const LUMINA_MODELS: [u8; 2] = [36, 37];

/// Highest area number that fits in the 64-bit area filter.
pub const MAX_FILTER_AREA: u16 = 64;

/// Object type codes used in property and status requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ObjectType {
    Zone = 1,
    Unit = 2,
    Button = 3,
    Area = 5,
    Thermostat = 6,
    AudioZone = 10,
    Console = 12,
}

impl ObjectType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Zone),
            2 => Some(Self::Unit),
            3 => Some(Self::Button),
            5 => Some(Self::Area),
            6 => Some(Self::Thermostat),
            10 => Some(Self::AudioZone),
            12 => Some(Self::Console),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zone => "zone",
            Self::Unit => "unit",
            Self::Button => "button",
            Self::Area => "area",
            Self::Thermostat => "thermostat",
            Self::AudioZone => "audio zone",
            Self::Console => "console",
        }
    }
}

/// Unit type codes from unit properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnitType {
    Standard = 1,
    Extended = 2,
    Compose = 3,
    Upb = 4,
    HlcRoom = 5,
    HlcLoad = 6,
    LuminaMode = 7,
    RadioRa = 8,
    Centralite = 9,
    ViziaRfRoom = 10,
    ViziaRfLoad = 11,
    Flag = 12,
    Output = 13,
    AudioZone = 14,
    AudioSource = 15,
}

impl UnitType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Standard),
            2 => Some(Self::Extended),
            3 => Some(Self::Compose),
            4 => Some(Self::Upb),
            5 => Some(Self::HlcRoom),
            6 => Some(Self::HlcLoad),
            7 => Some(Self::LuminaMode),
            8 => Some(Self::RadioRa),
            9 => Some(Self::Centralite),
            10 => Some(Self::ViziaRfRoom),
            11 => Some(Self::ViziaRfLoad),
            12 => Some(Self::Flag),
            13 => Some(Self::Output),
            14 => Some(Self::AudioZone),
            15 => Some(Self::AudioSource),
            _ => None,
        }
    }

    /// Room controllers anchor the load units numbered after them.
    pub fn is_room(self) -> bool {
        matches!(self, Self::HlcRoom | Self::ViziaRfRoom)
    }

    /// Load types that are exposed as dimmable/switchable units.
    pub fn is_supported_load(self) -> bool {
        matches!(self, Self::Upb | Self::HlcLoad)
    }
}

/// Controller command codes (first byte of a command message).
///
/// Parameter conventions follow the controller: `p1` is the value
/// (level, mode, counter) and `p2` is the object number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    UnitOff = 0,
    UnitOn = 1,
    AreaAllOff = 2,
    AreaAllOn = 3,
    BypassZone = 4,
    RestoreZone = 5,
    ExecuteButton = 7,
    UnitLevel = 9,
    UnitDecrementCounter = 12,
    UnitIncrementCounter = 13,
    SecurityDisarm = 48,
    SecurityDay = 49,
    SecurityNight = 50,
    SecurityAway = 51,
    SecurityVacation = 52,
    SecurityDayInstant = 53,
    SecurityNightDelayed = 54,
    ThermostatHeatSetpoint = 66,
    ThermostatCoolSetpoint = 67,
    ThermostatSystemMode = 68,
    ThermostatFanMode = 69,
    ThermostatHoldMode = 70,
    AudioZonePower = 112,
    AudioZoneVolume = 113,
    AudioZoneSource = 114,
}

impl CommandCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_codes() {
        for t in [
            ObjectType::Zone,
            ObjectType::Unit,
            ObjectType::Button,
            ObjectType::Area,
            ObjectType::Thermostat,
            ObjectType::AudioZone,
            ObjectType::Console,
        ] {
            assert_eq!(ObjectType::from_u8(t.code()), Some(t));
        }
        assert_eq!(ObjectType::from_u8(4), None);
    }

    #[test]
    fn test_unit_type_classes() {
        assert!(UnitType::HlcRoom.is_room());
        assert!(UnitType::ViziaRfRoom.is_room());
        assert!(!UnitType::HlcLoad.is_room());
        assert!(UnitType::Upb.is_supported_load());
        assert!(UnitType::HlcLoad.is_supported_load());
        assert!(!UnitType::Flag.is_supported_load());
        assert!(!UnitType::ViziaRfLoad.is_supported_load());
        assert_eq!(UnitType::from_u8(12), Some(UnitType::Flag));
        assert_eq!(UnitType::from_u8(0), None);
    }
}
