// MIT License - Copyright (c) 2026 Peter Wright
// Host-level device commands and their controller encoding

use crate::constants::{CommandCode, ObjectType};
use crate::devices::SecurityMode;
use crate::error::{BridgeError, Result};

/// A command a host entity can issue against one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    // Units
    On,
    Off,
    /// Brightness in percent, 0-100.
    Level(u8),
    /// Set a flag's value.
    SetFlag(u8),
    IncrementFlag,
    DecrementFlag,

    // Zones
    Bypass { code: u8 },
    Restore { code: u8 },

    // Buttons
    Press,

    // Areas
    AllOn,
    AllOff,
    /// Change security mode with the given user code index.
    Arm { mode: SecurityMode, code: u8 },

    // Thermostats, setpoints on the raw controller scale
    HeatSetpoint(u8),
    CoolSetpoint(u8),
    SystemMode(u8),
    FanMode(u8),
    HoldMode(u8),

    // Audio zones
    Power(bool),
    /// Volume in percent, 0-100.
    Volume(u8),
    Source(u8),
}

fn percent(value: u8) -> Result<u8> {
    if value > 100 {
        return Err(BridgeError::InvalidArgument(format!(
            "percentage {} outside 0..=100",
            value
        )));
    }
    Ok(value)
}

fn security_code(mode: SecurityMode) -> Result<CommandCode> {
    Ok(match mode {
        SecurityMode::Off => CommandCode::SecurityDisarm,
        SecurityMode::Day => CommandCode::SecurityDay,
        SecurityMode::Night => CommandCode::SecurityNight,
        SecurityMode::Away => CommandCode::SecurityAway,
        SecurityMode::Vacation => CommandCode::SecurityVacation,
        SecurityMode::DayInstant => CommandCode::SecurityDayInstant,
        SecurityMode::NightDelayed => CommandCode::SecurityNightDelayed,
        SecurityMode::Other(v) => {
            return Err(BridgeError::InvalidArgument(format!(
                "security mode {} cannot be requested",
                v
            )));
        }
    })
}

impl DeviceCommand {
    /// Encode as `(code, p1, p2)` for object `number` of `object_type`.
    pub fn encode(&self, object_type: ObjectType, number: u16) -> Result<(CommandCode, u8, u16)> {
        use DeviceCommand::*;

        if number == 0 {
            return Err(BridgeError::InvalidArgument(
                "object numbers start at 1".to_string(),
            ));
        }

        let (code, p1) = match (object_type, *self) {
            (ObjectType::Unit, On) => (CommandCode::UnitOn, 0),
            (ObjectType::Unit, Off) => (CommandCode::UnitOff, 0),
            (ObjectType::Unit, Level(level)) => (CommandCode::UnitLevel, percent(level)?),
            // Flags take their value through the unit-on parameter
            (ObjectType::Unit, SetFlag(value)) => (CommandCode::UnitOn, value),
            (ObjectType::Unit, IncrementFlag) => (CommandCode::UnitIncrementCounter, 0),
            (ObjectType::Unit, DecrementFlag) => (CommandCode::UnitDecrementCounter, 0),

            (ObjectType::Zone, Bypass { code }) => (CommandCode::BypassZone, code),
            (ObjectType::Zone, Restore { code }) => (CommandCode::RestoreZone, code),

            (ObjectType::Button, Press) => (CommandCode::ExecuteButton, 0),

            (ObjectType::Area, AllOn) => (CommandCode::AreaAllOn, 0),
            (ObjectType::Area, AllOff) => (CommandCode::AreaAllOff, 0),
            (ObjectType::Area, Arm { mode, code }) => (security_code(mode)?, code),

            (ObjectType::Thermostat, HeatSetpoint(v)) => (CommandCode::ThermostatHeatSetpoint, v),
            (ObjectType::Thermostat, CoolSetpoint(v)) => (CommandCode::ThermostatCoolSetpoint, v),
            (ObjectType::Thermostat, SystemMode(v)) => (CommandCode::ThermostatSystemMode, v),
            (ObjectType::Thermostat, FanMode(v)) => (CommandCode::ThermostatFanMode, v),
            (ObjectType::Thermostat, HoldMode(v)) => (CommandCode::ThermostatHoldMode, v),

            (ObjectType::AudioZone, Power(on)) => (CommandCode::AudioZonePower, u8::from(on)),
            (ObjectType::AudioZone, Volume(v)) => (CommandCode::AudioZoneVolume, percent(v)?),
            (ObjectType::AudioZone, Source(s)) => (CommandCode::AudioZoneSource, s),

            (object_type, command) => {
                return Err(BridgeError::InvalidArgument(format!(
                    "{:?} is not a {} command",
                    command,
                    object_type.as_str()
                )));
            }
        };
        Ok((code, p1, number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_uses_unit_on() {
        assert_eq!(
            DeviceCommand::SetFlag(7).encode(ObjectType::Unit, 40).unwrap(),
            (CommandCode::UnitOn, 7, 40)
        );
    }

    #[test]
    fn test_unit_commands() {
        assert_eq!(
            DeviceCommand::Level(55).encode(ObjectType::Unit, 3).unwrap(),
            (CommandCode::UnitLevel, 55, 3)
        );
        assert_eq!(
            DeviceCommand::Off.encode(ObjectType::Unit, 3).unwrap(),
            (CommandCode::UnitOff, 0, 3)
        );
        assert!(DeviceCommand::Level(101).encode(ObjectType::Unit, 3).is_err());
    }

    #[test]
    fn test_area_arming() {
        let cmd = DeviceCommand::Arm {
            mode: SecurityMode::Away,
            code: 1,
        };
        assert_eq!(
            cmd.encode(ObjectType::Area, 2).unwrap(),
            (CommandCode::SecurityAway, 1, 2)
        );
        let cmd = DeviceCommand::Arm {
            mode: SecurityMode::Other(9),
            code: 1,
        };
        assert!(cmd.encode(ObjectType::Area, 2).is_err());
    }

    #[test]
    fn test_mismatched_kind_rejected() {
        let err = DeviceCommand::Press.encode(ObjectType::Zone, 1).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert!(DeviceCommand::On.encode(ObjectType::Unit, 0).is_err());
    }
}
