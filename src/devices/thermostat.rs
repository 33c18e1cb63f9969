// MIT License - Copyright (c) 2026 Peter Wright
// Thermostat status

/// Convert the controller's temperature scale to degrees Celsius.
///
/// The scale is half-degree Celsius steps offset by 40.
pub fn omni_to_celsius(raw: u8) -> f32 {
    f32::from(raw) / 2.0 - 40.0
}

/// Convert the controller's temperature scale to whole degrees Fahrenheit.
pub fn omni_to_fahrenheit(raw: u8) -> i32 {
    (omni_to_celsius(raw) * 9.0 / 5.0 + 32.0).round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    Auto,
    EmergencyHeat,
    Other(u8),
}

impl ThermostatMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Off,
            1 => Self::Heat,
            2 => Self::Cool,
            3 => Self::Auto,
            4 => Self::EmergencyHeat,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    Auto,
    On,
    Cycle,
    Other(u8),
}

impl FanMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Auto,
            1 => Self::On,
            2 => Self::Cycle,
            other => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldMode {
    Off,
    Hold,
    Vacation,
    Other(u8),
}

impl HoldMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Off,
            1 | 255 => Self::Hold,
            2 => Self::Vacation,
            other => Self::Other(other),
        }
    }
}

/// Status of a thermostat. Temperatures are raw controller-scale values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatStatus {
    pub number: u16,
    pub area: Option<u16>,
    pub communicating: bool,
    pub temperature: u8,
    pub heat_setpoint: u8,
    pub cool_setpoint: u8,
    pub mode: u8,
    pub fan: u8,
    pub hold: u8,
}

impl ThermostatStatus {
    pub fn temperature_celsius(&self) -> f32 {
        omni_to_celsius(self.temperature)
    }

    pub fn temperature_fahrenheit(&self) -> i32 {
        omni_to_fahrenheit(self.temperature)
    }

    pub fn system_mode(&self) -> ThermostatMode {
        ThermostatMode::from_u8(self.mode)
    }

    pub fn fan_mode(&self) -> FanMode {
        FanMode::from_u8(self.fan)
    }

    pub fn hold_mode(&self) -> HoldMode {
        HoldMode::from_u8(self.hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_scale() {
        assert_eq!(omni_to_celsius(80), 0.0);
        assert_eq!(omni_to_celsius(124), 22.0);
        assert_eq!(omni_to_celsius(125), 22.5);
        assert_eq!(omni_to_fahrenheit(80), 32);
        assert_eq!(omni_to_fahrenheit(124), 72);
    }

    #[test]
    fn test_modes() {
        let t = ThermostatStatus {
            number: 1,
            area: None,
            communicating: true,
            temperature: 124,
            heat_setpoint: 120,
            cool_setpoint: 130,
            mode: 3,
            fan: 2,
            hold: 255,
        };
        assert_eq!(t.system_mode(), ThermostatMode::Auto);
        assert_eq!(t.fan_mode(), FanMode::Cycle);
        assert_eq!(t.hold_mode(), HoldMode::Hold);
        assert_eq!(t.temperature_celsius(), 22.0);
    }
}
