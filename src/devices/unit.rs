// MIT License - Copyright (c) 2026 Peter Wright
// Unit (light, load, flag) status

/// Decoded unit state byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    Off,
    On,
    /// Scene A-L, 1-based.
    Scene(u8),
    /// Dim step 1-9.
    Dim(u8),
    /// Brighten step 1-9.
    Brighten(u8),
    /// Level in percent, 0-100.
    Level(u8),
    Other(u8),
}

impl UnitState {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Off,
            1 => Self::On,
            2..=13 => Self::Scene(v - 1),
            17..=25 => Self::Dim(v - 16),
            33..=41 => Self::Brighten(v - 32),
            100..=200 => Self::Level(v - 100),
            other => Self::Other(other),
        }
    }

    /// Brightness in percent, when the state maps onto one.
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Off => Some(0),
            Self::On => Some(100),
            Self::Level(p) => Some(*p),
            _ => None,
        }
    }
}

/// Status of a single unit.
///
/// For flags the raw state byte is the flag's counter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStatus {
    pub number: u16,
    /// Area context, when the delivering message carries one.
    pub area: Option<u16>,
    pub state: u8,
    /// Seconds remaining on a timed command, 0 if none.
    pub time_remaining: u16,
}

impl UnitStatus {
    pub fn new(number: u16, state: u8) -> Self {
        Self {
            number,
            area: None,
            state,
            time_remaining: 0,
        }
    }

    pub fn in_area(mut self, area: u16) -> Self {
        self.area = Some(area);
        self
    }

    pub fn decoded(&self) -> UnitState {
        UnitState::from_u8(self.state)
    }

    pub fn is_on(&self) -> bool {
        !matches!(self.decoded(), UnitState::Off | UnitState::Level(0))
    }

    pub fn flag_value(&self) -> u8 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_state_decoding() {
        assert_eq!(UnitState::from_u8(0), UnitState::Off);
        assert_eq!(UnitState::from_u8(1), UnitState::On);
        assert_eq!(UnitState::from_u8(2), UnitState::Scene(1));
        assert_eq!(UnitState::from_u8(13), UnitState::Scene(12));
        assert_eq!(UnitState::from_u8(17), UnitState::Dim(1));
        assert_eq!(UnitState::from_u8(41), UnitState::Brighten(9));
        assert_eq!(UnitState::from_u8(100), UnitState::Level(0));
        assert_eq!(UnitState::from_u8(175), UnitState::Level(75));
        assert_eq!(UnitState::from_u8(200), UnitState::Level(100));
        assert_eq!(UnitState::from_u8(250), UnitState::Other(250));
    }

    #[test]
    fn test_unit_percent() {
        assert_eq!(UnitState::Off.percent(), Some(0));
        assert_eq!(UnitState::On.percent(), Some(100));
        assert_eq!(UnitState::Level(40).percent(), Some(40));
        assert_eq!(UnitState::Scene(3).percent(), None);
    }

    #[test]
    fn test_unit_status_on() {
        assert!(!UnitStatus::new(1, 0).is_on());
        assert!(UnitStatus::new(1, 1).is_on());
        assert!(!UnitStatus::new(1, 100).is_on());
        assert!(UnitStatus::new(1, 150).is_on());
        assert_eq!(UnitStatus::new(9, 42).flag_value(), 42);
        assert_eq!(UnitStatus::new(9, 42).in_area(2).area, Some(2));
    }
}
