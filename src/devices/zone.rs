// MIT License - Copyright (c) 2026 Peter Wright
// Zone (sensor input) status

/// Current condition, bits 0-1 of the zone status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneCondition {
    Secure,
    NotReady,
    Trouble,
    Tamper,
}

/// Latched alarm state, bits 2-3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchedAlarm {
    Secure,
    Tripped,
    /// Reset, but previously tripped.
    Reset,
    Unknown,
}

/// Arming state, bits 4-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneArming {
    Disarmed,
    Armed,
    BypassedByUser,
    BypassedBySystem,
}

/// Status of a single zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneStatus {
    pub number: u16,
    pub area: Option<u16>,
    pub status: u8,
    /// Analog loop reading, 0-255.
    pub loop_reading: u8,
}

impl ZoneStatus {
    pub fn new(number: u16, status: u8) -> Self {
        Self {
            number,
            area: None,
            status,
            loop_reading: 0,
        }
    }

    pub fn in_area(mut self, area: u16) -> Self {
        self.area = Some(area);
        self
    }

    pub fn condition(&self) -> ZoneCondition {
        match self.status & 0b11 {
            0 => ZoneCondition::Secure,
            1 => ZoneCondition::NotReady,
            2 => ZoneCondition::Trouble,
            _ => ZoneCondition::Tamper,
        }
    }

    pub fn latched(&self) -> LatchedAlarm {
        match (self.status >> 2) & 0b11 {
            0 => LatchedAlarm::Secure,
            1 => LatchedAlarm::Tripped,
            2 => LatchedAlarm::Reset,
            _ => LatchedAlarm::Unknown,
        }
    }

    pub fn arming(&self) -> ZoneArming {
        match (self.status >> 4) & 0b11 {
            0 => ZoneArming::Disarmed,
            1 => ZoneArming::Armed,
            2 => ZoneArming::BypassedByUser,
            _ => ZoneArming::BypassedBySystem,
        }
    }

    pub fn is_open(&self) -> bool {
        self.condition() != ZoneCondition::Secure
    }

    pub fn is_bypassed(&self) -> bool {
        matches!(
            self.arming(),
            ZoneArming::BypassedByUser | ZoneArming::BypassedBySystem
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_secure() {
        let z = ZoneStatus::new(1, 0);
        assert_eq!(z.condition(), ZoneCondition::Secure);
        assert_eq!(z.latched(), LatchedAlarm::Secure);
        assert_eq!(z.arming(), ZoneArming::Disarmed);
        assert!(!z.is_open());
        assert!(!z.is_bypassed());
    }

    #[test]
    fn test_zone_bit_fields() {
        // not ready, tripped, armed
        let z = ZoneStatus::new(3, 0b01_01_01);
        assert_eq!(z.condition(), ZoneCondition::NotReady);
        assert_eq!(z.latched(), LatchedAlarm::Tripped);
        assert_eq!(z.arming(), ZoneArming::Armed);
        assert!(z.is_open());

        // tamper, reset, bypassed by system
        let z = ZoneStatus::new(3, 0b11_10_11);
        assert_eq!(z.condition(), ZoneCondition::Tamper);
        assert_eq!(z.latched(), LatchedAlarm::Reset);
        assert_eq!(z.arming(), ZoneArming::BypassedBySystem);
        assert!(z.is_bypassed());
    }
}
