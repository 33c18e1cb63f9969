// MIT License - Copyright (c) 2026 Peter Wright
// Audio zone status

/// Status of an audio zone. Audio zones are not area-scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioZoneStatus {
    pub number: u16,
    pub power: bool,
    pub source: u8,
    /// Volume in percent, 0-100.
    pub volume: u8,
    pub mute: bool,
}

impl AudioZoneStatus {
    pub fn new(number: u16) -> Self {
        Self {
            number,
            power: false,
            source: 0,
            volume: 0,
            mute: false,
        }
    }

    /// Powered, unmuted and above zero volume.
    pub fn is_audible(&self) -> bool {
        self.power && !self.mute && self.volume > 0
    }
}
