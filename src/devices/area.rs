// MIT License - Copyright (c) 2026 Peter Wright
// Area (security partition) status

use bitflags::bitflags;

bitflags! {
    /// Active alarms in an area, one bit per alarm type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AreaAlarms: u8 {
        const BURGLARY    = 0b0000_0001;
        const FIRE        = 0b0000_0010;
        const GAS         = 0b0000_0100;
        const AUXILIARY   = 0b0000_1000;
        const FREEZE      = 0b0001_0000;
        const WATER       = 0b0010_0000;
        const DURESS      = 0b0100_0000;
        const TEMPERATURE = 0b1000_0000;
    }
}

impl AreaAlarms {
    /// Human-readable names of the alarms that became active.
    pub fn raised_names(old: Self, new: Self) -> Vec<&'static str> {
        let raised = new & !old;
        let mut names = Vec::new();
        if raised.contains(Self::BURGLARY) { names.push("Burglary"); }
        if raised.contains(Self::FIRE) { names.push("Fire"); }
        if raised.contains(Self::GAS) { names.push("Gas"); }
        if raised.contains(Self::AUXILIARY) { names.push("Auxiliary"); }
        if raised.contains(Self::FREEZE) { names.push("Freeze"); }
        if raised.contains(Self::WATER) { names.push("Water"); }
        if raised.contains(Self::DURESS) { names.push("Duress"); }
        if raised.contains(Self::TEMPERATURE) { names.push("Temperature"); }
        names
    }
}

/// Security mode of an area.
///
/// Omni and Lumina share the numeric range; Lumina names the modes
/// Home/Sleep/Away/Vacation/Party/Special.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityMode {
    Off,
    Day,
    Night,
    Away,
    Vacation,
    DayInstant,
    NightDelayed,
    Other(u8),
}

impl SecurityMode {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Off,
            1 => Self::Day,
            2 => Self::Night,
            3 => Self::Away,
            4 => Self::Vacation,
            5 => Self::DayInstant,
            6 => Self::NightDelayed,
            other => Self::Other(other),
        }
    }
}

/// Status of an area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AreaStatus {
    pub number: u16,
    pub mode: u8,
    pub alarms: AreaAlarms,
    pub entry_timer: u8,
    pub exit_timer: u8,
}

impl AreaStatus {
    pub fn new(number: u16, mode: u8) -> Self {
        Self {
            number,
            mode,
            alarms: AreaAlarms::empty(),
            entry_timer: 0,
            exit_timer: 0,
        }
    }

    /// Modes above 8 report an arming delay in progress for `mode - 8`.
    pub fn is_arming(&self) -> bool {
        self.mode > 8
    }

    pub fn security_mode(&self) -> SecurityMode {
        if self.is_arming() {
            SecurityMode::from_u8(self.mode - 8)
        } else {
            SecurityMode::from_u8(self.mode)
        }
    }

    pub fn in_alarm(&self) -> bool {
        !self.alarms.is_empty()
    }
}
