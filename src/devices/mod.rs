// MIT License - Copyright (c) 2026 Peter Wright
// Per-kind status payloads delivered by the controller

pub mod area;
pub mod audio;
pub mod thermostat;
pub mod unit;
pub mod zone;

pub use area::{AreaAlarms, AreaStatus, SecurityMode};
pub use audio::AudioZoneStatus;
pub use thermostat::{FanMode, HoldMode, ThermostatMode, ThermostatStatus};
pub use unit::{UnitState, UnitStatus};
pub use zone::{LatchedAlarm, ZoneArming, ZoneCondition, ZoneStatus};
