//! Pure mapping from raw room records to the host-facing room view.
//!
//! The gateway always speaks deci-degrees Celsius. Conversion to the room's
//! display unit happens here and nowhere else.

use crate::record::RoomRecord;
use crate::types::{HvacAction, HvacMode, Season, Setpoint, TemperatureUnit, WorkMode};

const FUZZY_MATCH_DECI: u64 = 4;

/// Float noise tolerated before truncating to deci-degrees.
const SNAP_EPSILON: f64 = 1e-6;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn fah_to_cent(f: f64) -> f64 {
    round_tenth((f - 32.0) / 1.8)
}

pub fn cent_to_fah(c: f64) -> f64 {
    round_tenth(32.0 + c * 1.8)
}

pub fn reading_to_units(deci: i64, unit: TemperatureUnit) -> f64 {
    let celsius = deci as f64 / 10.0;
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => cent_to_fah(celsius),
    }
}

/// A value in `unit` back to wire deci-degrees Celsius, truncated.
pub fn units_to_deci(value: f64, unit: TemperatureUnit) -> i64 {
    let celsius = match unit {
        TemperatureUnit::Celsius => value,
        TemperatureUnit::Fahrenheit => fah_to_cent(value),
    };
    let scaled = celsius * 10.0;
    let nearest = scaled.round();
    if (scaled - nearest).abs() < SNAP_EPSILON {
        nearest as i64
    } else {
        scaled.trunc() as i64
    }
}

/// Work out which stored setpoint the thermostat is tracking. Exact matches
/// win over near matches; within each tier comfort beats economy beats
/// frost. Falls back to comfort.
pub fn infer_active_setpoint(settemp: i64, t1: i64, t2: i64, t3: i64) -> Setpoint {
    let candidates = [
        (Setpoint::Comfort, t3),
        (Setpoint::Economy, t2),
        (Setpoint::Frost, t1),
    ];

    if let Some((slot, _)) = candidates.iter().find(|(_, t)| *t == settemp) {
        return *slot;
    }
    candidates
        .iter()
        .find(|(_, t)| settemp.abs_diff(*t) <= FUZZY_MATCH_DECI)
        .map(|(slot, _)| *slot)
        .unwrap_or(Setpoint::Comfort)
}

/// Projected state of one room, temperatures in `unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomView {
    pub current_temp: f64,
    pub frost_t: f64,
    pub save_t: f64,
    pub comf_t: f64,
    pub set_temp: f64,
    pub unit: TemperatureUnit,
    pub mode_code: i64,
    pub work_mode: Option<WorkMode>,
    pub season: Season,
    pub heating_active: bool,
    pub active_setpoint: Setpoint,
    pub last_seen: i64,
}

impl RoomView {
    pub fn hvac_mode(&self) -> HvacMode {
        self.season.into()
    }

    /// `heating` is a generic "plant is driving this room" flag; its
    /// direction comes from the season.
    pub fn hvac_action(&self) -> HvacAction {
        match (self.heating_active, self.season) {
            (false, _) => HvacAction::Off,
            (true, Season::Heat) => HvacAction::Heating,
            (true, Season::Cool) => HvacAction::Cooling,
        }
    }

    pub fn preset_mode(&self) -> &'static str {
        self.work_mode.unwrap_or(WorkMode::Idle).as_preset_str()
    }

    pub fn setpoint(&self, slot: Setpoint) -> f64 {
        match slot {
            Setpoint::Frost => self.frost_t,
            Setpoint::Economy => self.save_t,
            Setpoint::Comfort => self.comf_t,
        }
    }
}

pub fn project(raw: &RoomRecord) -> RoomView {
    let unit = TemperatureUnit::from_units_flag(raw.units_flag());
    let mode_code = raw.mode_code();

    RoomView {
        current_temp: reading_to_units(raw.temp_deci(), unit),
        frost_t: reading_to_units(raw.setpoint_deci(Setpoint::Frost), unit),
        save_t: reading_to_units(raw.setpoint_deci(Setpoint::Economy), unit),
        comf_t: reading_to_units(raw.setpoint_deci(Setpoint::Comfort), unit),
        set_temp: reading_to_units(raw.settemp_deci(), unit),
        unit,
        mode_code,
        work_mode: WorkMode::from_code(mode_code),
        season: Season::from_winter_flag(raw.winter_flag()),
        heating_active: raw.heating_flag() == 1,
        active_setpoint: infer_active_setpoint(
            raw.settemp_deci(),
            raw.frost_deci(),
            raw.economy_deci(),
            raw.comfort_deci(),
        ),
        last_seen: raw.last_seen(),
    }
}

/// Project `raw` only if it is newer than `previous`. The first projection
/// always applies.
pub fn project_if_newer(previous: Option<&RoomView>, raw: &RoomRecord) -> Option<RoomView> {
    match previous {
        Some(prev) if raw.last_seen() <= prev.last_seen => None,
        _ => Some(project(raw)),
    }
}
