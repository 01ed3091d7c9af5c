use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{Error, Result};

/// Room work mode as reported in the `mode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkMode {
    Auto,
    Manual,
    Economy,
    Party,
    Idle,
    Dhw,
}

impl WorkMode {
    pub const ALL: [WorkMode; 6] = [
        WorkMode::Auto,
        WorkMode::Manual,
        WorkMode::Economy,
        WorkMode::Party,
        WorkMode::Idle,
        WorkMode::Dhw,
    ];

    pub fn code(&self) -> i64 {
        match self {
            WorkMode::Auto => 0,
            WorkMode::Manual => 1,
            WorkMode::Economy => 2,
            WorkMode::Party => 3,
            WorkMode::Idle => 4,
            WorkMode::Dhw => 5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(WorkMode::Auto),
            1 => Some(WorkMode::Manual),
            2 => Some(WorkMode::Economy),
            3 => Some(WorkMode::Party),
            4 => Some(WorkMode::Idle),
            5 => Some(WorkMode::Dhw),
            _ => None,
        }
    }

    /// Preset name shown to the host.
    pub fn as_preset_str(&self) -> &'static str {
        match self {
            WorkMode::Auto => "AUTO",
            WorkMode::Manual => "MANUAL",
            WorkMode::Economy => "ECO",
            WorkMode::Party => "PARTY",
            WorkMode::Idle => "IDLE",
            WorkMode::Dhw => "DHW",
        }
    }

    pub fn from_preset_str(s: &str) -> Option<Self> {
        match s {
            "AUTO" => Some(WorkMode::Auto),
            "MANUAL" => Some(WorkMode::Manual),
            "ECO" | "ECONOMY" => Some(WorkMode::Economy),
            "PARTY" => Some(WorkMode::Party),
            "IDLE" => Some(WorkMode::Idle),
            "DHW" => Some(WorkMode::Dhw),
            _ => None,
        }
    }
}

impl FromStr for WorkMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        WorkMode::from_preset_str(s).ok_or_else(|| Error::InvalidPreset(s.to_string()))
    }
}

/// Operating polarity of the plant: winter heats, summer cools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Season {
    #[default]
    Heat,
    Cool,
}

impl Season {
    pub fn from_winter_flag(winter: i64) -> Self {
        if winter == 1 { Season::Heat } else { Season::Cool }
    }

    pub fn winter_flag(&self) -> i64 {
        match self {
            Season::Heat => 1,
            Season::Cool => 0,
        }
    }
}

/// One of the three stored setpoints of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Setpoint {
    /// T1, anti-freeze minimum.
    Frost,
    /// T2, energy saving.
    Economy,
    /// T3, normal occupied.
    #[default]
    Comfort,
}

impl Setpoint {
    pub fn index(&self) -> u8 {
        match self {
            Setpoint::Frost => 1,
            Setpoint::Economy => 2,
            Setpoint::Comfort => 3,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Setpoint::Frost),
            2 => Some(Setpoint::Economy),
            3 => Some(Setpoint::Comfort),
            _ => None,
        }
    }

    /// Field name in the room record and last path segment of its endpoint.
    pub fn as_field_str(&self) -> &'static str {
        match self {
            Setpoint::Frost => "t1",
            Setpoint::Economy => "t2",
            Setpoint::Comfort => "t3",
        }
    }

    pub fn from_field_str(s: &str) -> Option<Self> {
        match s {
            "t1" => Some(Setpoint::Frost),
            "t2" => Some(Setpoint::Economy),
            "t3" => Some(Setpoint::Comfort),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_units_flag(units: i64) -> Self {
        if units == 1 {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    }

    pub fn units_flag(&self) -> i64 {
        match self {
            TemperatureUnit::Celsius => 0,
            TemperatureUnit::Fahrenheit => 1,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "\u{00b0}C",
            TemperatureUnit::Fahrenheit => "\u{00b0}F",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HvacMode {
    Heat,
    Cool,
}

impl HvacMode {
    pub fn as_host_str(&self) -> &'static str {
        match self {
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
        }
    }

    pub fn from_host_str(s: &str) -> Option<Self> {
        match s {
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            _ => None,
        }
    }
}

impl From<Season> for HvacMode {
    fn from(season: Season) -> Self {
        match season {
            Season::Heat => HvacMode::Heat,
            Season::Cool => HvacMode::Cool,
        }
    }
}

impl From<HvacMode> for Season {
    fn from(mode: HvacMode) -> Self {
        match mode {
            HvacMode::Heat => Season::Heat,
            HvacMode::Cool => Season::Cool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HvacAction {
    Heating,
    Cooling,
    #[default]
    Off,
}

impl HvacAction {
    pub fn as_host_str(&self) -> &'static str {
        match self {
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
            HvacAction::Off => "off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateEntityFeature {
    TargetTemperature,
    TargetTemperatureRange,
    PresetMode,
}

/// Events emitted when a refresh observes a changed room field.
/// Temperatures are raw deci-degrees Celsius as sent by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RoomTemperatureChanged { room_id: String, deci: i64 },
    RoomSetpointChanged { room_id: String, slot: Setpoint, deci: i64 },
    RoomModeChanged { room_id: String, mode: i64 },
    RoomSeasonChanged { room_id: String, season: Season },
    RoomHeatingChanged { room_id: String, active: bool },
    RoomValue { room_id: String, path: String, value: Value },
}
