use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::types::Setpoint;

pub const DEFAULT_T1_DECI: i64 = 50;
pub const DEFAULT_T2_DECI: i64 = 160;
pub const DEFAULT_T3_DECI: i64 = 200;
pub const DEFAULT_TEMP_DECI: i64 = 200;
pub const DEFAULT_SETTEMP_DECI: i64 = 200;

/// Raw room record as returned by `GET devices/{id}`.
///
/// Every field is optional on the wire. Numbers may arrive as JSON numbers
/// or numeric strings; anything unparseable reads as absent so the
/// accessor falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RoomRecord {
    #[serde(default, deserialize_with = "lenient_int")]
    pub t1: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub t2: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub t3: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub temp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub settemp: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub units: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub mode: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub winter: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub heating: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub lastseen: Option<i64>,
}

impl RoomRecord {
    pub fn frost_deci(&self) -> i64 {
        self.t1.unwrap_or(DEFAULT_T1_DECI)
    }

    pub fn economy_deci(&self) -> i64 {
        self.t2.unwrap_or(DEFAULT_T2_DECI)
    }

    pub fn comfort_deci(&self) -> i64 {
        self.t3.unwrap_or(DEFAULT_T3_DECI)
    }

    pub fn setpoint_deci(&self, slot: Setpoint) -> i64 {
        match slot {
            Setpoint::Frost => self.frost_deci(),
            Setpoint::Economy => self.economy_deci(),
            Setpoint::Comfort => self.comfort_deci(),
        }
    }

    pub fn temp_deci(&self) -> i64 {
        self.temp.unwrap_or(DEFAULT_TEMP_DECI)
    }

    pub fn settemp_deci(&self) -> i64 {
        self.settemp.unwrap_or(DEFAULT_SETTEMP_DECI)
    }

    pub fn units_flag(&self) -> i64 {
        self.units.unwrap_or(0)
    }

    /// Work mode code, AUTO (0) when missing or not an integer.
    pub fn mode_code(&self) -> i64 {
        self.mode.unwrap_or(0)
    }

    pub fn winter_flag(&self) -> i64 {
        self.winter.unwrap_or(1)
    }

    pub fn heating_flag(&self) -> i64 {
        self.heating.unwrap_or(0)
    }

    pub fn last_seen(&self) -> i64 {
        self.lastseen.unwrap_or(0)
    }
}

fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(int_from_value))
}

pub(crate) fn int_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Full device payload from one successful fetch. Replaced whole on every
/// refresh, never mutated.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub device_id: String,
    pub rooms: BTreeMap<String, RoomRecord>,
    pub last_update: DateTime<Utc>,
    pub(crate) raw_rooms: Map<String, Value>,
}

impl DeviceSnapshot {
    pub fn room(&self, room_id: &str) -> Option<&RoomRecord> {
        self.rooms.get(room_id)
    }

    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_use_defaults() {
        let rec: RoomRecord = serde_json::from_value(json!({})).unwrap();
        assert_eq!(rec.frost_deci(), 50);
        assert_eq!(rec.economy_deci(), 160);
        assert_eq!(rec.comfort_deci(), 200);
        assert_eq!(rec.temp_deci(), 200);
        assert_eq!(rec.settemp_deci(), 200);
        assert_eq!(rec.units_flag(), 0);
        assert_eq!(rec.mode_code(), 0);
        assert_eq!(rec.winter_flag(), 1);
        assert_eq!(rec.heating_flag(), 0);
        assert_eq!(rec.last_seen(), 0);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let rec: RoomRecord =
            serde_json::from_value(json!({"mode": "1", "temp": "195", "lastseen": 7})).unwrap();
        assert_eq!(rec.mode_code(), 1);
        assert_eq!(rec.temp_deci(), 195);
        assert_eq!(rec.last_seen(), 7);
    }

    #[test]
    fn garbage_values_fall_back() {
        let rec: RoomRecord = serde_json::from_value(json!({
            "mode": "party",
            "t3": "warm",
            "temp": null,
            "t1": [1, 2],
            "settemp": 201.7
        }))
        .unwrap();
        assert_eq!(rec.mode_code(), 0);
        assert_eq!(rec.comfort_deci(), 200);
        assert_eq!(rec.temp_deci(), 200);
        assert_eq!(rec.frost_deci(), 50);
        assert_eq!(rec.settemp_deci(), 201);
    }

    #[test]
    fn unknown_fields_ignored() {
        let rec: RoomRecord =
            serde_json::from_value(json!({"t3": 210, "programWeek": [[1, 2]], "bat": "0"})).unwrap();
        assert_eq!(rec.comfort_deci(), 210);
    }
}
