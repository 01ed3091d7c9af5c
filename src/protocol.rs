use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::warn;

use crate::record::RoomRecord;
use crate::types::Setpoint;
use crate::{Error, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub fn device_path(device_id: &str) -> String {
    format!("devices/{device_id}")
}

pub fn room_mode_path(device_id: &str, room_id: &str) -> String {
    format!("devices/{device_id}/rooms/{room_id}/mode")
}

pub fn room_setpoint_path(device_id: &str, room_id: &str, slot: Setpoint) -> String {
    format!(
        "devices/{device_id}/rooms/{room_id}/{}",
        slot.as_field_str()
    )
}

/// PUT bodies are the bare decimal integer, sent as `application/json`.
pub fn encode_int_body(value: i64) -> String {
    value.to_string()
}

#[derive(Debug, Default)]
pub(crate) struct ParsedDevice {
    pub rooms: BTreeMap<String, RoomRecord>,
    pub raw_rooms: Map<String, Value>,
}

/// Parse a `GET devices/{id}` body. A missing `rooms` key reads as an empty
/// device; a room entry that is not an object is dropped.
pub(crate) fn parse_device_response(body: &Value) -> Result<ParsedDevice> {
    let obj = body
        .as_object()
        .ok_or_else(|| Error::Protocol("device response is not an object".to_string()))?;

    let raw_rooms = match obj.get("rooms") {
        None | Some(Value::Null) => return Ok(ParsedDevice::default()),
        Some(Value::Object(rooms)) => rooms,
        Some(other) => {
            return Err(Error::Protocol(format!(
                "rooms is not an object: {other}"
            )));
        }
    };

    let mut parsed = ParsedDevice::default();
    for (room_id, raw) in raw_rooms {
        if !raw.is_object() {
            warn!(room = %room_id, "dropping malformed room entry");
            continue;
        }
        let record: RoomRecord = serde_json::from_value(raw.clone())?;
        parsed.rooms.insert(room_id.clone(), record);
        parsed.raw_rooms.insert(room_id.clone(), raw.clone());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_paths() {
        assert_eq!(device_path("D1"), "devices/D1");
        assert_eq!(room_mode_path("D1", "R1"), "devices/D1/rooms/R1/mode");
        assert_eq!(
            room_setpoint_path("D1", "R1", Setpoint::Frost),
            "devices/D1/rooms/R1/t1"
        );
        assert_eq!(
            room_setpoint_path("D1", "R1", Setpoint::Economy),
            "devices/D1/rooms/R1/t2"
        );
        assert_eq!(
            room_setpoint_path("D1", "R1", Setpoint::Comfort),
            "devices/D1/rooms/R1/t3"
        );
    }

    #[test]
    fn int_body_is_plain_decimal() {
        assert_eq!(encode_int_body(214), "214");
        assert_eq!(encode_int_body(-35), "-35");
    }

    #[test]
    fn parse_rooms() {
        let body = json!({"rooms": {
            "R1": {"t3": 200, "temp": 195, "mode": "1"},
            "R2": {"t3": 210}
        }});
        let parsed = parse_device_response(&body).unwrap();
        assert_eq!(parsed.rooms.len(), 2);
        assert_eq!(parsed.rooms["R1"].temp_deci(), 195);
        assert_eq!(parsed.rooms["R1"].mode_code(), 1);
        assert_eq!(parsed.raw_rooms["R2"]["t3"], 210);
    }

    #[test]
    fn parse_missing_rooms_is_empty() {
        let parsed = parse_device_response(&json!({"deviceId": "D1"})).unwrap();
        assert!(parsed.rooms.is_empty());
    }

    #[test]
    fn parse_drops_non_object_rooms() {
        let body = json!({"rooms": {"R1": {"t3": 200}, "R2": null, "R3": 5}});
        let parsed = parse_device_response(&body).unwrap();
        assert_eq!(parsed.rooms.len(), 1);
        assert!(parsed.rooms.contains_key("R1"));
    }

    #[test]
    fn parse_rejects_non_object_body() {
        let err = parse_device_response(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        let err = parse_device_response(&json!({"rooms": [1]})).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
