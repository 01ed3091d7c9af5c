use serde_json::{Map, Value};

use crate::record::int_from_value;
use crate::types::*;

/// Collect `(path, old, new)` for every leaf in `current` that differs from
/// `previous`. Keys that disappeared are not reported.
pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None => {
                        if curr_val.is_object() {
                            diff_json(&Value::Object(Map::new()), curr_val, &path, changes);
                        } else {
                            changes.push((path, Value::Null, curr_val.clone()));
                        }
                    }
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

pub(crate) fn map_typed_event(room_id: &str, path: &str, new_value: &Value) -> Option<Event> {
    let room_id = room_id.to_string();
    match path {
        "temp" => Some(Event::RoomTemperatureChanged {
            room_id,
            deci: int_from_value(new_value)?,
        }),
        "t1" | "t2" | "t3" => Some(Event::RoomSetpointChanged {
            room_id,
            slot: Setpoint::from_field_str(path)?,
            deci: int_from_value(new_value)?,
        }),
        "mode" => Some(Event::RoomModeChanged {
            room_id,
            mode: int_from_value(new_value).unwrap_or(0),
        }),
        "winter" => Some(Event::RoomSeasonChanged {
            room_id,
            season: Season::from_winter_flag(int_from_value(new_value)?),
        }),
        "heating" => Some(Event::RoomHeatingChanged {
            room_id,
            active: int_from_value(new_value)? == 1,
        }),
        _ => None,
    }
}

pub(crate) fn generic_event(room_id: &str, path: &str, value: &Value) -> Option<Event> {
    if value.is_null() {
        return None;
    }
    Some(Event::RoomValue {
        room_id: room_id.to_string(),
        path: path.to_string(),
        value: value.clone(),
    })
}

/// Events for one room between two raw payloads. A room seen for the first
/// time diffs against an empty object.
pub(crate) fn room_events(room_id: &str, previous: Option<&Value>, current: &Value) -> Vec<Event> {
    let empty = Value::Object(Map::new());
    let mut changes = Vec::new();
    diff_json(previous.unwrap_or(&empty), current, "", &mut changes);

    changes
        .iter()
        .filter_map(|(path, _old, new_val)| {
            map_typed_event(room_id, path, new_val)
                .or_else(|| generic_event(room_id, path, new_val))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn diff_detects_leaf_change() {
        let prev = json!({"temp": 195, "t3": 200});
        let curr = json!({"temp": 197, "t3": 200});
        let mut changes = vec![];
        diff_json(&prev, &curr, "", &mut changes);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, "temp");
        assert_eq!(changes[0].1, json!(195));
        assert_eq!(changes[0].2, json!(197));
    }

    #[test]
    fn diff_ignores_unchanged() {
        let val = json!({"temp": 195, "settemp": 200});
        let mut changes = vec![];
        diff_json(&val, &val, "", &mut changes);
        assert!(changes.is_empty());
    }

    #[test]
    fn diff_walks_nested_objects() {
        let prev = json!({"extra": {}});
        let curr = json!({"extra": {"rssi": -60}});
        let mut changes = vec![];
        diff_json(&prev, &curr, "", &mut changes);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, "extra.rssi");
    }

    #[test]
    fn setpoint_change_emits_typed() {
        let prev = json!({"t1": 50, "t2": 160, "t3": 200});
        let curr = json!({"t1": 50, "t2": 160, "t3": 214});
        let events = room_events("R1", Some(&prev), &curr);
        assert_eq!(
            events,
            vec![Event::RoomSetpointChanged {
                room_id: "R1".into(),
                slot: Setpoint::Comfort,
                deci: 214,
            }]
        );
    }

    #[test]
    fn mode_string_is_decoded() {
        let event = map_typed_event("R1", "mode", &json!("3"));
        assert_eq!(
            event,
            Some(Event::RoomModeChanged { room_id: "R1".into(), mode: 3 })
        );
    }

    #[test]
    fn season_and_heating_events() {
        let prev = json!({"winter": 1, "heating": 0});
        let curr = json!({"winter": 0, "heating": 1});
        let events = room_events("R2", Some(&prev), &curr);
        assert!(events.contains(&Event::RoomSeasonChanged {
            room_id: "R2".into(),
            season: Season::Cool,
        }));
        assert!(events.contains(&Event::RoomHeatingChanged {
            room_id: "R2".into(),
            active: true,
        }));
    }

    #[test]
    fn unknown_field_emits_generic() {
        let events = room_events("R1", Some(&json!({"lastseen": 1})), &json!({"lastseen": 2}));
        match events.as_slice() {
            [Event::RoomValue { room_id, path, value }] => {
                assert_eq!(room_id, "R1");
                assert_eq!(path, "lastseen");
                assert_eq!(value, &json!(2));
            }
            other => panic!("expected one RoomValue, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_temperature_falls_back_to_generic() {
        let event = map_typed_event("R1", "temp", &json!("n/a"));
        assert!(event.is_none());
        let event = generic_event("R1", "temp", &json!("n/a"));
        assert!(matches!(event, Some(Event::RoomValue { .. })));
    }

    #[test]
    fn new_room_reports_every_field() {
        let events = room_events("R9", None, &json!({"temp": 200, "t3": 210, "lastseen": 4}));
        assert_eq!(events.len(), 3);
    }
}
