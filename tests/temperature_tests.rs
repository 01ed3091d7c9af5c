use besmart::{
    cent_to_fah, fah_to_cent, reading_to_units, units_to_deci, HvacMode, Season, Setpoint,
    TemperatureUnit, WorkMode,
};

#[test]
fn fahrenheit_to_celsius() {
    assert_eq!(fah_to_cent(32.0), 0.0);
    assert_eq!(fah_to_cent(68.0), 20.0);
    assert_eq!(fah_to_cent(67.1), 19.5);
    assert_eq!(fah_to_cent(14.0), -10.0);
}

#[test]
fn celsius_to_fahrenheit() {
    assert_eq!(cent_to_fah(0.0), 32.0);
    assert_eq!(cent_to_fah(19.5), 67.1);
    assert_eq!(cent_to_fah(5.0), 41.0);
    assert_eq!(cent_to_fah(-10.0), 14.0);
}

#[test]
fn readings_in_celsius() {
    assert_eq!(reading_to_units(195, TemperatureUnit::Celsius), 19.5);
    assert_eq!(reading_to_units(-35, TemperatureUnit::Celsius), -3.5);
}

#[test]
fn readings_in_fahrenheit() {
    assert_eq!(reading_to_units(200, TemperatureUnit::Fahrenheit), 68.0);
    assert_eq!(reading_to_units(50, TemperatureUnit::Fahrenheit), 41.0);
}

#[test]
fn writes_are_deci_celsius() {
    assert_eq!(units_to_deci(21.4, TemperatureUnit::Celsius), 214);
    assert_eq!(units_to_deci(-3.5, TemperatureUnit::Celsius), -35);
    assert_eq!(units_to_deci(41.0, TemperatureUnit::Fahrenheit), 50);
}

#[test]
fn conversion_round_trip_stays_within_a_deci_degree() {
    for deci in (-100..=300).step_by(7) {
        for unit in [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit] {
            let back = units_to_deci(reading_to_units(deci, unit), unit);
            assert!((back - deci).abs() <= 1, "{deci} -> {back} ({unit:?})");
        }
    }
}

#[test]
fn work_mode_table() {
    for (code, name) in [
        (0, "AUTO"),
        (1, "MANUAL"),
        (2, "ECO"),
        (3, "PARTY"),
        (4, "IDLE"),
        (5, "DHW"),
    ] {
        let mode = WorkMode::from_code(code).unwrap();
        assert_eq!(mode.code(), code);
        assert_eq!(mode.as_preset_str(), name);
        assert_eq!(name.parse::<WorkMode>().unwrap(), mode);
    }
    assert_eq!(WorkMode::from_code(6), None);
    assert_eq!(WorkMode::from_preset_str("ECONOMY"), Some(WorkMode::Economy));
    assert!(matches!(
        "HOLIDAY".parse::<WorkMode>(),
        Err(besmart::Error::InvalidPreset(_))
    ));
}

#[test]
fn season_and_hvac_mode() {
    assert_eq!(Season::from_winter_flag(1), Season::Heat);
    assert_eq!(Season::from_winter_flag(0), Season::Cool);
    assert_eq!(Season::from_winter_flag(7), Season::Cool);
    assert_eq!(HvacMode::from(Season::Heat), HvacMode::Heat);
    assert_eq!(Season::from(HvacMode::Cool).winter_flag(), 0);
    assert_eq!(HvacMode::from_host_str("heat"), Some(HvacMode::Heat));
    assert_eq!(HvacMode::from_host_str("auto"), None);
}

#[test]
fn setpoint_slots() {
    assert_eq!(Setpoint::Frost.as_field_str(), "t1");
    assert_eq!(Setpoint::Economy.as_field_str(), "t2");
    assert_eq!(Setpoint::Comfort.as_field_str(), "t3");
    for slot in [Setpoint::Frost, Setpoint::Economy, Setpoint::Comfort] {
        assert_eq!(Setpoint::from_index(slot.index()), Some(slot));
    }
    assert_eq!(Setpoint::from_index(0), None);
}

#[test]
fn unit_display() {
    assert_eq!(format!("{}", TemperatureUnit::Celsius), "\u{00b0}C");
    assert_eq!(TemperatureUnit::from_units_flag(1), TemperatureUnit::Fahrenheit);
    assert_eq!(TemperatureUnit::from_units_flag(0), TemperatureUnit::Celsius);
}
