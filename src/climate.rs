use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::client::GatewayClient;
use crate::projection::{project_if_newer, units_to_deci, RoomView};
use crate::types::*;

const TARGET_TEMPERATURE_STEP: f64 = 0.2;

const HVAC_MODES: [HvacMode; 2] = [HvacMode::Cool, HvacMode::Heat];

const SUPPORTED_FEATURES: [ClimateEntityFeature; 3] = [
    ClimateEntityFeature::TargetTemperature,
    ClimateEntityFeature::TargetTemperatureRange,
    ClimateEntityFeature::PresetMode,
];

/// Arguments of a host "set temperature" call, in the room's unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureRequest {
    /// Routed to whichever setpoint is currently active.
    pub temperature: Option<f64>,
    pub target_temp_high: Option<f64>,
    pub target_temp_low: Option<f64>,
}

impl TemperatureRequest {
    pub fn single(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    pub fn range(low: f64, high: f64) -> Self {
        Self {
            target_temp_low: Some(low),
            target_temp_high: Some(high),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtraAttributes {
    pub mode: i64,
    pub battery_state: u8,
    pub frost_t: f64,
    pub save_t: f64,
    pub comfort_t: f64,
    pub season_mode: &'static str,
    pub heating_state: bool,
    pub units: i64,
    pub current_setpoint: u8,
    pub last_seen: i64,
}

/// Climate entity for one room. Owns its projected view; shares the
/// gateway client with the other rooms of the same device.
pub struct Thermostat {
    name: String,
    room_id: String,
    client: Arc<GatewayClient>,
    view: Option<RoomView>,
}

impl Thermostat {
    pub fn new(
        name: impl Into<String>,
        room_id: impl Into<String>,
        client: Arc<GatewayClient>,
    ) -> Self {
        Self {
            name: name.into(),
            room_id: room_id.into(),
            client,
            view: None,
        }
    }

    /// Poll hook. Pulls the room record through the shared client and
    /// advances the view only if the record is newer than what we hold.
    pub async fn update(&mut self) {
        let Some(raw) = self.client.room_by_id(&self.room_id).await else {
            trace!(room = %self.room_id, "no data for room");
            return;
        };

        match project_if_newer(self.view.as_ref(), &raw) {
            Some(view) => {
                debug!(room = %self.room_id, last_seen = view.last_seen, "updating room");
                self.view = Some(view);
            }
            None => trace!(room = %self.room_id, "stale poll ignored"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> &str {
        &self.room_id
    }

    pub fn should_poll(&self) -> bool {
        true
    }

    pub fn view(&self) -> Option<&RoomView> {
        self.view.as_ref()
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.view.as_ref().map(|v| v.unit).unwrap_or_default()
    }

    pub fn current_temperature(&self) -> Option<f64> {
        self.view.as_ref().map(|v| v.current_temp)
    }

    /// The setpoint the gateway reports as active, not the comfort value.
    pub fn target_temperature(&self) -> Option<f64> {
        self.view.as_ref().map(|v| v.set_temp)
    }

    pub fn target_temperature_high(&self) -> Option<f64> {
        self.view.as_ref().map(|v| v.comf_t)
    }

    pub fn target_temperature_low(&self) -> Option<f64> {
        self.view.as_ref().map(|v| v.save_t)
    }

    pub fn target_temperature_step(&self) -> f64 {
        TARGET_TEMPERATURE_STEP
    }

    pub fn hvac_mode(&self) -> Option<HvacMode> {
        self.view.as_ref().map(RoomView::hvac_mode)
    }

    pub fn hvac_modes(&self) -> &'static [HvacMode] {
        &HVAC_MODES
    }

    pub fn hvac_action(&self) -> HvacAction {
        self.view
            .as_ref()
            .map(RoomView::hvac_action)
            .unwrap_or_default()
    }

    pub fn preset_mode(&self) -> Option<&'static str> {
        self.view.as_ref().map(RoomView::preset_mode)
    }

    pub fn preset_modes(&self) -> Vec<&'static str> {
        WorkMode::ALL.iter().map(WorkMode::as_preset_str).collect()
    }

    pub fn supported_features(&self) -> &'static [ClimateEntityFeature] {
        &SUPPORTED_FEATURES
    }

    /// Setpoint that a plain `temperature` write is routed to. Comfort until
    /// the first update.
    pub fn active_setpoint(&self) -> Setpoint {
        self.view
            .as_ref()
            .map(|v| v.active_setpoint)
            .unwrap_or_default()
    }

    pub fn extra_attributes(&self) -> Option<ExtraAttributes> {
        let v = self.view.as_ref()?;
        Some(ExtraAttributes {
            mode: v.mode_code,
            battery_state: 0,
            frost_t: v.frost_t,
            save_t: v.save_t,
            comfort_t: v.comf_t,
            season_mode: v.hvac_mode().as_host_str(),
            heating_state: v.heating_active,
            units: v.unit.units_flag(),
            current_setpoint: v.active_setpoint.index(),
            last_seen: v.last_seen,
        })
    }

    /// Write every supplied value. Returns true only if all writes were
    /// accepted. Local state is left alone; the next refresh picks the new
    /// values up.
    pub async fn set_temperature(&self, request: TemperatureRequest) -> bool {
        let unit = self.temperature_unit();
        debug!(
            room = %self.room_id,
            temperature = ?request.temperature,
            low = ?request.target_temp_low,
            high = ?request.target_temp_high,
            "set temperature"
        );

        let mut writes = Vec::with_capacity(3);
        if let Some(temp) = request.temperature {
            writes.push((self.active_setpoint(), units_to_deci(temp, unit)));
        }
        if let Some(high) = request.target_temp_high {
            writes.push((Setpoint::Comfort, units_to_deci(high, unit)));
        }
        if let Some(low) = request.target_temp_low {
            writes.push((Setpoint::Economy, units_to_deci(low, unit)));
        }

        let mut all_ok = true;
        for (slot, deci) in writes {
            all_ok &= self.client.set_room_setpoint(&self.room_id, slot, deci).await;
        }
        all_ok
    }

    /// Unknown preset names fall back to AUTO.
    pub async fn set_preset_mode(&self, preset: &str) -> bool {
        let mode = preset.parse::<WorkMode>().unwrap_or_else(|e| {
            warn!(room = %self.room_id, error = %e, "falling back to AUTO");
            WorkMode::Auto
        });
        debug!(room = %self.room_id, preset, mode = mode.code(), "set preset mode");
        self.client.set_room_mode(&self.room_id, mode).await
    }

    pub async fn set_hvac_mode(&self, mode: HvacMode) -> bool {
        let season = Season::from(mode);
        debug!(room = %self.room_id, mode = mode.as_host_str(), winter = season.winter_flag(), "set hvac mode");
        self.client.set_room_season(&self.room_id, season).await
    }
}
