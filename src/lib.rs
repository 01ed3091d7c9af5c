mod client;
mod climate;
mod config;
mod diff;
mod error;
mod logger;
mod projection;
mod protocol;
mod record;
mod types;

pub use client::{
    GatewayClient, GatewayClientBuilder, RefreshOutcome, DEFAULT_REFRESH_INTERVAL,
    DEFAULT_TIMEOUT,
};
pub use climate::{ExtraAttributes, TemperatureRequest, Thermostat};
pub use config::{setup_platform, Platform, PlatformConfig, RoomConfig, DEFAULT_ROOM_NAME};
pub use error::{Error, Result};
pub use logger::MessageLogMode;
pub use projection::{
    cent_to_fah, fah_to_cent, infer_active_setpoint, project, project_if_newer,
    reading_to_units, units_to_deci, RoomView,
};
pub use protocol::{device_path, room_mode_path, room_setpoint_path};
pub use record::{DeviceSnapshot, RoomRecord};
pub use types::*;
