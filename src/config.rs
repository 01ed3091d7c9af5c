//! Platform configuration: one gateway device and the rooms to expose.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::client::{GatewayClient, RefreshOutcome, DEFAULT_REFRESH_INTERVAL, DEFAULT_TIMEOUT};
use crate::climate::Thermostat;
use crate::{Error, Result};

pub const DEFAULT_ROOM_NAME: &str = "Besmart Thermostat";

fn default_room_name() -> String {
    DEFAULT_ROOM_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomConfig {
    #[serde(default = "default_room_name")]
    pub name: String,
    pub room_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformConfig {
    /// Gateway base URL, normally ending in `/`.
    pub url: String,
    pub device_id: String,
    pub rooms: Vec<RoomConfig>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    /// How often the host polls each room entity.
    #[serde(default)]
    pub scan_interval_secs: Option<u64>,
}

impl PlatformConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: PlatformConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("url must not be empty".to_string()));
        }
        if self.device_id.trim().is_empty() {
            return Err(Error::Config("device_id must not be empty".to_string()));
        }
        if self.rooms.is_empty() {
            return Err(Error::Config("at least one room is required".to_string()));
        }
        if let Some(room) = self.rooms.iter().find(|r| r.room_id.trim().is_empty()) {
            return Err(Error::Config(format!("room {:?} has an empty room_id", room.name)));
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Config("timeout_secs must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL)
    }

    /// Host poll cadence; defaults to the refresh interval.
    pub fn scan_interval(&self) -> Duration {
        self.scan_interval_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.refresh_interval())
    }
}

/// Shared client plus one entity per configured room.
pub struct Platform {
    pub client: Arc<GatewayClient>,
    pub thermostats: Vec<Thermostat>,
}

/// Build the shared client, fetch the device once and create an initial
/// view for every configured room.
pub async fn setup_platform(config: &PlatformConfig) -> Result<Platform> {
    config.validate()?;

    let client = GatewayClient::builder(&config.url, &config.device_id)
        .timeout(config.timeout())
        .refresh_interval(config.refresh_interval())
        .build()?;
    let client = Arc::new(client);

    match client.refresh().await {
        RefreshOutcome::Success => {}
        outcome => warn!(device = %config.device_id, ?outcome, "initial device fetch returned no rooms"),
    }

    let mut thermostats = Vec::with_capacity(config.rooms.len());
    for room in &config.rooms {
        let mut thermostat = Thermostat::new(&room.name, &room.room_id, Arc::clone(&client));
        thermostat.update().await;
        thermostats.push(thermostat);
    }
    info!(
        device = %config.device_id,
        rooms = thermostats.len(),
        "besmart platform ready"
    );

    Ok(Platform {
        client,
        thermostats,
    })
}
