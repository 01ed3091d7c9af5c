use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::diff::room_events;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    device_path, encode_int_body, parse_device_response, room_mode_path, room_setpoint_path,
    ParsedDevice, CONTENT_TYPE_JSON,
};
use crate::record::{DeviceSnapshot, RoomRecord};
use crate::types::*;
use crate::{Error, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type SnapshotCallback = Box<dyn Fn(&DeviceSnapshot) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success,
    Empty,
    Failure,
}

pub struct GatewayClientBuilder {
    url: String,
    device_id: String,
    timeout: Duration,
    refresh_interval: Duration,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl GatewayClientBuilder {
    pub fn new(url: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            device_id: device_id.into(),
            timeout: DEFAULT_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            event_callbacks: Vec::new(),
            snapshot_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Minimum age of the cached snapshot before `room_by_id` refetches.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_snapshot(mut self, f: impl Fn(&DeviceSnapshot) + Send + Sync + 'static) -> Self {
        self.snapshot_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<GatewayClient> {
        if self.url.trim().is_empty() {
            return Err(Error::Config("gateway url is empty".to_string()));
        }
        if self.device_id.trim().is_empty() {
            return Err(Error::Config("device id is empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be non-zero".to_string()));
        }

        let mut base_url = self.url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let http = reqwest::Client::builder().timeout(self.timeout).build()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(MessageLogger::new(mode, &path)?)),
            _ => None,
        };

        Ok(GatewayClient {
            http,
            base_url,
            device_id: self.device_id,
            refresh_interval: self.refresh_interval,
            cache: RwLock::new(Cache::default()),
            refresh_lock: tokio::sync::Mutex::new(()),
            event_callbacks: self.event_callbacks,
            snapshot_callbacks: self.snapshot_callbacks,
            logger,
        })
    }
}

#[derive(Default)]
struct Cache {
    snapshot: Option<Arc<DeviceSnapshot>>,
    refreshed_at: Option<Instant>,
    attempts: u64,
}

/// HTTP client for one gateway device, shared by all room entities of
/// that device.
///
/// The cached [`DeviceSnapshot`] is swapped whole under a lock, so readers
/// see either the old or the new snapshot. Refreshes are serialized, and a
/// caller that waited on a refresh in flight takes its result, success or
/// not, instead of fetching again.
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    device_id: String,
    refresh_interval: Duration,
    cache: RwLock<Cache>,
    refresh_lock: tokio::sync::Mutex<()>,
    event_callbacks: Vec<EventCallback>,
    snapshot_callbacks: Vec<SnapshotCallback>,
    logger: Option<Mutex<MessageLogger>>,
}

impl GatewayClient {
    pub fn builder(url: impl Into<String>, device_id: impl Into<String>) -> GatewayClientBuilder {
        GatewayClientBuilder::new(url, device_id)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn snapshot(&self) -> Option<Arc<DeviceSnapshot>> {
        self.read_cache().snapshot.clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.read_cache().snapshot.as_ref().map(|s| s.last_update)
    }

    /// Fetch the device unconditionally.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Record for `room_id`, refreshing first when the snapshot is missing
    /// or older than the refresh interval. A failed refresh falls back to
    /// the previous snapshot, possibly stale or absent. Callers queued behind
    /// an attempt that ends while they wait reuse its outcome, so overlapping
    /// lookups are bounded by one HTTP timeout and send one GET.
    pub async fn room_by_id(&self, room_id: &str) -> Option<RoomRecord> {
        let seen = self.read_cache().attempts;
        if self.is_stale() {
            let _guard = self.refresh_lock.lock().await;
            if self.read_cache().attempts != seen {
                trace!(device = %self.device_id, "refresh attempted by another caller");
            } else if self.is_stale() {
                self.refresh_locked().await;
            }
        }
        self.cached_room(room_id)
    }

    pub fn cached_room(&self, room_id: &str) -> Option<RoomRecord> {
        self.read_cache().snapshot.as_ref()?.room(room_id).cloned()
    }

    pub async fn set_room_mode(&self, room_id: &str, mode: WorkMode) -> bool {
        let path = room_mode_path(&self.device_id, room_id);
        match self
            .put_int("set_room_mode", room_id, None, &path, mode.code())
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(room = %room_id, mode = ?mode, error = %e, "set_room_mode failed");
                false
            }
        }
    }

    /// Write one setpoint. `deci` is deci-degrees Celsius.
    pub async fn set_room_setpoint(&self, room_id: &str, slot: Setpoint, deci: i64) -> bool {
        let path = room_setpoint_path(&self.device_id, room_id, slot);
        match self
            .put_int("set_room_setpoint", room_id, Some(slot), &path, deci)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(room = %room_id, slot = ?slot, error = %e, "set_room_setpoint failed");
                false
            }
        }
    }

    /// The gateway has no settings endpoint yet, so season changes cannot be
    /// sent. Always returns false without I/O.
    pub async fn set_room_season(&self, room_id: &str, season: Season) -> bool {
        debug!(room = %room_id, season = ?season, "season change not supported by gateway");
        false
    }

    // -- Helpers --

    fn read_cache(&self) -> RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self) -> bool {
        match self.read_cache().refreshed_at {
            None => true,
            Some(at) => at.elapsed() > self.refresh_interval,
        }
    }

    fn with_logger(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(logger) = &self.logger {
            let mut logger = logger.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut *logger);
        }
    }

    /// Caller must hold `refresh_lock`.
    async fn refresh_locked(&self) -> RefreshOutcome {
        let fetched = self.fetch_device().await;
        self.write_cache().attempts += 1;
        match fetched {
            Ok(parsed) if parsed.rooms.is_empty() => {
                debug!(device = %self.device_id, "device reported no rooms");
                let mut cache = self.write_cache();
                cache.snapshot = None;
                cache.refreshed_at = None;
                RefreshOutcome::Empty
            }
            Ok(parsed) => {
                let snapshot = Arc::new(DeviceSnapshot {
                    device_id: self.device_id.clone(),
                    rooms: parsed.rooms,
                    last_update: Utc::now(),
                    raw_rooms: parsed.raw_rooms,
                });
                debug!(device = %self.device_id, rooms = snapshot.len(), "device refreshed");
                let previous = {
                    let mut cache = self.write_cache();
                    cache.refreshed_at = Some(Instant::now());
                    cache.snapshot.replace(Arc::clone(&snapshot))
                };
                self.notify(previous.as_deref(), &snapshot);
                RefreshOutcome::Success
            }
            Err(e) => {
                warn!(device = %self.device_id, error = %e, "device refresh failed");
                RefreshOutcome::Failure
            }
        }
    }

    async fn fetch_device(&self) -> Result<ParsedDevice> {
        let path = device_path(&self.device_id);
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "fetching device");
        self.with_logger(|l| l.log_request("GET", &path));

        let resp = self.http.get(&url).send().await?;
        let status = resp.status().as_u16();
        let resp = match resp.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                self.with_logger(|l| l.log_poll(status, None));
                return Err(e.into());
            }
        };

        let body: Value = resp.json().await?;
        self.with_logger(|l| l.log_poll(status, Some(&body)));
        parse_device_response(&body)
    }

    async fn put_int(
        &self,
        action: &str,
        room_id: &str,
        slot: Option<Setpoint>,
        path: &str,
        value: i64,
    ) -> Result<()> {
        if self.room_by_id(room_id).await.is_none() {
            return Err(Error::UnknownRoom(room_id.to_string()));
        }

        let url = format!("{}{path}", self.base_url);
        let body = encode_int_body(value);
        debug!(url = %url, body = %body, action, "sending room command");
        self.with_logger(|l| l.log_command(action, room_id, slot, value));

        self.http
            .put(&url)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    fn notify(&self, previous: Option<&DeviceSnapshot>, snapshot: &DeviceSnapshot) {
        if !self.event_callbacks.is_empty() {
            let mut count = 0usize;
            for (room_id, raw) in &snapshot.raw_rooms {
                let prev_raw = previous.and_then(|p| p.raw_rooms.get(room_id));
                for event in room_events(room_id, prev_raw, raw) {
                    trace!(event = ?event, "room event");
                    for cb in &self.event_callbacks {
                        cb(&event);
                    }
                    count += 1;
                }
            }
            if count > 0 {
                debug!(count, "processed events from refresh");
            }
        }

        for cb in &self.snapshot_callbacks {
            cb(snapshot);
        }
    }
}
