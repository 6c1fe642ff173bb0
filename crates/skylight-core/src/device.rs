//! Device control core.
//!
//! Every device id has exactly one authoritative [`Device`] record. User
//! commands follow a two-phase shape: an optimistic write, the remote
//! command, then an authoritative re-read that always has the last word.
//! At most one command per device is in flight; a second request while
//! one is pending is dropped.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use skylight_api::HomeClient;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DeviceConfig;
use crate::convert::{clamp_percent, ui_to_api};
use crate::error::CoreError;
use crate::model::{CommandOutcome, ControlState, Device, DeviceKind, DeviceStatus, Intent};
use crate::store::KeyedCollection;

/// Default gap between reads during a bulk refresh.
pub const DEFAULT_SPACING: Duration = Duration::from_millis(200);

/// Cheaply cloneable handle to the device control core.
#[derive(Clone)]
pub struct DeviceControl {
    inner: Arc<DeviceControlInner>,
}

struct DeviceControlInner {
    client: Option<HomeClient>,
    devices: IndexMap<String, DeviceConfig>,
    states: KeyedCollection<Device>,
    pending: DashMap<String, Intent>,
    /// Bumped whenever a command starts for a device. A bulk read that
    /// straddles a command start is discarded.
    epochs: DashMap<String, u64>,
    spacing: Duration,
}

/// Clears a device's pending entry when the command finishes, however it
/// finishes.
struct PendingGuard {
    inner: Arc<DeviceControlInner>,
    id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.inner.pending.remove(&self.id);
    }
}

impl DeviceControl {
    /// `client` is `None` when no device control endpoint is configured;
    /// every device then reports `DeviceStatus::NotConfigured`.
    pub fn new(
        client: Option<HomeClient>,
        devices: IndexMap<String, DeviceConfig>,
        spacing: Duration,
    ) -> Self {
        let states = KeyedCollection::new();
        let initial = if client.is_some() {
            DeviceStatus::Unknown
        } else {
            DeviceStatus::NotConfigured
        };
        for (id, config) in &devices {
            if config.entity.trim().is_empty() {
                warn!(device = %id, "device has no entity id");
            }
            states.upsert(
                id.clone(),
                Device {
                    id: id.clone(),
                    name: config.display_name(id),
                    icon: config.icon(),
                    kind: config.kind(),
                    entity: config.entity.clone(),
                    status: initial.clone(),
                    last_error: None,
                },
            );
        }

        Self {
            inner: Arc::new(DeviceControlInner {
                client,
                devices,
                states,
                pending: DashMap::new(),
                epochs: DashMap::new(),
                spacing,
            }),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn is_configured(&self) -> bool {
        self.inner.client.is_some()
    }

    /// Configured device ids in declaration order.
    pub fn ids(&self) -> Vec<String> {
        self.inner.devices.keys().cloned().collect()
    }

    pub fn device(&self, id: &str) -> Option<Arc<Device>> {
        self.inner.states.get(id)
    }

    /// Devices in declaration order, optionally restricted to `ids`.
    pub fn devices(&self, ids: Option<&[String]>) -> Vec<Arc<Device>> {
        match ids {
            Some(ids) => ids.iter().filter_map(|id| self.device(id)).collect(),
            None => self
                .inner
                .devices
                .keys()
                .filter_map(|id| self.device(id))
                .collect(),
        }
    }

    pub fn control_state(&self, id: &str) -> ControlState {
        self.inner
            .pending
            .get(id)
            .map_or(ControlState::Idle, |intent| ControlState::Pending(*intent))
    }

    /// Version counter bumped on every state write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.states.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Flip the device to the opposite of its last known on/off state.
    pub async fn toggle(&self, id: &str) -> Result<CommandOutcome, CoreError> {
        let config = self.config(id)?;
        let on = self.device(id).is_some_and(|d| d.status.is_on());
        let intent = if on { Intent::TurnOff } else { Intent::TurnOn };
        self.execute(id, &config, intent).await
    }

    /// Set a light's brightness percentage; `value` is clamped to 0..=100.
    pub async fn set_brightness(&self, id: &str, value: i32) -> Result<CommandOutcome, CoreError> {
        let config = self.config(id)?;
        if !config.kind().supports_brightness() {
            return Err(CoreError::Unsupported {
                operation: "set_brightness".into(),
                reason: format!("{id} is a {}", config.kind()),
            });
        }
        let percent = clamp_percent(value);
        self.execute(id, &config, Intent::SetBrightness(percent)).await
    }

    /// Re-read one device unless a command for it is in flight.
    pub async fn refresh(&self, id: &str) -> Result<(), CoreError> {
        let config = self.config(id)?;
        let client = self.client()?;
        self.refresh_unless_pending(client, id, &config).await;
        Ok(())
    }

    /// Re-read every configured device, one at a time, `spacing` apart.
    pub async fn refresh_all(&self) {
        let Some(client) = self.inner.client.as_ref() else {
            return;
        };
        for (i, (id, config)) in self.inner.devices.iter().enumerate() {
            if i > 0 && !self.inner.spacing.is_zero() {
                tokio::time::sleep(self.inner.spacing).await;
            }
            self.refresh_unless_pending(client, id, config).await;
        }
        debug!(devices = self.inner.devices.len(), "bulk device refresh complete");
    }

    /// Bulk refresh immediately, then every `period` until cancelled.
    pub fn spawn_refresh(&self, period: Duration, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.is_configured() || self.inner.devices.is_empty() {
            return None;
        }
        let control = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => control.refresh_all().await,
                }
            }
        }))
    }

    // ── Internals ────────────────────────────────────────────────────

    fn config(&self, id: &str) -> Result<DeviceConfig, CoreError> {
        self.inner
            .devices
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_owned(),
            })
    }

    fn client(&self) -> Result<&HomeClient, CoreError> {
        self.inner
            .client
            .as_ref()
            .ok_or_else(|| CoreError::not_configured("Device control"))
    }

    /// Claim the pending slot for `id`. `None` if a command is in flight.
    fn begin(&self, id: &str, intent: Intent) -> Option<PendingGuard> {
        match self.inner.pending.entry(id.to_owned()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(intent);
                *self.inner.epochs.entry(id.to_owned()).or_insert(0) += 1;
                Some(PendingGuard {
                    inner: Arc::clone(&self.inner),
                    id: id.to_owned(),
                })
            }
        }
    }

    async fn execute(
        &self,
        id: &str,
        config: &DeviceConfig,
        intent: Intent,
    ) -> Result<CommandOutcome, CoreError> {
        let client = self.client()?;
        let Some(_guard) = self.begin(id, intent) else {
            debug!(device = %id, ?intent, "command already pending, dropping");
            return Ok(CommandOutcome::Dropped);
        };

        self.write_optimistic(id, intent);

        let (action, params) = service_call(config.kind(), intent);
        info!(device = %id, entity = %config.entity, action, "sending device command");
        let result = client
            .call_service(config.kind().domain(), action, &config.entity, params)
            .await
            .map_err(CoreError::from);

        // Authoritative read wins, success or not.
        let status = fetch_status(client, &config.entity).await;
        let last_error = result.as_ref().err().map(ToString::to_string);
        self.inner.states.update(id, |d| Device {
            status,
            last_error: last_error.clone(),
            ..d.clone()
        });

        match result {
            Ok(()) => Ok(CommandOutcome::Applied),
            Err(e) => {
                warn!(device = %id, error = %e, "device command failed");
                Err(e)
            }
        }
    }

    fn write_optimistic(&self, id: &str, intent: Intent) {
        self.inner.states.update(id, |d| {
            let (on, brightness) = match intent {
                Intent::TurnOn => (true, d.status.brightness().filter(|b| *b > 0)),
                Intent::TurnOff => (false, d.status.brightness().map(|_| 0)),
                Intent::SetBrightness(b) => (b > 0, Some(b)),
            };
            let (raw_state, attributes) = match &d.status {
                DeviceStatus::Known {
                    raw_state,
                    attributes,
                    ..
                } => (raw_state.clone(), attributes.clone()),
                _ => (String::new(), Map::new()),
            };
            Device {
                status: DeviceStatus::Known {
                    on,
                    brightness,
                    raw_state,
                    attributes,
                },
                ..d.clone()
            }
        });
    }

    async fn refresh_unless_pending(&self, client: &HomeClient, id: &str, config: &DeviceConfig) {
        if self.inner.pending.contains_key(id) {
            debug!(device = %id, "skipping refresh, command pending");
            return;
        }
        let epoch = self.epoch(id);
        let status = fetch_status(client, &config.entity).await;
        if self.inner.pending.contains_key(id) || self.epoch(id) != epoch {
            debug!(device = %id, "discarding read that raced a command");
            return;
        }
        self.inner.states.update(id, |d| Device {
            status: status.clone(),
            ..d.clone()
        });
    }

    fn epoch(&self, id: &str) -> u64 {
        self.inner.epochs.get(id).map_or(0, |e| *e)
    }
}

/// Service action and extra body for an intent.
fn service_call(kind: DeviceKind, intent: Intent) -> (&'static str, Option<Map<String, Value>>) {
    match (kind, intent) {
        (_, Intent::TurnOn) => ("turn_on", None),
        (_, Intent::TurnOff) => ("turn_off", None),
        (DeviceKind::Light, Intent::SetBrightness(0)) => ("turn_off", None),
        (DeviceKind::Light, Intent::SetBrightness(percent)) => {
            let mut params = Map::new();
            params.insert("brightness".into(), Value::from(ui_to_api(percent)));
            ("turn_on", Some(params))
        }
        (DeviceKind::Switch, Intent::SetBrightness(percent)) => {
            (if percent > 0 { "turn_on" } else { "turn_off" }, None)
        }
    }
}

async fn fetch_status(client: &HomeClient, entity: &str) -> DeviceStatus {
    match client.get_state(entity).await {
        Ok(state) => DeviceStatus::from(state),
        Err(e) => {
            warn!(entity, error = %e, "device state fetch failed");
            DeviceStatus::Error(CoreError::from(e).to_string())
        }
    }
}
