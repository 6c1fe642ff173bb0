// ── Dashboard configuration ──
//
// The declarative tree the kiosk is driven by. `skylight-config` loads it
// from disk once at startup; core only ever reads it. Every key is
// optional and degrades to a documented default.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::model::DeviceKind;

/// Names of the `[apis.*]` entries the dashboard knows about.
pub mod endpoint {
    pub const HOME: &str = "home";
    pub const WEATHER: &str = "weather";
    pub const CALENDAR: &str = "calendar";
    pub const SHIPMENTS: &str = "shipments";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const NOTE: &str = "note";
    pub const RECIPE: &str = "recipe";
    pub const BACKEND: &str = "backend";

    pub const ALL: &[&str] = &[
        HOME,
        WEATHER,
        CALENDAR,
        SHIPMENTS,
        NOTIFICATIONS,
        NOTE,
        RECIPE,
        BACKEND,
    ];
}

/// Root of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub layout: LayoutConfig,
    /// Declaration order is display order.
    pub devices: IndexMap<String, DeviceConfig>,
    pub apis: BTreeMap<String, ApiConfig>,
    pub refresh: RefreshConfig,
    /// Accept self-signed certificates from every collaborator.
    pub insecure: bool,
    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
}

impl Configuration {
    pub fn api(&self, name: &str) -> Option<&ApiConfig> {
        self.apis.get(name)
    }

    /// Configured URL for an endpoint, if any.
    pub fn api_url(&self, name: &str) -> Option<&str> {
        self.api(name)
            .and_then(|api| api.url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

// ── Layout ───────────────────────────────────────────────────────────

/// Three bands of tiles. A missing band is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub top: Vec<TileDescriptor>,
    pub middle: Vec<TileDescriptor>,
    pub bottom: Vec<TileDescriptor>,
}

impl LayoutConfig {
    pub fn tile_count(&self) -> usize {
        self.top.len() + self.middle.len() + self.bottom.len()
    }
}

/// One tile: its widget type, sizing hint and type-specific parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    #[serde(rename = "type", default)]
    pub kind: String,
    /// `"2fr"`, `"30%"`, `"24"` or a bare number of cells.
    #[serde(default, deserialize_with = "width_hint", skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Refresh period override in humantime syntax (`"10m"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    /// Everything else, kept verbatim for the widget.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl TileDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Explicit name, else the type tag in title case.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_owned();
        }
        let mut chars = self.kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Tile".to_owned(),
        }
    }

    /// Parsed `refresh` override. Invalid values are logged and ignored.
    pub fn refresh_override(&self) -> Option<Duration> {
        let raw = self.refresh.as_deref()?;
        match humantime::parse_duration(raw.trim()) {
            Ok(period) if !period.is_zero() => Some(period),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(tile = %self.kind, refresh = raw, error = %e, "invalid refresh override");
                None
            }
        }
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn param_f64(&self, key: &str) -> Option<f64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn param_u64(&self, key: &str) -> Option<u64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn param_bool(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }

    /// A list of strings; a single string is treated as a one-element list.
    pub fn param_list(&self, key: &str) -> Vec<String> {
        match self.params.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }
}

/// Accept a string or a bare number; anything else is dropped so the tile
/// falls back to the equal-share size instead of failing the whole file.
fn width_hint<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawWidth {
        Text(String),
        Cells(u64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawWidth>::deserialize(deserializer)? {
        Some(RawWidth::Text(s)) => Some(s),
        Some(RawWidth::Cells(n)) => Some(n.to_string()),
        Some(RawWidth::Other(_)) | None => None,
    })
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hub entity id, e.g. `light.kitchen`.
    pub entity: String,
    pub name: Option<String>,
    pub icon: Option<String>,
    /// Inferred from the entity domain when absent.
    pub kind: Option<DeviceKind>,
}

impl DeviceConfig {
    pub fn kind(&self) -> DeviceKind {
        self.kind
            .unwrap_or_else(|| DeviceKind::from_entity(&self.entity))
    }

    pub fn display_name(&self, id: &str) -> String {
        self.name.clone().unwrap_or_else(|| id.to_owned())
    }

    pub fn icon(&self) -> String {
        self.icon
            .clone()
            .unwrap_or_else(|| self.kind().default_icon().to_owned())
    }
}

// ── Endpoints ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub url: Option<String>,
    /// Plaintext secret. Prefer `key_env` or the system keyring.
    pub key: Option<String>,
    /// Environment variable holding the secret.
    pub key_env: Option<String>,
    /// Explicit push channel URL (notifications only).
    pub push_url: Option<String>,
}

/// Secrets resolved per endpoint name.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    secrets: HashMap<String, SecretString>,
}

impl Credentials {
    pub fn insert(&mut self, endpoint: impl Into<String>, secret: SecretString) {
        self.secrets.insert(endpoint.into(), secret);
    }

    pub fn get(&self, endpoint: &str) -> Option<&SecretString> {
        self.secrets.get(endpoint)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

// ── Refresh periods ──────────────────────────────────────────────────

/// Refresh periods and deadlines, all defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub weather_secs: u64,
    pub calendar_secs: u64,
    pub shipments_secs: u64,
    pub recipe_secs: u64,
    pub note_secs: u64,
    pub devices_secs: u64,
    pub notifications_secs: u64,
    pub health_secs: u64,
    pub reconnect_secs: u64,
    pub timeout_secs: u64,
    /// Gap between device reads during a bulk refresh.
    pub device_spacing_ms: u64,
    /// Animation tick of the kiosk screen (clock, pulse, spinners).
    pub ui_tick_ms: u64,
    /// Screen repaints per second.
    pub frame_rate: u16,
    /// Quiet keyboard time before the screen returns to its resting
    /// state. `0` disables it.
    pub idle_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            weather_secs: 15 * 60,
            calendar_secs: 15 * 60,
            shipments_secs: 30 * 60,
            recipe_secs: 60 * 60,
            note_secs: 60,
            devices_secs: 30,
            notifications_secs: 5 * 60,
            health_secs: 60,
            reconnect_secs: 5,
            timeout_secs: 15,
            device_spacing_ms: 200,
            ui_tick_ms: 250,
            frame_rate: 30,
            idle_secs: 120,
        }
    }
}

impl RefreshConfig {
    /// Every period is at least one second.
    fn secs(value: u64) -> Duration {
        Duration::from_secs(value.max(1))
    }

    pub fn weather(&self) -> Duration {
        Self::secs(self.weather_secs)
    }
    pub fn calendar(&self) -> Duration {
        Self::secs(self.calendar_secs)
    }
    pub fn shipments(&self) -> Duration {
        Self::secs(self.shipments_secs)
    }
    pub fn recipe(&self) -> Duration {
        Self::secs(self.recipe_secs)
    }
    pub fn note(&self) -> Duration {
        Self::secs(self.note_secs)
    }
    pub fn devices(&self) -> Duration {
        Self::secs(self.devices_secs)
    }
    pub fn notifications(&self) -> Duration {
        Self::secs(self.notifications_secs)
    }
    pub fn health(&self) -> Duration {
        Self::secs(self.health_secs)
    }
    pub fn reconnect(&self) -> Duration {
        Self::secs(self.reconnect_secs)
    }
    pub fn timeout(&self) -> Duration {
        Self::secs(self.timeout_secs)
    }
    pub fn device_spacing(&self) -> Duration {
        Duration::from_millis(self.device_spacing_ms)
    }

    /// At least 50 ms.
    pub fn ui_tick(&self) -> Duration {
        Duration::from_millis(self.ui_tick_ms.max(50))
    }

    /// Time between repaints, for a frame rate clamped to 1..=60.
    pub fn frame(&self) -> Duration {
        Duration::from_secs(1) / u32::from(self.frame_rate.clamp(1, 60))
    }

    pub fn idle(&self) -> Option<Duration> {
        (self.idle_secs > 0).then(|| Duration::from_secs(self.idle_secs))
    }
}
