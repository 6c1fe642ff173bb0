// ── Device domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// What kind of smart device an entry controls.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Switch,
    Light,
}

impl DeviceKind {
    /// Service domain on the hub.
    pub fn domain(self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Light => "light",
        }
    }

    pub fn default_icon(self) -> &'static str {
        match self {
            Self::Switch => "plug",
            Self::Light => "bulb",
        }
    }

    /// Infer the kind from an entity id such as `light.kitchen`.
    pub fn from_entity(entity: &str) -> Self {
        match entity.split_once('.') {
            Some(("light", _)) => Self::Light,
            _ => Self::Switch,
        }
    }

    pub fn supports_brightness(self) -> bool {
        matches!(self, Self::Light)
    }
}

/// Last known state of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// Nothing fetched yet.
    #[default]
    Unknown,
    Known {
        on: bool,
        /// Percentage, 0..=100. Lights only.
        brightness: Option<u8>,
        raw_state: String,
        attributes: Map<String, Value>,
    },
    /// The last fetch failed.
    Error(String),
    /// No device control endpoint is configured.
    NotConfigured,
}

impl DeviceStatus {
    /// Unknown and error states count as off.
    pub fn is_on(&self) -> bool {
        matches!(self, Self::Known { on: true, .. })
    }

    pub fn brightness(&self) -> Option<u8> {
        match self {
            Self::Known { brightness, .. } => *brightness,
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// A command a user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    TurnOn,
    TurnOff,
    /// Target brightness percentage, already clamped to 0..=100.
    SetBrightness(u8),
}

/// Whether a device has a command in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ControlState {
    #[default]
    Idle,
    Pending(Intent),
}

/// Result of a control request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was sent and the state reconciled.
    Applied,
    /// Another command for the device was already in flight.
    Dropped,
}

/// One configured device plus its current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub kind: DeviceKind,
    pub entity: String,
    pub status: DeviceStatus,
    /// Error text from the most recent command, cleared on success.
    pub last_error: Option<String>,
}
