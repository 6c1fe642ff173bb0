// ── Wire → domain conversions ──
//
// Every raw collaborator payload is normalized here so widgets only ever
// see `crate::model` types.

use chrono::{DateTime, Utc};
use serde_json::Value;
use skylight_api::{EntityState, RawNotification, RecipePayload, Tracking};

use crate::model::recipe::{DEFAULT_AUTHOR, DEFAULT_TITLE};
use crate::model::{DeviceStatus, Notification, Priority, Recipe, Shipment, ShipmentCheckpoint};

// ── Brightness ───────────────────────────────────────────────────────

/// Percentage (0..=100) to the hub's 0..=255 scale, rounded.
pub fn ui_to_api(percent: u8) -> u8 {
    let percent = u32::from(percent.min(100));
    let scaled = (percent * 255 + 50) / 100;
    u8::try_from(scaled).unwrap_or(u8::MAX)
}

/// Hub brightness (0..=255) to a percentage, rounded.
pub fn api_to_ui(raw: u8) -> u8 {
    let scaled = (u32::from(raw) * 100 + 127) / 255;
    u8::try_from(scaled).unwrap_or(100)
}

/// Clamp an arbitrary UI input to a valid percentage.
pub fn clamp_percent(value: i32) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}

// ── Devices ──────────────────────────────────────────────────────────

impl From<EntityState> for DeviceStatus {
    fn from(state: EntityState) -> Self {
        let on = state.is_on();
        // The hub omits brightness for lights that are off.
        let brightness = state.brightness().map(api_to_ui).or((!on).then_some(0));
        DeviceStatus::Known {
            on,
            brightness,
            raw_state: state.state,
            attributes: state.attributes,
        }
    }
}

// ── Notifications ────────────────────────────────────────────────────

impl From<RawNotification> for Notification {
    fn from(raw: RawNotification) -> Self {
        let fallback_title = if raw.recurring { "Reminder" } else { "Notification" };
        Notification {
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback_title.to_owned()),
            message: raw.message.filter(|m| !m.trim().is_empty()),
            priority: Priority::parse(raw.priority.as_deref()),
            icon: raw
                .icon
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| "alert".to_owned()),
            recurring: raw.recurring,
            target_time: raw.target_time,
            expires: raw.expires,
            id: raw.id,
        }
    }
}

/// Convert and order for display: by priority, stable within a priority.
pub fn notifications_from_raw(raw: Vec<RawNotification>) -> Vec<Notification> {
    let mut list: Vec<Notification> = raw.into_iter().map(Notification::from).collect();
    list.sort_by_key(|n| n.priority);
    list
}

// ── Shipments ────────────────────────────────────────────────────────

impl From<Tracking> for Shipment {
    fn from(t: Tracking) -> Self {
        Shipment {
            id: t.id,
            tag: t.tag,
            slug: t.slug,
            expected_delivery: t.expected_delivery,
            tracking_number: t.tracking_number,
            title: t.title,
            checkpoints: t
                .checkpoints
                .into_iter()
                .map(|c| ShipmentCheckpoint {
                    time: c.checkpoint_time,
                    message: c.message.or(c.tag).unwrap_or_default(),
                    location: c.location,
                })
                .collect(),
        }
    }
}

// ── Recipe ───────────────────────────────────────────────────────────

impl From<RecipePayload> for Recipe {
    fn from(raw: RecipePayload) -> Self {
        Recipe {
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            image: raw.image,
            url: raw.url,
            time: raw.time,
            servings: raw.servings,
            author: raw
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_owned()),
            updated: raw
                .updated
                .filter(|ts| *ts > 0)
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Format a JSON number with at most one decimal.
pub(crate) fn format_number(value: f64) -> String {
    if (value.fract()).abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// `Value` → small integer code (weather codes, flags).
pub(crate) fn value_as_u8(value: &Value) -> Option<u8> {
    value.as_u64().and_then(|v| u8::try_from(v).ok())
}
