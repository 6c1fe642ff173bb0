//! All possible UI actions. Actions are the sole mechanism for state mutation.

use skylight_core::{ChannelStatus, NotificationFeed};

/// A device command requested from the devices tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRequest {
    Toggle,
    /// Target percentage; clamped by the device core.
    Brightness(i32),
}

/// Toast severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// A transient status bar message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Info,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: ToastLevel::Error,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Lifecycle ──
    Quit,
    /// Tear everything down and rebuild from a freshly loaded config.
    Reload,
    Tick,
    Render,
    /// Nobody has touched the keyboard for a while.
    Idle,

    // ── Focus ──
    FocusNext,
    FocusPrev,
    /// Force a refresh of the focused tile.
    RefreshFocused,

    // ── Data updates (from the data bridge) ──
    NotificationsUpdated(NotificationFeed),
    ChannelUpdated(ChannelStatus),
    DevicesChanged,

    // ── Commands ──
    DeviceCommand { id: String, request: DeviceRequest },
    DismissNotification(String),
    DismissAllNotifications,

    // ── Status bar ──
    Notify(Toast),
}
