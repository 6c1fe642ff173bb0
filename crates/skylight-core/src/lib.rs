// skylight-core: data synchronization and widget composition between
// skylight-api and the kiosk surface.

pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod layout;
pub mod model;
pub mod notify;
pub mod services;
pub mod sources;
pub mod sync;

mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    ApiConfig, Configuration, Credentials, DeviceConfig, LayoutConfig, RefreshConfig,
    TileDescriptor,
};
pub use device::DeviceControl;
pub use error::CoreError;
pub use layout::{LayoutEngine, RenderTree, SizeToken};
pub use notify::{ChannelStatus, NotificationCenter, NotificationFeed};
pub use services::Services;
pub use sync::{FailurePolicy, Source, SourceState, Synchronizer};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Devices
    CommandOutcome, ControlState, Device, DeviceKind, DeviceStatus, Intent,
    // Notifications
    Indicator, Notification, NotificationSummary, Priority,
    // Content
    CalendarDay, CalendarEntry, Note, Recipe, Shipment, ShipmentBoard, Weather,
};
