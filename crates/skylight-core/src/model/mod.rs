// ── Domain model ──
//
// Canonical types rendered by the widgets, converted from the raw
// collaborator payloads in `crate::convert`.

pub mod calendar;
pub mod device;
pub mod note;
pub mod notification;
pub mod recipe;
pub mod shipment;
pub mod weather;

pub use calendar::{CalendarDay, CalendarEntry};
pub use device::{CommandOutcome, ControlState, Device, DeviceKind, DeviceStatus, Intent};
pub use note::Note;
pub use notification::{Indicator, Notification, NotificationSummary, Priority};
pub use recipe::Recipe;
pub use shipment::{Shipment, ShipmentBoard, ShipmentCheckpoint};
pub use weather::{Condition, ConditionReading, DailyForecast, Weather};
