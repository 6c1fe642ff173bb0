// skylight-api: async clients for every service the kiosk talks to.

pub mod backend;
pub mod calendar;
pub mod error;
pub mod home;
mod http;
pub mod note;
pub mod notifications;
pub mod push;
pub mod recipe;
pub mod shipments;
pub mod transport;
pub mod weather;

pub use backend::{BackendClient, HealthReport};
pub use calendar::{CalendarClient, EventTime, RawEvent};
pub use error::Error;
pub use home::{EntityState, HomeClient};
pub use note::NoteClient;
pub use notifications::{NotificationClient, RawNotification, derive_push_url};
pub use push::{PushChannel, PushEvent, PushMessage, ReconnectSchedule};
pub use recipe::{RecipeClient, RecipePayload};
pub use shipments::{Checkpoint, ShipmentClient, Tracking};
pub use transport::{TlsMode, TransportConfig};
pub use weather::{ForecastResponse, UnitSystem, WeatherClient, WeatherQuery};
