// ── Synchronized sources ──
//
// One `Source` impl per collaborator. Constructors return
// `CoreError::NotConfigured` when the endpoint or credentials are missing;
// `Synchronizer::from_result` turns that into a permanent
// `SourceState::NotConfigured`.

pub mod calendar;
pub mod health;
pub mod note;
pub mod recipe;
pub mod shipments;
pub mod weather;

pub use calendar::{CalendarSettings, CalendarSource};
pub use health::HealthSource;
pub use note::NoteSource;
pub use recipe::RecipeSource;
pub use shipments::ShipmentSource;
pub use weather::WeatherSource;
