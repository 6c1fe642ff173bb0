//! Dashboard tiles.
//!
//! Every tile type is a [`Component`](crate::component::Component) built by
//! the [`WidgetRegistry`](registry::WidgetRegistry) from its
//! [`TileDescriptor`](skylight_core::TileDescriptor).

pub mod calendar;
pub mod clock;
pub mod devices;
pub mod note;
pub mod notifications;
pub mod placeholder;
pub mod recipe;
pub mod registry;
pub mod shipments;
pub mod tile;
pub mod weather;

pub use registry::{WidgetContext, WidgetRegistry};
