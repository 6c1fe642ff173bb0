//! Widget registry: type tag → constructor.
//!
//! The map is open; [`WidgetRegistry::register`] adds or replaces a tag.
//! A tag nobody registered degrades to a [`PlaceholderWidget`] so one bad
//! tile never takes down the layout.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use skylight_core::{Services, TileDescriptor};

use crate::component::WidgetHandle;
use crate::widgets::{
    calendar::CalendarWidget, clock::ClockWidget, devices::DevicesWidget, note::NoteWidget,
    notifications::NotificationsWidget, placeholder::PlaceholderWidget, recipe::RecipeWidget,
    shipments::ShipmentsWidget, weather::WeatherWidget,
};

/// Everything a widget may need at construction time.
#[derive(Clone)]
pub struct WidgetContext {
    pub services: Services,
    /// Parent token for every task the widget spawns.
    pub cancel: CancellationToken,
}

pub type Constructor = fn(&TileDescriptor, &WidgetContext) -> WidgetHandle;

pub struct WidgetRegistry {
    constructors: HashMap<String, Constructor>,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl WidgetRegistry {
    /// A registry with no tags at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// The built-in tile types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("clock", |tile, ctx| Box::new(ClockWidget::new(tile, ctx)));
        registry.register("weather", |tile, ctx| Box::new(WeatherWidget::new(tile, ctx)));
        registry.register("calendar", |tile, ctx| Box::new(CalendarWidget::new(tile, ctx)));
        registry.register("devices", |tile, ctx| Box::new(DevicesWidget::new(tile, ctx)));
        registry.register("recipe", |tile, ctx| Box::new(RecipeWidget::new(tile, ctx)));
        registry.register("shipments", |tile, ctx| Box::new(ShipmentsWidget::new(tile, ctx)));
        registry.register("notifications", |tile, ctx| {
            Box::new(NotificationsWidget::new(tile, ctx))
        });
        registry.register("note", |tile, ctx| Box::new(NoteWidget::new(tile, ctx)));
        registry
    }

    /// Add a tag, returning the constructor it replaced.
    pub fn register(&mut self, kind: &str, constructor: Constructor) -> Option<Constructor> {
        self.constructors.insert(normalize(kind), constructor)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(&normalize(kind))
    }

    /// Build the widget for `tile`, or a placeholder for an unknown tag.
    pub fn create(&self, kind: &str, tile: &TileDescriptor, ctx: &WidgetContext) -> WidgetHandle {
        match self.constructors.get(&normalize(kind)) {
            Some(constructor) => constructor(tile, ctx),
            None => {
                warn!(kind, "no widget registered for tile type, using placeholder");
                Box::new(PlaceholderWidget::new(tile))
            }
        }
    }
}

fn normalize(kind: &str) -> String {
    kind.trim().to_ascii_lowercase()
}
