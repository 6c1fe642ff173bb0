//! Stand-in for a tile whose type has no registered widget.

use ratatui::{Frame, layout::Rect};

use skylight_core::TileDescriptor;

use crate::component::Component;
use crate::theme;
use crate::widgets::tile::{render_hint, tile_block};

pub struct PlaceholderWidget {
    title: String,
    kind: String,
    focused: bool,
}

impl PlaceholderWidget {
    pub fn new(tile: &TileDescriptor) -> Self {
        Self {
            title: tile.display_name(),
            kind: tile.kind.clone(),
            focused: false,
        }
    }
}

impl Component for PlaceholderWidget {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = tile_block(&self.title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let hint = if self.kind.trim().is_empty() {
            "Tile has no type".to_owned()
        } else {
            format!("Unknown tile type \"{}\"", self.kind)
        };
        render_hint(frame, inner, &hint, theme::muted());
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "placeholder"
    }
}
