//! Wall clock. Needs no data source; it re-reads the local time on every
//! frame.

use chrono::{DateTime, Local, TimeZone};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use skylight_core::TileDescriptor;

use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::tile_block;

pub struct ClockWidget {
    title: String,
    twelve_hour: bool,
    seconds: bool,
    focused: bool,
}

impl ClockWidget {
    /// Params: `format = "12h" | "24h"` (default 24h), `seconds = bool`.
    pub fn new(tile: &TileDescriptor, _ctx: &WidgetContext) -> Self {
        Self {
            title: tile.display_name(),
            twelve_hour: tile
                .param_str("format")
                .is_some_and(|f| f.eq_ignore_ascii_case("12h")),
            seconds: tile.param_bool("seconds").unwrap_or(false),
            focused: false,
        }
    }

    fn time_text<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let pattern = match (self.twelve_hour, self.seconds) {
            (false, false) => "%H:%M",
            (false, true) => "%H:%M:%S",
            (true, false) => "%-I:%M %p",
            (true, true) => "%-I:%M:%S %p",
        };
        now.format(pattern).to_string()
    }
}

impl Component for ClockWidget {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = tile_block(&self.title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let now = Local::now();
        let lines = vec![
            Line::from(Span::styled(self.time_text(&now), theme::headline())),
            Line::from(Span::styled(
                now.format("%A, %B %-d").to_string(),
                theme::muted(),
            )),
        ];
        let [_, middle, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(inner);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), middle);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "clock"
    }
}
