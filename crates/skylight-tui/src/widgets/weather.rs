//! Current conditions and the short-range forecast.

use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedSender;

use skylight_core::model::Weather;
use skylight_core::sources::WeatherSource;
use skylight_core::{Synchronizer, TileDescriptor};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{Feed, period, tile_block};

pub struct WeatherWidget {
    title: String,
    feed: Feed<WeatherSource>,
    focused: bool,
}

impl WeatherWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let config = &ctx.services.config;
        let source = WeatherSource::from_tile(tile, config, &ctx.services.transport);
        let sync = Synchronizer::from_result(
            source,
            period(tile, config.refresh.weather()),
            config.refresh.timeout(),
        );
        Self {
            title: tile.display_name(),
            feed: Feed::new(sync, ctx),
            focused: false,
        }
    }
}

fn weather_lines(weather: &Weather) -> Vec<Line<'static>> {
    let unit = weather.temperature_unit();
    let temperature = weather
        .temperature
        .map_or_else(|| "--".to_owned(), |t| format!("{t:.0}{unit}"));

    let mut lines = vec![Line::from(vec![
        Span::styled(temperature, theme::headline()),
        Span::raw("  "),
        Span::styled(weather.description(), theme::body()),
    ])];

    if !weather.readings.is_empty() {
        let mut spans = Vec::new();
        for (i, reading) in weather.readings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" · ", theme::muted()));
            }
            spans.push(Span::styled(
                format!("{} ", reading.condition.label()),
                theme::muted(),
            ));
            spans.push(Span::styled(reading.value.clone(), theme::body()));
        }
        lines.push(Line::from(spans));
    }

    for day in &weather.daily {
        let high = day.high.map_or_else(|| "--".to_owned(), |h| format!("{h:.0}°"));
        let low = day.low.map_or_else(|| "--".to_owned(), |l| format!("{l:.0}°"));
        let description = day.code.map_or("", skylight_core::model::weather::describe_code);
        lines.push(Line::from(vec![
            Span::styled(day.date.format("%a ").to_string(), theme::muted()),
            Span::styled(format!("{high:>4} / {low:<4}"), theme::body()),
            Span::styled(format!(" {description}"), theme::muted()),
        ]));
    }

    lines
}

impl Component for WeatherWidget {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        self.feed.start();
        Ok(())
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.feed.tick(),
            Action::RefreshFocused if self.focused => self.feed.refresh_now(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = tile_block(&self.title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.feed.render(frame, inner, |frame, area, weather| {
            frame.render_widget(Paragraph::new(weather_lines(weather)), area);
        });
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "weather"
    }
}
