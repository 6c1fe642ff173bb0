//! Upcoming events grouped by day.

use chrono::{Local, NaiveDate};
use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedSender;

use skylight_core::sources::CalendarSource;
use skylight_core::{CalendarDay, Synchronizer, TileDescriptor};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{Feed, period, render_hint, tile_block};

pub struct CalendarWidget {
    title: String,
    feed: Feed<CalendarSource>,
    focused: bool,
}

impl CalendarWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let config = &ctx.services.config;
        let source = CalendarSource::from_tile(tile, config, &ctx.services.transport);
        let sync = Synchronizer::from_result(
            source,
            period(tile, config.refresh.calendar()),
            config.refresh.timeout(),
        );
        Self {
            title: tile.display_name(),
            feed: Feed::new(sync, ctx),
            focused: false,
        }
    }
}

fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_owned(),
        1 => "Tomorrow".to_owned(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

fn calendar_lines(days: &[CalendarDay], today: NaiveDate) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for day in days {
        lines.push(Line::from(Span::styled(
            day_label(day.date, today),
            theme::title_style(),
        )));
        for entry in &day.entries {
            let when = entry
                .start
                .map_or_else(|| "all day".to_owned(), |t| t.format("%H:%M").to_string());
            let title_style = if entry.holiday {
                theme::warning()
            } else {
                theme::body()
            };
            let mut spans = vec![
                Span::styled(format!("  {when:<8}"), theme::muted()),
                Span::styled(entry.title.clone(), title_style),
            ];
            if let Some(location) = entry.location.as_deref().filter(|l| !l.is_empty()) {
                spans.push(Span::styled(format!(" · {location}"), theme::muted()));
            }
            lines.push(Line::from(spans));
        }
    }
    lines
}

impl Component for CalendarWidget {
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

        self.feed.render(frame, inner, |frame, area, days| {
            if days.is_empty() {
                render_hint(frame, area, "Nothing scheduled", theme::muted());
            } else {
                let today = Local::now().date_naive();
                frame.render_widget(Paragraph::new(calendar_lines(days, today)), area);
            }
        });
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "calendar"
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;
    use skylight_core::CalendarEntry;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap_or_default()
    }

    #[test]
    fn days_are_labelled_relative_to_today() {
        assert_eq!(day_label(date(19), date(19)), "Today");
        assert_eq!(day_label(date(20), date(19)), "Tomorrow");
        assert_eq!(day_label(date(22), date(19)), "Thu Oct 22");
    }

    #[test]
    fn all_day_entries_have_no_time() {
        let days = vec![CalendarDay {
            date: date(20),
            entries: vec![
                CalendarEntry {
                    title: "Diwali".into(),
                    start: None,
                    end: None,
                    location: None,
                    holiday: true,
                },
                CalendarEntry {
                    title: "Dentist".into(),
                    start: NaiveTime::from_hms_opt(9, 30, 0),
                    end: None,
                    location: Some("Main St".into()),
                    holiday: false,
                },
            ],
        }];

        let text: Vec<String> = calendar_lines(&days, date(19))
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(
            text,
            vec![
                "Tomorrow".to_owned(),
                "  all day Diwali".to_owned(),
                "  09:30   Dentist · Main St".to_owned(),
            ]
        );
    }
}
