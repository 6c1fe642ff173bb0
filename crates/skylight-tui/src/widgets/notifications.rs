//! Notification list with the priority summary header.
//!
//! The list arrives from the notification center through the data bridge;
//! `r` asks the center for an immediate refetch.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use skylight_core::{
    Indicator, Notification, NotificationCenter, NotificationFeed, NotificationSummary, Priority,
    TileDescriptor,
};

use crate::action::{Action, Toast};
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{render_hint, tile_block};

pub struct NotificationsWidget {
    title: String,
    center: NotificationCenter,
    feed: NotificationFeed,
    selected: usize,
    /// Flips every tick; drives the pulsing indicator.
    pulse: bool,
    focused: bool,
}

impl NotificationsWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        Self {
            title: tile.display_name(),
            center: ctx.services.notifications.clone(),
            feed: ctx.services.notifications.feed(),
            selected: 0,
            pulse: false,
            focused: false,
        }
    }

    fn list(&self) -> &[Notification] {
        match &self.feed {
            NotificationFeed::Live(list) => list.as_slice(),
            _ => &[],
        }
    }

    fn summary(&self) -> NotificationSummary {
        match &self.feed {
            NotificationFeed::Live(list) => NotificationSummary::from_notifications(list),
            _ => NotificationSummary::unavailable(),
        }
    }

    fn dismiss_selected(&self) -> Option<Action> {
        let notification = self.list().get(self.selected)?;
        if notification.is_dismissible() {
            Some(Action::DismissNotification(notification.id.clone()))
        } else {
            Some(Action::Notify(Toast::info(
                "Recurring reminders cannot be dismissed",
            )))
        }
    }

    fn header(&self) -> Line<'static> {
        let summary = self.summary();
        let (glyph, style) = indicator_glyph(summary.indicator, self.pulse);
        let mut spans = vec![
            Span::styled(format!(" {glyph} "), style),
            Span::styled(summary.label, theme::headline()),
        ];
        if summary.count > 0 {
            spans.push(Span::styled(format!("  {}", summary.count), theme::muted()));
        }
        Line::from(spans)
    }
}

fn indicator_glyph(indicator: Indicator, pulse: bool) -> (&'static str, Style) {
    match indicator {
        Indicator::Pulsing if pulse => ("◉", theme::error()),
        Indicator::Pulsing => ("○", theme::error()),
        Indicator::Steady => ("●", theme::warning()),
        Indicator::Calm => ("●", theme::ok()),
        Indicator::Neutral => ("○", theme::muted()),
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Urgent => theme::error(),
        Priority::Normal => theme::warning(),
        Priority::Info | Priority::None => theme::body(),
    }
}

fn notification_line(notification: &Notification, selected: bool) -> Line<'static> {
    let title_style = if selected {
        theme::row_selected()
    } else {
        priority_style(notification.priority)
    };
    let marker = if notification.recurring { "↻" } else { "•" };
    let mut spans = vec![
        Span::styled(format!(" {marker} "), theme::muted()),
        Span::styled(notification.title.clone(), title_style),
    ];
    if let Some(message) = notification.message.as_deref().filter(|m| !m.is_empty()) {
        spans.push(Span::styled(format!("  {message}"), theme::body()));
    }
    if let Some(due) = notification.target_time.as_deref() {
        spans.push(Span::styled(format!("  due {due}"), theme::muted()));
    }
    Line::from(spans)
}

impl Component for NotificationsWidget {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.list().len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('d') => self.dismiss_selected(),
            KeyCode::Char('D') => {
                if self.list().iter().any(Notification::is_dismissible) {
                    Some(Action::DismissAllNotifications)
                } else {
                    None
                }
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::NotificationsUpdated(feed) => {
                self.feed = feed.clone();
                self.selected = self.selected.min(self.list().len().saturating_sub(1));
            }
            Action::Tick => self.pulse = !self.pulse,
            Action::RefreshFocused if self.focused && self.center.is_configured() => {
                let center = self.center.clone();
                tokio::spawn(async move { center.refresh().await });
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = tile_block(&self.title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);
        frame.render_widget(Paragraph::new(self.header()), header);

        match &self.feed {
            NotificationFeed::NotConfigured => {
                render_hint(frame, body, "Notifications not configured", theme::muted());
            }
            NotificationFeed::Loading => {
                render_hint(frame, body, "Loading...", theme::muted());
            }
            NotificationFeed::Unavailable { message } => {
                render_hint(frame, body, &format!("⚠ {message}"), theme::error());
            }
            NotificationFeed::Live(list) if list.is_empty() => {
                render_hint(frame, body, "Nothing needs your attention", theme::muted());
            }
            NotificationFeed::Live(list) => {
                let lines: Vec<Line> = list
                    .iter()
                    .enumerate()
                    .map(|(i, n)| notification_line(n, self.focused && i == self.selected))
                    .collect();
                frame.render_widget(Paragraph::new(lines), body);
            }
        }
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "notifications"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use skylight_core::{Configuration, Credentials, Services};
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn notification(id: &str, priority: Priority, recurring: bool) -> Notification {
        Notification {
            id: id.into(),
            title: id.into(),
            message: None,
            priority,
            icon: "alert".into(),
            recurring,
            target_time: recurring.then(|| "08:00".to_owned()),
            expires: None,
        }
    }

    fn widget(list: Vec<Notification>) -> NotificationsWidget {
        let ctx = WidgetContext {
            services: Services::new(Configuration::default(), Credentials::default()),
            cancel: CancellationToken::new(),
        };
        let mut widget = NotificationsWidget::new(&TileDescriptor::new("notifications"), &ctx);
        let feed = NotificationFeed::Live(Arc::new(list));
        widget
            .update(&Action::NotificationsUpdated(feed))
            .unwrap_or_default();
        widget
    }

    fn press(widget: &mut NotificationsWidget, c: char) -> Option<Action> {
        widget
            .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .unwrap_or_default()
    }

    fn header_text(widget: &NotificationsWidget) -> String {
        widget.header().spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn starts_not_configured_without_endpoint() {
        let ctx = WidgetContext {
            services: Services::new(Configuration::default(), Credentials::default()),
            cancel: CancellationToken::new(),
        };
        let widget = NotificationsWidget::new(&TileDescriptor::new("notifications"), &ctx);
        assert_eq!(widget.feed, NotificationFeed::NotConfigured);
        assert_eq!(header_text(&widget), " ○ Notifications");
    }

    #[test]
    fn urgent_header_pulses_between_ticks() {
        let mut w = widget(vec![notification("leak", Priority::Urgent, false)]);
        let first = header_text(&w);
        w.update(&Action::Tick).unwrap_or_default();
        let second = header_text(&w);

        assert!(first.contains("Urgent"));
        assert_ne!(first, second);
    }

    #[test]
    fn empty_list_is_all_clear() {
        let w = widget(Vec::new());
        assert_eq!(header_text(&w), " ● All Clear");
    }

    #[test]
    fn recurring_reminders_are_not_dismissed() {
        let mut w = widget(vec![
            notification("meds", Priority::Normal, true),
            notification("parcel", Priority::Info, false),
        ]);
        assert_eq!(
            press(&mut w, 'd'),
            Some(Action::Notify(Toast::info(
                "Recurring reminders cannot be dismissed"
            )))
        );
        press(&mut w, 'j');
        assert_eq!(
            press(&mut w, 'd'),
            Some(Action::DismissNotification("parcel".into()))
        );
    }

    #[test]
    fn dismiss_all_needs_something_dismissible() {
        let mut w = widget(vec![notification("meds", Priority::Normal, true)]);
        assert_eq!(press(&mut w, 'D'), None);
    }

    #[test]
    fn due_time_is_shown_for_reminders() {
        let line = notification_line(&notification("meds", Priority::Normal, true), false);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " ↻ meds  due 08:00");
    }
}
