//! Bottom status line: push channel, notification summary, backend health,
//! transient toasts and key hints.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use skylight_api::HealthReport;
use skylight_core::sources::HealthSource;
use skylight_core::{
    ChannelStatus, Indicator, NotificationFeed, NotificationSummary, SourceState, Synchronizer,
};

use crate::action::{Action, Toast, ToastLevel};
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::Feed;

/// How long a toast stays up.
const TOAST_TTL: Duration = Duration::from_secs(3);

pub struct StatusBar {
    channel: ChannelStatus,
    summary: Option<NotificationSummary>,
    health: Feed<HealthSource>,
    toast: Option<(Toast, Instant)>,
}

impl StatusBar {
    pub fn new(ctx: &WidgetContext) -> Self {
        let config = &ctx.services.config;
        let source = HealthSource::from_config(config, &ctx.services.transport);
        let sync =
            Synchronizer::from_result(source, config.refresh.health(), config.refresh.timeout());
        Self {
            channel: ChannelStatus::Disabled,
            summary: None,
            health: Feed::new(sync, ctx),
            toast: None,
        }
    }

    /// Start polling backend health.
    pub fn start(&self) {
        self.health.start();
    }

    pub fn update(&mut self, action: &Action) {
        match action {
            Action::ChannelUpdated(status) => self.channel = status.clone(),
            Action::NotificationsUpdated(feed) => {
                self.summary = match feed {
                    NotificationFeed::Live(list) => {
                        Some(NotificationSummary::from_notifications(list))
                    }
                    NotificationFeed::Unavailable { .. } => Some(NotificationSummary::unavailable()),
                    NotificationFeed::NotConfigured | NotificationFeed::Loading => None,
                };
            }
            Action::Notify(toast) => self.toast = Some((toast.clone(), Instant::now())),
            Action::Tick => {
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_TTL)
                {
                    self.toast = None;
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];

        if let Some((toast, _)) = &self.toast {
            let (icon, style) = match toast.level {
                ToastLevel::Success => ("✓", theme::ok()),
                ToastLevel::Error => ("✗", theme::error()),
                ToastLevel::Info => ("·", theme::body()),
            };
            spans.push(Span::styled(format!("{icon} {}", toast.message), style));
            frame.render_widget(Paragraph::new(Line::from(spans)), area);
            return;
        }

        spans.extend(self.indicator_spans());
        spans.push(Span::styled(" │ ", theme::key_hint()));
        for (key, label) in [
            ("tab", "focus"),
            ("r", "refresh"),
            ("^R", "reload"),
            ("q", "quit"),
        ] {
            spans.push(Span::styled(key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn indicator_spans(&self) -> Vec<Span<'static>> {
        let mut spans = vec![channel_span(&self.channel)];

        if let Some(summary) = &self.summary {
            let style = match summary.indicator {
                Indicator::Pulsing => theme::error(),
                Indicator::Steady => theme::warning(),
                Indicator::Calm => theme::ok(),
                Indicator::Neutral => theme::muted(),
            };
            spans.push(Span::styled("  ", theme::muted()));
            spans.push(Span::styled(summary.label.clone(), style));
        }

        if let Some(span) = health_span(&self.health.state()) {
            spans.push(Span::styled("  ", theme::muted()));
            spans.push(span);
        }
        spans
    }
}

fn channel_span(status: &ChannelStatus) -> Span<'static> {
    match status {
        ChannelStatus::Disabled => Span::styled("○ push off", theme::muted()),
        ChannelStatus::Connecting => Span::styled("◐ connecting", theme::warning()),
        ChannelStatus::Connected => Span::styled("● live", theme::ok()),
        ChannelStatus::Disconnected { .. } => Span::styled("○ reconnecting", theme::error()),
    }
}

fn health_span(state: &SourceState<HealthReport>) -> Option<Span<'static>> {
    match state {
        SourceState::NotConfigured { .. } => None,
        SourceState::Loading => Some(Span::styled("backend …", theme::muted())),
        SourceState::Ready { data, .. } if data.status.eq_ignore_ascii_case("ok") => {
            Some(Span::styled("backend ok", theme::ok()))
        }
        SourceState::Ready { .. } | SourceState::Failed { .. } => {
            Some(Span::styled("backend down", theme::error()))
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skylight_core::{Configuration, Credentials, Services};
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn status_bar() -> StatusBar {
        let ctx = WidgetContext {
            services: Services::new(Configuration::default(), Credentials::default()),
            cancel: CancellationToken::new(),
        };
        StatusBar::new(&ctx)
    }

    fn indicator_text(bar: &StatusBar) -> String {
        bar.indicator_spans()
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn unconfigured_backend_is_hidden() {
        assert_eq!(indicator_text(&status_bar()), "○ push off");
    }

    #[test]
    fn channel_and_summary_follow_actions() {
        let mut bar = status_bar();
        bar.update(&Action::ChannelUpdated(ChannelStatus::Connected));
        bar.update(&Action::NotificationsUpdated(NotificationFeed::Live(
            std::sync::Arc::new(Vec::new()),
        )));
        assert_eq!(indicator_text(&bar), "● live  All Clear");
    }

    #[test]
    fn health_reflects_report_status() {
        let report = |status: &str| HealthReport {
            status: status.into(),
            services: Vec::new(),
            devices_configured: None,
            notifications_count: None,
            recurring_count: None,
        };
        let ready = |status| SourceState::Ready {
            data: report(status),
            fetched_at: chrono::Utc::now(),
        };

        let text = |state| health_span(&state).map(|s| s.content.into_owned());
        assert_eq!(text(ready("ok")).as_deref(), Some("backend ok"));
        assert_eq!(text(ready("degraded")).as_deref(), Some("backend down"));
        assert_eq!(
            text(SourceState::Failed {
                message: "timeout".into(),
                stale: None
            })
            .as_deref(),
            Some("backend down")
        );
    }

    #[test]
    fn toast_expires_after_ttl() {
        let mut bar = status_bar();
        bar.update(&Action::Notify(Toast::success("Note saved")));
        bar.update(&Action::Tick);
        assert!(bar.toast.is_some());

        if let Some((_, shown)) = bar.toast.as_mut() {
            *shown = Instant::now().checked_sub(TOAST_TTL).unwrap_or_else(Instant::now);
        }
        bar.update(&Action::Tick);
        assert!(bar.toast.is_none());
    }
}
