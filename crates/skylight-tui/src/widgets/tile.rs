//! Shared tile plumbing: borders, refresh periods, and the synchronized
//! feed every data tile renders from.

use std::sync::Arc;
use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use skylight_core::{Source, SourceState, Synchronizer, TileDescriptor};

use crate::theme;
use crate::widgets::registry::WidgetContext;

/// Rounded tile border with the focus color applied.
pub fn tile_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        theme::border_focused()
    } else {
        theme::border_default()
    };
    Block::default()
        .title(Span::styled(format!(" {title} "), theme::title_style()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
}

/// The tile's `refresh` override, else the configured default.
pub fn period(tile: &TileDescriptor, default: Duration) -> Duration {
    tile.refresh_override().unwrap_or(default)
}

/// One dimmed, centered line. Used for not-configured and empty states.
pub fn render_hint(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_owned(), style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        middle,
    );
}

// ── Feed ────────────────────────────────────────────────────────────

/// A tile's synchronizer plus the receiver it renders from.
///
/// The refresh task runs on a child of the dashboard's token, so a reload
/// stops it along with every other tile.
pub struct Feed<S: Source> {
    sync: Arc<Synchronizer<S>>,
    state: watch::Receiver<SourceState<S::Output>>,
    cancel: CancellationToken,
    throbber: ThrobberState,
}

impl<S: Source> Feed<S> {
    pub fn new(sync: Synchronizer<S>, ctx: &WidgetContext) -> Self {
        let state = sync.subscribe();
        Self {
            sync: Arc::new(sync),
            state,
            cancel: ctx.cancel.child_token(),
            throbber: ThrobberState::default(),
        }
    }

    /// Start the periodic refresh task. Unconfigured sources start nothing.
    pub fn start(&self) {
        if self.sync.spawn(self.cancel.clone()).is_some() {
            debug!(source = S::NAME, period = ?self.sync.period(), "tile refresh started");
        }
    }

    /// One out-of-band refresh, e.g. on `r`. A no-op while another refresh
    /// of this tile is still running.
    pub fn refresh_now(&self) {
        if !self.sync.is_configured() {
            return;
        }
        let sync = Arc::clone(&self.sync);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = sync.refresh() => {}
            }
        });
    }

    pub fn sync(&self) -> &Arc<Synchronizer<S>> {
        &self.sync
    }

    pub fn state(&self) -> watch::Ref<'_, SourceState<S::Output>> {
        self.state.borrow()
    }

    /// Advance the loading animation.
    pub fn tick(&mut self) {
        if self.state.borrow().is_loading() {
            self.throbber.calc_next();
        }
    }

    /// Render the degraded states, delegating fresh and stale data to
    /// `body`. Stale data gets a one-line error footer.
    pub fn render<F>(&self, frame: &mut Frame, area: Rect, body: F)
    where
        F: FnOnce(&mut Frame, Rect, &S::Output),
    {
        let state = self.state.borrow();
        match &*state {
            SourceState::NotConfigured { reason } => {
                render_hint(frame, area, reason, theme::muted());
            }
            SourceState::Loading => {
                let [_, line, _] = Layout::vertical([
                    Constraint::Fill(1),
                    Constraint::Length(1),
                    Constraint::Fill(1),
                ])
                .areas(area);
                let throbber = Throbber::default()
                    .label(" Loading...")
                    .style(theme::muted())
                    .throbber_style(Style::default().fg(theme::SKY_BLUE));
                frame.render_stateful_widget(throbber, line, &mut self.throbber.clone());
            }
            SourceState::Ready { data, .. } => body(frame, area, data),
            SourceState::Failed {
                message,
                stale: Some(data),
            } => {
                let [content, footer] =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
                body(frame, content, data);
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled("⚠ ", theme::warning()),
                        Span::styled(message.clone(), theme::muted()),
                    ])),
                    footer,
                );
            }
            SourceState::Failed {
                message,
                stale: None,
            } => render_hint(frame, area, &format!("⚠ {message}"), theme::error()),
        }
    }
}
