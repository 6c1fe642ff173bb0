//! Parcels in transit, with a detail view per shipment.
//!
//! The list shows only active shipments, but the detail view addresses the
//! full cached board by index so it survives a refresh that reorders or
//! delivers other parcels.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;

use skylight_core::sources::ShipmentSource;
use skylight_core::{Shipment, ShipmentBoard, Synchronizer, TileDescriptor};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{Feed, period, render_hint, tile_block};

pub struct ShipmentsWidget {
    title: String,
    feed: Feed<ShipmentSource>,
    /// Position in the active list.
    selected: usize,
    /// Cache index of the shipment whose detail is open.
    detail: Option<usize>,
    focused: bool,
}

impl ShipmentsWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let services = &ctx.services;
        let source =
            ShipmentSource::from_config(&services.config, &services.credentials, &services.transport);
        let sync = Synchronizer::from_result(
            source,
            period(tile, services.config.refresh.shipments()),
            services.config.refresh.timeout(),
        );
        Self {
            title: tile.display_name(),
            feed: Feed::new(sync, ctx),
            selected: 0,
            detail: None,
            focused: false,
        }
    }

    fn active_count(&self) -> usize {
        self.feed
            .state()
            .data()
            .map_or(0, |board| board.active_indices().len())
    }

    fn open_detail(&mut self) {
        let index = self
            .feed
            .state()
            .data()
            .and_then(|board| board.active_indices().get(self.selected).copied());
        self.detail = index;
    }

    fn heading(&self) -> String {
        match self.feed.state().data() {
            Some(board) => format!("{} · {}", self.title, board.active_label()),
            None => self.title.clone(),
        }
    }
}

fn list_lines(board: &ShipmentBoard, selected: usize, focused: bool) -> Vec<Line<'static>> {
    board
        .active()
        .enumerate()
        .map(|(i, shipment)| {
            let name_style = if focused && i == selected {
                theme::row_selected()
            } else {
                theme::body()
            };
            let mut spans = vec![
                Span::styled(format!(" {} ", shipment.display_name()), name_style),
                Span::styled(shipment.status_label(), theme::muted()),
            ];
            if let Some(eta) = shipment.expected_delivery.as_deref() {
                spans.push(Span::styled(format!(" · due {eta}"), theme::muted()));
            }
            Line::from(spans)
        })
        .collect()
}

fn detail_lines(shipment: &Shipment) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(shipment.display_name().to_owned(), theme::headline())),
        Line::from(vec![
            Span::styled(format!("{} ", shipment.slug), theme::muted()),
            Span::styled(shipment.tracking_number.clone(), theme::body()),
        ]),
        Line::from(Span::styled(shipment.status_label(), theme::ok())),
    ];
    if let Some(eta) = shipment.expected_delivery.as_deref() {
        lines.push(Line::from(Span::styled(format!("Expected {eta}"), theme::body())));
    }
    lines.push(Line::default());
    for checkpoint in shipment.checkpoints.iter().rev() {
        let mut spans = Vec::new();
        if let Some(time) = checkpoint.time.as_deref() {
            spans.push(Span::styled(format!("{time}  "), theme::muted()));
        }
        spans.push(Span::styled(checkpoint.message.clone(), theme::body()));
        if let Some(location) = checkpoint.location.as_deref() {
            spans.push(Span::styled(format!(" · {location}"), theme::muted()));
        }
        lines.push(Line::from(spans));
    }
    lines
}

impl Component for ShipmentsWidget {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        self.feed.start();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.detail.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
                self.detail = None;
            }
            return Ok(None);
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.active_count() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => self.open_detail(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => {
                self.feed.tick();
                self.selected = self.selected.min(self.active_count().saturating_sub(1));
            }
            Action::RefreshFocused if self.focused => self.feed.refresh_now(),
            Action::Idle => {
                self.detail = None;
                self.selected = 0;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self.heading();
        let block = tile_block(&title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        self.feed.render(frame, inner, |frame, area, board| {
            if let Some(index) = self.detail {
                match board.get(index) {
                    Some(shipment) => frame.render_widget(
                        Paragraph::new(detail_lines(shipment)).wrap(Wrap { trim: true }),
                        area,
                    ),
                    None => render_hint(frame, area, "Shipment no longer tracked", theme::muted()),
                }
            } else if board.active().next().is_none() {
                render_hint(frame, area, "No active shipments", theme::muted());
            } else {
                frame.render_widget(
                    Paragraph::new(list_lines(board, self.selected, self.focused)),
                    area,
                );
            }
        });
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.detail = None;
        }
    }

    fn id(&self) -> &str {
        "shipments"
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use skylight_core::model::ShipmentCheckpoint;

    use super::*;

    fn shipment(id: &str, tag: &str) -> Shipment {
        Shipment {
            id: id.into(),
            tag: tag.into(),
            slug: "ups".into(),
            tracking_number: format!("1Z{id}"),
            ..Shipment::default()
        }
    }

    fn text(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn delivered_parcels_are_not_listed() {
        let board = ShipmentBoard::new(vec![
            shipment("a", "Delivered"),
            shipment("b", "OutForDelivery"),
        ]);
        assert_eq!(text(&list_lines(&board, 0, false)), vec![" 1Zb Out for delivery"]);
    }

    #[test]
    fn detail_lists_latest_checkpoint_first() {
        let mut parcel = shipment("a", "InTransit");
        parcel.checkpoints = vec![
            ShipmentCheckpoint {
                time: None,
                message: "Label created".into(),
                location: None,
            },
            ShipmentCheckpoint {
                time: None,
                message: "Departed facility".into(),
                location: Some("Louisville, KY".into()),
            },
        ];
        let lines = text(&detail_lines(&parcel));
        assert_eq!(lines[lines.len() - 2], "Departed facility · Louisville, KY");
        assert_eq!(lines[lines.len() - 1], "Label created");
    }
}
