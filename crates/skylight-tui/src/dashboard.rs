//! Dashboard: mounts one widget per tile of the render tree, lays the
//! bands out, and owns focus.
//!
//! Dropping the dashboard cancels every refresh task its widgets started.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use skylight_core::layout::{FlowBand, GridBand};
use skylight_core::{RenderTree, SizeToken};

use crate::action::Action;
use crate::component::WidgetHandle;
use crate::theme;
use crate::widgets::tile::{render_hint, tile_block};
use crate::widgets::{WidgetContext, WidgetRegistry};

/// Height of the top flow band, borders included.
const TOP_BAND_HEIGHT: u16 = 7;

/// Ratatui constraint for a grid column size.
pub fn constraint(size: SizeToken) -> Constraint {
    match size {
        SizeToken::Fill(n) => Constraint::Fill(n),
        SizeToken::Percent(p) => Constraint::Percentage(p),
        SizeToken::Length(n) => Constraint::Length(n),
    }
}

pub struct Dashboard {
    tree: RenderTree,
    /// Focus order: top, middle, bottom.
    widgets: Vec<WidgetHandle>,
    focus: usize,
    cancel: CancellationToken,
}

impl Dashboard {
    /// Build every widget. `ctx.cancel` becomes the parent of all widget
    /// tasks.
    pub fn new(tree: RenderTree, registry: &WidgetRegistry, ctx: &WidgetContext) -> Self {
        let widgets = tree
            .tiles()
            .into_iter()
            .map(|tile| registry.create(&tile.kind, tile, ctx))
            .collect::<Vec<_>>();
        debug!(widgets = widgets.len(), "dashboard built");
        Self {
            tree,
            widgets,
            focus: 0,
            cancel: ctx.cancel.clone(),
        }
    }

    /// Hand every widget the action sender and start their refresh tasks.
    pub fn init(&mut self, action_tx: &UnboundedSender<Action>) -> Result<()> {
        for widget in &mut self.widgets {
            widget.init(action_tx.clone())?;
        }
        if let Some(first) = self.widgets.first_mut() {
            first.set_focused(true);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// The focused widget is in text-entry mode.
    pub fn captures_input(&self) -> bool {
        self.widgets
            .get(self.focus)
            .is_some_and(|w| w.captures_input())
    }

    pub fn focused_id(&self) -> Option<&str> {
        self.widgets.get(self.focus).map(|w| w.id())
    }

    pub fn focus_next(&mut self) {
        if !self.widgets.is_empty() {
            self.move_focus((self.focus + 1) % self.widgets.len());
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.widgets.is_empty() {
            let len = self.widgets.len();
            self.move_focus((self.focus + len - 1) % len);
        }
    }

    /// Back to the first tile.
    pub fn focus_home(&mut self) {
        if self.focus != 0 && !self.widgets.is_empty() {
            self.move_focus(0);
        }
    }

    fn move_focus(&mut self, to: usize) {
        if let Some(w) = self.widgets.get_mut(self.focus) {
            w.set_focused(false);
        }
        self.focus = to;
        if let Some(w) = self.widgets.get_mut(self.focus) {
            w.set_focused(true);
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.widgets.get_mut(self.focus) {
            Some(widget) => widget.handle_key_event(key),
            None => Ok(None),
        }
    }

    /// Broadcast an action to every widget, collecting follow-ups.
    pub fn update(&mut self, action: &Action) -> Result<Vec<Action>> {
        let mut follow_ups = Vec::new();
        for widget in &mut self.widgets {
            if let Some(next) = widget.update(action)? {
                follow_ups.push(next);
            }
        }
        Ok(follow_ups)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let (top, middle, bottom) = match &self.tree {
            RenderTree::Empty { message } => {
                let block = tile_block("Skylight", false);
                let inner = block.inner(area);
                frame.render_widget(block, area);
                render_hint(frame, inner, message, theme::muted());
                return;
            }
            RenderTree::Bands {
                top,
                middle,
                bottom,
            } => (top, middle, bottom),
        };

        let mut rows = Vec::new();
        if !top.is_empty() {
            rows.push(Constraint::Length(TOP_BAND_HEIGHT));
        }
        if !middle.is_empty() {
            rows.push(Constraint::Fill(3));
        }
        if !bottom.is_empty() {
            rows.push(Constraint::Fill(2));
        }
        let areas = Layout::vertical(rows).split(area);
        let mut areas = areas.iter().copied();
        let mut widgets = self.widgets.iter();

        if !top.is_empty() {
            if let Some(band) = areas.next() {
                render_flow(frame, band, top, &mut widgets);
            }
        }
        for grid in [middle, bottom] {
            if grid.is_empty() {
                continue;
            }
            if let Some(band) = areas.next() {
                render_grid(frame, band, grid, &mut widgets);
            }
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn render_flow<'a>(
    frame: &mut Frame,
    area: Rect,
    band: &FlowBand,
    widgets: &mut impl Iterator<Item = &'a WidgetHandle>,
) {
    let cells = Layout::horizontal(band.tiles.iter().map(|t| Constraint::Length(t.width)))
        .flex(Flex::Start)
        .split(area);
    for (cell, widget) in cells.iter().zip(widgets.by_ref()) {
        widget.render(frame, *cell);
    }
}

fn render_grid<'a>(
    frame: &mut Frame,
    area: Rect,
    band: &GridBand,
    widgets: &mut impl Iterator<Item = &'a WidgetHandle>,
) {
    let cells = Layout::horizontal(band.columns().into_iter().map(constraint)).split(area);
    for (cell, widget) in cells.iter().zip(widgets.by_ref()) {
        widget.render(frame, *cell);
    }
}
