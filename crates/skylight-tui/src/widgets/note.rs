//! Shared household note, editable from the kiosk.
//!
//! The editor is a single line; paragraphs are separated by ` / ` while
//! editing and become `<p>` blocks when saved.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;
use tui_input::{Input, InputRequest};

use skylight_core::sources::NoteSource;
use skylight_core::{Synchronizer, TileDescriptor};

use crate::action::{Action, Toast};
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{Feed, period, render_hint, tile_block};

const PARAGRAPH_SEPARATOR: &str = " / ";

pub struct NoteWidget {
    title: String,
    feed: Feed<NoteSource>,
    editor: Option<Input>,
    action_tx: Option<UnboundedSender<Action>>,
    focused: bool,
}

impl NoteWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let config = &ctx.services.config;
        let source = NoteSource::from_config(config, &ctx.services.transport);
        let sync = Synchronizer::from_result(
            source,
            period(tile, config.refresh.note()),
            config.refresh.timeout(),
        );
        Self {
            title: tile.display_name(),
            feed: Feed::new(sync, ctx),
            editor: None,
            action_tx: None,
            focused: false,
        }
    }

    fn start_editing(&mut self) -> Option<Action> {
        if !self.feed.sync().is_configured() {
            return Some(Action::Notify(Toast::info("No note service configured")));
        }
        let current = self
            .feed
            .state()
            .data()
            .map(|note| note.text.lines().collect::<Vec<_>>().join(PARAGRAPH_SEPARATOR))
            .unwrap_or_default();
        self.editor = Some(Input::new(current));
        None
    }

    fn save(&mut self) {
        let Some(editor) = self.editor.take() else {
            return;
        };
        let html = text_to_markup(editor.value());
        let sync = std::sync::Arc::clone(self.feed.sync());
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let toast = match sync.save(&html).await {
                Ok(()) => Toast::success("Note saved"),
                Err(e) => {
                    warn!(error = %e, "note save failed");
                    Toast::error(format!("Note not saved: {e}"))
                }
            };
            if let Some(tx) = tx {
                let _ = tx.send(Action::Notify(toast));
            }
        });
    }

    fn edit_key(editor: &mut Input, key: KeyEvent) {
        let request = match key.code {
            KeyCode::Char(c) => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return,
        };
        let _ = editor.handle(request);
    }
}

/// Editor text to note markup: one escaped `<p>` per paragraph.
fn text_to_markup(text: &str) -> String {
    text.split(PARAGRAPH_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p)))
        .collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Component for NoteWidget {
    fn init(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(action_tx);
        self.feed.start();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(editor) = self.editor.as_mut() {
            match key.code {
                KeyCode::Esc => self.editor = None,
                KeyCode::Enter => self.save(),
                _ => Self::edit_key(editor, key),
            }
            return Ok(None);
        }
        match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Ok(self.start_editing()),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick => self.feed.tick(),
            Action::RefreshFocused if self.focused => self.feed.refresh_now(),
            Action::Idle => self.editor = None,
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.editor.is_some() {
            format!("{} · editing", self.title)
        } else {
            self.title.clone()
        };
        let block = tile_block(&title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(editor) = &self.editor {
            let [input, hint] =
                Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
            let width = usize::from(input.width.max(1));
            let scroll = editor.visual_scroll(width);
            frame.render_widget(
                Paragraph::new(editor.value()).style(theme::body()).scroll((
                    0,
                    u16::try_from(scroll).unwrap_or(u16::MAX),
                )),
                input,
            );
            let cursor = editor.visual_cursor().saturating_sub(scroll);
            frame.set_cursor_position((
                input.x + u16::try_from(cursor).unwrap_or(input.width),
                input.y,
            ));
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("Enter", theme::key_hint_key()),
                    Span::styled(" save  ", theme::key_hint()),
                    Span::styled("Esc", theme::key_hint_key()),
                    Span::styled(" cancel  ", theme::key_hint()),
                    Span::styled("/", theme::key_hint_key()),
                    Span::styled(" new paragraph", theme::key_hint()),
                ])),
                hint,
            );
            return;
        }

        self.feed.render(frame, inner, |frame, area, note| {
            if note.text.is_empty() {
                render_hint(frame, area, "Empty note · press e to write", theme::muted());
            } else {
                frame.render_widget(
                    Paragraph::new(note.text.clone())
                        .style(theme::body())
                        .wrap(Wrap { trim: false }),
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
    }

    fn captures_input(&self) -> bool {
        self.editor.is_some()
    }

    fn id(&self) -> &str {
        "note"
    }
}
