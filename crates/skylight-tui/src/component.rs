//! The `Component` trait every tile implements.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Every tile implements Component.
///
/// Lifecycle: `init` → (`handle_key_event` | `update` | `render`)*
pub trait Component: Send {
    /// Called once when the dashboard is mounted.
    /// Receives the action sender for dispatching actions to the app loop.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Handle a keyboard event while focused. Return an Action to dispatch,
    /// or None.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Render into the provided frame area.
    fn render(&self, frame: &mut Frame, area: Rect);

    fn focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);

    /// While true, every key goes to this component (text entry).
    fn captures_input(&self) -> bool {
        false
    }

    /// The tile's type tag.
    fn id(&self) -> &str;
}

/// A constructed tile.
pub type WidgetHandle = Box<dyn Component>;
