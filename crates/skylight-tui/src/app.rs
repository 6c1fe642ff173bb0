//! Application core: the event loop, focus routing and action dispatch.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use skylight_core::{CommandOutcome, LayoutEngine, Services};

use crate::action::{Action, DeviceRequest, Toast};
use crate::dashboard::Dashboard;
use crate::data_bridge::run_data_bridge;
use crate::event::{Cadence, Event, EventReader};
use crate::status_bar::StatusBar;
use crate::tui::Tui;
use crate::widgets::{WidgetContext, WidgetRegistry};

/// Why the event loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// Rebuild everything from a freshly loaded configuration.
    Reload,
}

/// Top-level application state and event loop.
pub struct App {
    services: Services,
    dashboard: Dashboard,
    status_bar: StatusBar,
    /// Set once the loop should stop.
    exit: Option<Exit>,
    /// Action sender. Widgets and spawned commands dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver, drained by the main loop.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Parent of every task this client load starts.
    cancel: CancellationToken,
}

impl App {
    /// Compose the dashboard for `services.config`. Nothing is spawned
    /// until [`App::run`].
    pub fn new(services: Services) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let ctx = WidgetContext {
            services: services.clone(),
            cancel: cancel.child_token(),
        };

        let tree = LayoutEngine::build(&services.config.layout);
        let dashboard = Dashboard::new(tree, &WidgetRegistry::default(), &ctx);
        let status_bar = StatusBar::new(&ctx);

        Self {
            services,
            dashboard,
            status_bar,
            exit: None,
            action_tx,
            action_rx,
            cancel,
        }
    }

    /// Run the main event loop until quit or reload.
    pub async fn run(&mut self) -> Result<Exit> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        self.dashboard.init(&self.action_tx)?;
        self.status_bar.start();

        let services = self.services.clone();
        let tx = self.action_tx.clone();
        let cancel = self.cancel.child_token();
        tokio::spawn(async move {
            run_data_bridge(services, tx, cancel).await;
        });

        let mut events = EventReader::spawn(
            Cadence::from_refresh(&self.services.config.refresh),
            self.cancel.child_token(),
        );

        info!("kiosk event loop started");

        while self.exit.is_none() {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Redraw => {
                    tui.clear()?;
                    self.action_tx.send(Action::Render)?;
                }
                Event::Frame => self.action_tx.send(Action::Render)?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Idle => self.action_tx.send(Action::Idle)?,
            }

            // Drain everything queued before waiting again.
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if matches!(action, Action::Render) {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.cancel.cancel();
        info!(exit = ?self.exit, "kiosk event loop ended");
        Ok(self.exit.unwrap_or(Exit::Quit))
    }

    /// Map a key event to an action. A widget in text-entry mode gets every
    /// key except Ctrl+C; otherwise global keys win and the rest go to the
    /// focused tile.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }
        if self.dashboard.captures_input() {
            return self.dashboard.handle_key_event(key);
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => return Ok(Some(Action::Reload)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::RefreshFocused)),
            (KeyModifiers::NONE, KeyCode::Tab) => return Ok(Some(Action::FocusNext)),
            (_, KeyCode::BackTab) => return Ok(Some(Action::FocusPrev)),
            _ => {}
        }

        self.dashboard.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to widgets.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.exit = Some(Exit::Quit),
            Action::Reload => self.exit = Some(Exit::Reload),
            Action::FocusNext => self.dashboard.focus_next(),
            Action::FocusPrev => self.dashboard.focus_prev(),
            Action::Idle => self.dashboard.focus_home(),
            Action::DeviceCommand { id, request } => self.run_device_command(id.clone(), *request),
            Action::DismissNotification(id) => self.dismiss(Some(id.clone())),
            Action::DismissAllNotifications => self.dismiss(None),
            _ => {}
        }

        self.status_bar.update(action);
        for follow_up in self.dashboard.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn run_device_command(&self, id: String, request: DeviceRequest) {
        let devices = self.services.devices.clone();
        tokio::spawn(async move {
            let result = match request {
                DeviceRequest::Toggle => devices.toggle(&id).await,
                DeviceRequest::Brightness(value) => devices.set_brightness(&id, value).await,
            };
            match result {
                Ok(CommandOutcome::Applied) => debug!(device = %id, ?request, "device command applied"),
                Ok(CommandOutcome::Dropped) => {
                    debug!(device = %id, ?request, "device busy, command dropped");
                }
                // The device row shows the reverted state and its error.
                Err(e) => warn!(device = %id, error = %e, "device command failed"),
            }
        });
    }

    /// Dismiss one notification, or every dismissible one when `id` is
    /// `None`.
    fn dismiss(&self, id: Option<String>) {
        let center = self.services.notifications.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let toast = match id {
                Some(id) => match center.dismiss(&id).await {
                    Ok(()) => Toast::success("Dismissed"),
                    Err(e) => Toast::error(format!("Dismiss failed: {e}")),
                },
                None => match center.dismiss_all().await {
                    Ok(count) => Toast::success(format!("Dismissed {count}")),
                    Err(e) => Toast::error(format!("Dismiss failed: {e}")),
                },
            };
            let _ = tx.send(Action::Notify(toast));
        });
    }

    fn render(&self, frame: &mut Frame) {
        let [content, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
        self.dashboard.render(frame, content);
        self.status_bar.render(frame, status);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
