//! Smart-home devices: on/off state, brightness, and keyboard control.
//!
//! Commands go out as [`Action::DeviceCommand`]; the app runs them against
//! the device core. Rows render from the core's live records, so optimistic
//! writes, pending markers and reconciled state show up without any
//! bookkeeping here.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use skylight_core::{ControlState, Device, DeviceControl, DeviceStatus, Intent, TileDescriptor};

use crate::action::{Action, DeviceRequest};
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{render_hint, tile_block};

/// Brightness change per `-` / `+` press, in percent.
const BRIGHTNESS_STEP: i32 = 10;

pub struct DevicesWidget {
    title: String,
    control: DeviceControl,
    /// Explicit subset from the tile's `devices` param.
    filter: Option<Vec<String>>,
    rows: Vec<Arc<Device>>,
    selected: usize,
    focused: bool,
}

impl DevicesWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let filter = Some(tile.param_list("devices")).filter(|ids| !ids.is_empty());
        let control = ctx.services.devices.clone();
        let rows = control.devices(filter.as_deref());
        Self {
            title: tile.display_name(),
            control,
            filter,
            rows,
            selected: 0,
            focused: false,
        }
    }

    fn selected_device(&self) -> Option<&Arc<Device>> {
        self.rows.get(self.selected)
    }

    fn command(&self, request: DeviceRequest) -> Option<Action> {
        self.selected_device().map(|device| Action::DeviceCommand {
            id: device.id.clone(),
            request,
        })
    }

    fn brightness_step(&self, delta: i32) -> Option<Action> {
        let device = self.selected_device()?;
        if !device.kind.supports_brightness() {
            return None;
        }
        let current = if device.status.is_on() {
            i32::from(device.status.brightness().unwrap_or(100))
        } else {
            0
        };
        self.command(DeviceRequest::Brightness(current + delta))
    }

    fn device_line(&self, device: &Device, selected: bool) -> Line<'static> {
        let pending = self.control.control_state(&device.id);
        let (marker, marker_style) = match (&pending, &device.status) {
            (ControlState::Pending(_), _) => ("◌", theme::warning()),
            (_, DeviceStatus::Error(_)) => ("✗", theme::error()),
            (_, status) if status.is_on() => ("●", theme::ok()),
            _ => ("○", theme::muted()),
        };
        let name_style = if selected && self.focused {
            theme::row_selected()
        } else {
            theme::body()
        };
        Line::from(vec![
            Span::styled(format!(" {marker} "), marker_style),
            Span::styled(format!("{} ", icon_glyph(&device.icon)), theme::muted()),
            Span::styled(device.name.clone(), name_style),
            Span::styled(format!("  {}", state_label(&device.status, pending)), theme::muted()),
        ])
    }
}

fn icon_glyph(icon: &str) -> &'static str {
    match icon {
        "bulb" | "lightbulb" | "lamp" => "☼",
        "plug" | "outlet" | "power" => "⏻",
        "fan" => "✣",
        _ => "•",
    }
}

fn state_label(status: &DeviceStatus, pending: ControlState) -> String {
    if let ControlState::Pending(intent) = pending {
        return match intent {
            Intent::TurnOn => "turning on...".to_owned(),
            Intent::TurnOff => "turning off...".to_owned(),
            Intent::SetBrightness(p) => format!("dimming to {p}%..."),
        };
    }
    match status {
        DeviceStatus::Unknown => "unknown".to_owned(),
        DeviceStatus::NotConfigured => "not configured".to_owned(),
        DeviceStatus::Error(_) => "unavailable".to_owned(),
        DeviceStatus::Known {
            on: true,
            brightness: Some(b),
            ..
        } => format!("on {b}%"),
        DeviceStatus::Known { on: true, .. } => "on".to_owned(),
        DeviceStatus::Known { on: false, .. } => "off".to_owned(),
    }
}

impl Component for DevicesWidget {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.command(DeviceRequest::Toggle),
            KeyCode::Char('-') => self.brightness_step(-BRIGHTNESS_STEP),
            KeyCode::Char('+' | '=') => self.brightness_step(BRIGHTNESS_STEP),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::DevicesChanged => {
                self.rows = self.control.devices(self.filter.as_deref());
                self.selected = self.selected.min(self.rows.len().saturating_sub(1));
            }
            Action::RefreshFocused if self.focused && self.control.is_configured() => {
                let control = self.control.clone();
                tokio::spawn(async move { control.refresh_all().await });
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = tile_block(&self.title, self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.rows.is_empty() {
            render_hint(frame, inner, "No devices configured", theme::muted());
            return;
        }
        if !self.control.is_configured() {
            render_hint(frame, inner, "Device control not configured", theme::muted());
            return;
        }

        let [list, footer] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);

        // Re-read each record so pending markers never lag a frame behind.
        let lines: Vec<Line> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let device = self.control.device(&row.id).unwrap_or_else(|| Arc::clone(row));
                self.device_line(&device, i == self.selected)
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), list);

        let last_error = self
            .selected_device()
            .and_then(|row| self.control.device(&row.id))
            .and_then(|d| d.last_error.clone().or_else(|| d.status.error().map(str::to_owned)));
        if let Some(error) = last_error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" ⚠ {error}"), theme::error())),
                footer,
            );
        }
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "devices"
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use skylight_core::{Configuration, Credentials, DeviceConfig, Services};
    use tokio_util::sync::CancellationToken;

    use super::*;

    fn widget(filter: Option<&[&str]>) -> DevicesWidget {
        let mut config = Configuration::default();
        for (id, entity) in [("lamp", "light.lamp"), ("fan", "switch.fan"), ("porch", "light.porch")] {
            config.devices.insert(
                id.into(),
                DeviceConfig {
                    entity: entity.into(),
                    ..DeviceConfig::default()
                },
            );
        }
        let mut tile = TileDescriptor::new("devices");
        if let Some(ids) = filter {
            tile.params.insert("devices".into(), json!(ids));
        }
        let ctx = WidgetContext {
            services: Services::new(config, Credentials::default()),
            cancel: CancellationToken::new(),
        };
        DevicesWidget::new(&tile, &ctx)
    }

    fn press(widget: &mut DevicesWidget, code: KeyCode) -> Option<Action> {
        widget
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap_or_default()
    }

    #[test]
    fn filter_keeps_param_order() {
        let w = widget(Some(&["porch", "lamp"]));
        let ids: Vec<&str> = w.rows.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["porch", "lamp"]);
    }

    #[test]
    fn enter_toggles_selected_device() {
        let mut w = widget(None);
        press(&mut w, KeyCode::Down);
        assert_eq!(
            press(&mut w, KeyCode::Enter),
            Some(Action::DeviceCommand {
                id: "fan".into(),
                request: DeviceRequest::Toggle,
            })
        );
    }

    #[test]
    fn selection_stops_at_the_ends() {
        let mut w = widget(None);
        press(&mut w, KeyCode::Up);
        assert_eq!(w.selected, 0);
        for _ in 0..5 {
            press(&mut w, KeyCode::Down);
        }
        assert_eq!(w.selected, 2);
    }

    #[test]
    fn dimming_only_applies_to_lights() {
        let mut w = widget(None);
        assert_eq!(
            press(&mut w, KeyCode::Char('+')),
            Some(Action::DeviceCommand {
                id: "lamp".into(),
                request: DeviceRequest::Brightness(10),
            })
        );
        press(&mut w, KeyCode::Down);
        assert_eq!(press(&mut w, KeyCode::Char('-')), None);
    }

    #[test]
    fn pending_label_names_the_intent() {
        assert_eq!(
            state_label(&DeviceStatus::Unknown, ControlState::Pending(Intent::SetBrightness(40))),
            "dimming to 40%..."
        );
        assert_eq!(
            state_label(
                &DeviceStatus::Known {
                    on: true,
                    brightness: Some(50),
                    raw_state: "on".into(),
                    attributes: serde_json::Map::new(),
                },
                ControlState::Idle
            ),
            "on 50%"
        );
    }
}
