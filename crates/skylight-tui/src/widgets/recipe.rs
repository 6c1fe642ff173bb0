//! Recipe of the day.

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tokio::sync::mpsc::UnboundedSender;

use skylight_core::sources::RecipeSource;
use skylight_core::{Recipe, Synchronizer, TileDescriptor};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::registry::WidgetContext;
use crate::widgets::tile::{Feed, period, tile_block};

pub struct RecipeWidget {
    title: String,
    feed: Feed<RecipeSource>,
    focused: bool,
}

impl RecipeWidget {
    pub fn new(tile: &TileDescriptor, ctx: &WidgetContext) -> Self {
        let config = &ctx.services.config;
        let source = RecipeSource::from_config(config, &ctx.services.transport);
        let sync = Synchronizer::from_result(
            source,
            period(tile, config.refresh.recipe()),
            config.refresh.timeout(),
        );
        Self {
            title: tile.display_name(),
            feed: Feed::new(sync, ctx),
            focused: false,
        }
    }
}

fn recipe_lines(recipe: &Recipe, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(recipe.title.clone(), theme::headline())),
        Line::from(Span::styled(format!("by {}", recipe.author), theme::muted())),
    ];

    let details: Vec<String> = [recipe.time.as_deref(), recipe.servings.as_deref()]
        .into_iter()
        .flatten()
        .filter(|d| !d.trim().is_empty())
        .map(str::to_owned)
        .collect();
    if !details.is_empty() {
        lines.push(Line::from(Span::styled(details.join(" · "), theme::body())));
    }
    if let Some(url) = recipe.url.as_deref() {
        lines.push(Line::from(Span::styled(url.to_owned(), theme::key_hint())));
    }
    if let Some(age) = recipe.age(now) {
        lines.push(Line::from(Span::styled(format!("updated {age}"), theme::muted())));
    }
    lines
}

impl Component for RecipeWidget {
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

        self.feed.render(frame, inner, |frame, area, recipe| {
            frame.render_widget(
                Paragraph::new(recipe_lines(recipe, Utc::now())).wrap(Wrap { trim: true }),
                area,
            );
        });
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "recipe"
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn details_and_age_are_listed() {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .unwrap_or_default();
        let recipe = Recipe {
            title: "Miso soup".into(),
            image: None,
            url: None,
            time: Some("20 minutes".into()),
            servings: Some("4 servings".into()),
            author: "NYT Cooking".into(),
            updated: Some(now - chrono::Duration::hours(3)),
        };

        let text: Vec<String> = recipe_lines(&recipe, now)
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(
            text,
            vec!["Miso soup", "by NYT Cooking", "20 minutes · 4 servings", "updated 3h ago"]
        );
    }
}
