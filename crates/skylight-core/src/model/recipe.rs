// ── Recipe domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Recipe of the Day";
pub const DEFAULT_AUTHOR: &str = "NYT Cooking";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub title: String,
    pub image: Option<String>,
    pub url: Option<String>,
    pub time: Option<String>,
    pub servings: Option<String>,
    pub author: String,
    /// When the backend last scraped the recipe.
    pub updated: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Coarse age of the cached recipe: `"just now"`, `"5m ago"`, `"3h ago"`,
    /// `"2d ago"`.
    pub fn age(&self, now: DateTime<Utc>) -> Option<String> {
        let updated = self.updated?;
        let secs = (now - updated).num_seconds().max(0);
        Some(match secs {
            0..60 => "just now".to_owned(),
            60..3600 => format!("{}m ago", secs / 60),
            3600..86_400 => format!("{}h ago", secs / 3600),
            _ => format!("{}d ago", secs / 86_400),
        })
    }
}
