// ── Notification domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Display priority. Variant order is display order, urgent first.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Priority {
    Urgent,
    #[default]
    Normal,
    Info,
    None,
}

impl Priority {
    /// Missing or unrecognised priorities are treated as normal.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: Option<String>,
    pub priority: Priority,
    pub icon: String,
    /// Recurring reminders are generated server-side and cannot be dismissed.
    pub recurring: bool,
    pub target_time: Option<String>,
    pub expires: Option<String>,
}

impl Notification {
    pub fn is_dismissible(&self) -> bool {
        !self.recurring
    }
}

/// How the notification indicator should draw attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indicator {
    Pulsing,
    Steady,
    Calm,
    /// Nothing is known; the feed is unavailable.
    Neutral,
}

/// Aggregate shown in the notification tile header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSummary {
    pub label: String,
    pub indicator: Indicator,
    pub count: usize,
}

impl NotificationSummary {
    pub fn from_notifications(notifications: &[Notification]) -> Self {
        let highest = notifications.iter().map(|n| n.priority).min();
        let (label, indicator) = match highest {
            None => ("All Clear", Indicator::Calm),
            Some(Priority::Urgent) => ("Urgent", Indicator::Pulsing),
            Some(Priority::Normal) => ("Attention", Indicator::Steady),
            Some(Priority::Info | Priority::None) => ("Info", Indicator::Steady),
        };
        Self {
            label: label.into(),
            indicator,
            count: notifications.len(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            label: "Notifications".into(),
            indicator: Indicator::Neutral,
            count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: &str, priority: Priority) -> Notification {
        Notification {
            id: id.into(),
            title: id.into(),
            message: None,
            priority,
            icon: "alert".into(),
            recurring: false,
            target_time: None,
            expires: None,
        }
    }

    #[test]
    fn priority_parsing_defaults_to_normal() {
        assert_eq!(Priority::parse(Some("URGENT")), Priority::Urgent);
        assert_eq!(Priority::parse(Some("info")), Priority::Info);
        assert_eq!(Priority::parse(Some("critical")), Priority::Normal);
        assert_eq!(Priority::parse(None), Priority::Normal);
    }

    #[test]
    fn urgent_pulses() {
        let summary = NotificationSummary::from_notifications(&[
            notification("a", Priority::Info),
            notification("b", Priority::Urgent),
        ]);
        assert_eq!(summary.label, "Urgent");
        assert_eq!(summary.indicator, Indicator::Pulsing);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn normal_is_attention() {
        let summary = NotificationSummary::from_notifications(&[notification("a", Priority::Normal)]);
        assert_eq!(summary.label, "Attention");
        assert_eq!(summary.indicator, Indicator::Steady);
    }

    #[test]
    fn empty_is_all_clear() {
        let summary = NotificationSummary::from_notifications(&[]);
        assert_eq!(summary.label, "All Clear");
        assert_eq!(summary.indicator, Indicator::Calm);
    }
}
