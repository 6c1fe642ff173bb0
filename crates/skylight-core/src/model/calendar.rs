// ── Calendar domain types ──

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One event as it appears on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub title: String,
    /// Local start time; `None` for all-day entries.
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub location: Option<String>,
    /// Drawn with the holiday style.
    pub holiday: bool,
}

impl CalendarEntry {
    pub fn is_all_day(&self) -> bool {
        self.start.is_none()
    }
}

/// Entries for a single local date, all-day first, then by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub entries: Vec<CalendarEntry>,
}
