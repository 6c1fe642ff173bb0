// ── Calendar source ──

use std::collections::BTreeMap;

use chrono::{Days, Local, NaiveDate, TimeZone};
use skylight_api::{CalendarClient, RawEvent, TransportConfig};

use crate::config::{Configuration, TileDescriptor, endpoint};
use crate::error::CoreError;
use crate::model::{CalendarDay, CalendarEntry};
use crate::sync::{FailurePolicy, Source};

const DEFAULT_HORIZON_DAYS: u64 = 7;
const UNTITLED: &str = "(No title)";

/// How far ahead to look and which titles count as holidays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSettings {
    pub horizon_days: u64,
    /// Lowercased title keywords that mark an event as a holiday.
    pub holiday_keywords: Vec<String>,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            holiday_keywords: Vec::new(),
        }
    }
}

impl CalendarSettings {
    pub fn from_tile(tile: &TileDescriptor) -> Self {
        Self {
            horizon_days: tile
                .param_u64("horizon_days")
                .filter(|d| *d > 0)
                .unwrap_or(DEFAULT_HORIZON_DAYS),
            holiday_keywords: tile
                .param_list("holiday_keywords")
                .into_iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    fn is_holiday_title(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.holiday_keywords.iter().any(|k| title.contains(k))
    }
}

/// Group events by local date inside `[today, today + horizon)`.
///
/// All-day events spanning several days appear on every covered day (the
/// end date is exclusive). Within a day, all-day entries come first, then
/// timed entries by start time.
pub fn group_events<Tz: TimeZone>(
    events: &[RawEvent],
    today: NaiveDate,
    settings: &CalendarSettings,
    tz: &Tz,
) -> Vec<CalendarDay> {
    let horizon_end = today
        .checked_add_days(Days::new(settings.horizon_days))
        .unwrap_or(NaiveDate::MAX);
    let in_horizon = |d: NaiveDate| d >= today && d < horizon_end;

    let mut days: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();

    for event in events {
        let title = event
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
            .to_owned();
        let keyword_holiday = settings.is_holiday_title(&title);

        if let Some(start) = event.start.date {
            let end = event
                .end
                .as_ref()
                .and_then(|e| e.date)
                .filter(|end| *end > start)
                .unwrap_or_else(|| start.succ_opt().unwrap_or(start));
            for day in start.iter_days().take_while(|d| *d < end && *d < horizon_end) {
                if in_horizon(day) {
                    days.entry(day).or_default().push(CalendarEntry {
                        title: title.clone(),
                        start: None,
                        end: None,
                        location: event.location.clone(),
                        holiday: true,
                    });
                }
            }
        } else if let Some(start) = event.start.date_time {
            let local = start.with_timezone(tz);
            let date = local.date_naive();
            if !in_horizon(date) {
                continue;
            }
            let end = event
                .end
                .as_ref()
                .and_then(|e| e.date_time)
                .map(|e| e.with_timezone(tz))
                .filter(|e| e.date_naive() == date)
                .map(|e| e.time());
            days.entry(date).or_default().push(CalendarEntry {
                title,
                start: Some(local.time()),
                end,
                location: event.location.clone(),
                holiday: keyword_holiday,
            });
        }
    }

    days.into_iter()
        .map(|(date, mut entries)| {
            entries.sort_by_key(|e| e.start);
            CalendarDay { date, entries }
        })
        .collect()
}

/// Fetches the event feed and groups it for the local time zone.
pub struct CalendarSource {
    client: CalendarClient,
    settings: CalendarSettings,
}

impl CalendarSource {
    pub fn from_tile(
        tile: &TileDescriptor,
        config: &Configuration,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let url = config
            .api_url(endpoint::CALENDAR)
            .ok_or_else(|| CoreError::not_configured("No calendar feed configured"))?;
        Ok(Self {
            client: CalendarClient::new(url, transport)?,
            settings: CalendarSettings::from_tile(tile),
        })
    }
}

impl Source for CalendarSource {
    type Output = Vec<CalendarDay>;
    const NAME: &'static str = "calendar";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::Clear;

    async fn fetch(&self) -> Result<Vec<CalendarDay>, CoreError> {
        let events = self.client.list_events().await?;
        let today = Local::now().date_naive();
        Ok(group_events(&events, today, &self.settings, &Local))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{NaiveTime, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn events(value: serde_json::Value) -> Vec<RawEvent> {
        serde_json::from_value(value).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn multi_day_all_day_event_covers_each_day_exclusive_end() {
        let list = events(json!([
            { "summary": "Cabin trip", "start": { "date": "2026-10-20" }, "end": { "date": "2026-10-23" } }
        ]));
        let days = group_events(&list, today(), &CalendarSettings::default(), &Utc);
        let dates: Vec<String> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-10-20", "2026-10-21", "2026-10-22"]);
        assert!(days.iter().all(|d| d.entries[0].holiday));
    }

    #[test]
    fn events_outside_horizon_are_dropped() {
        let list = events(json!([
            { "summary": "Yesterday", "start": { "dateTime": "2026-10-18T09:00:00Z" } },
            { "summary": "Far away", "start": { "dateTime": "2026-11-30T09:00:00Z" } },
            { "summary": "Last day", "start": { "dateTime": "2026-10-25T09:00:00Z" } }
        ]));
        let days = group_events(&list, today(), &CalendarSettings::default(), &Utc);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].entries[0].title, "Last day");
    }

    #[test]
    fn all_day_first_then_by_start_time() {
        let list = events(json!([
            { "summary": "Standup", "start": { "dateTime": "2026-10-19T15:00:00Z" } },
            { "summary": "Breakfast", "start": { "dateTime": "2026-10-19T08:00:00Z" }, "end": { "dateTime": "2026-10-19T09:00:00Z" } },
            { "summary": "Bin day", "start": { "date": "2026-10-19" } }
        ]));
        let days = group_events(&list, today(), &CalendarSettings::default(), &Utc);
        let titles: Vec<&str> = days[0].entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Bin day", "Breakfast", "Standup"]);
        assert_eq!(days[0].entries[1].end, NaiveTime::from_hms_opt(9, 0, 0));
    }

    #[test]
    fn keyword_marks_timed_event_as_holiday() {
        let list = events(json!([
            { "summary": "Diwali dinner", "start": { "dateTime": "2026-10-21T18:00:00Z" } },
            { "summary": "Dentist", "start": { "dateTime": "2026-10-21T10:00:00Z" } }
        ]));
        let settings = CalendarSettings {
            holiday_keywords: vec!["diwali".into()],
            ..CalendarSettings::default()
        };
        let days = group_events(&list, today(), &settings, &Utc);
        let holidays: Vec<bool> = days[0].entries.iter().map(|e| e.holiday).collect();
        assert_eq!(holidays, vec![false, true]);
    }

    #[test]
    fn untitled_events_get_placeholder() {
        let list = events(json!([{ "start": { "date": "2026-10-19" } }]));
        let days = group_events(&list, today(), &CalendarSettings::default(), &Utc);
        assert_eq!(days[0].entries[0].title, UNTITLED);
    }
}
