// Calendar feed client.
//
// The feed returns Google-style event objects, either as a bare JSON array
// or wrapped in `{ "items": [...] }`.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Start or end of an event: a bare date for all-day events, a timestamp
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTime {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, rename = "dateTime")]
    pub date_time: Option<DateTime<FixedOffset>>,
}

/// Event as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "title")]
    pub summary: Option<String>,
    pub start: EventTime,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CalendarPayload {
    List(Vec<RawEvent>),
    Wrapped { items: Vec<RawEvent> },
}

/// Async client for the calendar feed.
pub struct CalendarClient {
    endpoint: Endpoint,
}

impl CalendarClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    pub async fn list_events(&self) -> Result<Vec<RawEvent>, Error> {
        let payload: CalendarPayload = self.endpoint.get("").await?;
        Ok(match payload {
            CalendarPayload::List(events) | CalendarPayload::Wrapped { items: events } => events,
        })
    }
}
