// Open-Meteo compatible forecast client.
//
// A single GET carries every parameter; the response holds a `current`
// block keyed by the requested field names and a `daily` block of
// parallel arrays.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;
use crate::http::Endpoint;
use crate::transport::TransportConfig;

/// Public Open-Meteo endpoint, used when no weather URL is configured.
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Unit system requested from the forecast service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    fn params(self) -> [(&'static str, &'static str); 3] {
        match self {
            Self::Metric => [
                ("temperature_unit", "celsius"),
                ("wind_speed_unit", "kmh"),
                ("precipitation_unit", "mm"),
            ],
            Self::Imperial => [
                ("temperature_unit", "fahrenheit"),
                ("wind_speed_unit", "mph"),
                ("precipitation_unit", "inch"),
            ],
        }
    }
}

/// Everything needed for one forecast request.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub current: Vec<String>,
    pub daily: Vec<String>,
    pub units: UnitSystem,
    pub forecast_days: u8,
}

impl WeatherQuery {
    /// Render the query string parameters, field lists comma-joined.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("timezone", self.timezone.clone()),
            ("current", self.current.join(",")),
        ];
        if !self.daily.is_empty() {
            params.push(("daily", self.daily.join(",")));
        }
        params.extend(
            self.units
                .params()
                .into_iter()
                .map(|(k, v)| (k, v.to_owned())),
        );
        params.push(("forecast_days", self.forecast_days.to_string()));
        params
    }
}

/// `current` block: the timestamp plus one entry per requested field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentBlock {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(flatten)]
    pub values: HashMap<String, Value>,
}

impl CurrentBlock {
    pub fn number(&self, field: &str) -> Option<f64> {
        self.values.get(field).and_then(Value::as_f64)
    }
}

/// `daily` block: parallel arrays indexed by day.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyBlock {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(flatten)]
    pub series: HashMap<String, Vec<Value>>,
}

impl DailyBlock {
    pub fn number(&self, field: &str, day: usize) -> Option<f64> {
        self.series
            .get(field)
            .and_then(|values| values.get(day))
            .and_then(Value::as_f64)
    }
}

/// Forecast response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub current: Option<CurrentBlock>,
    #[serde(default)]
    pub current_units: HashMap<String, String>,
    #[serde(default)]
    pub daily: Option<DailyBlock>,
}

/// Async client for the forecast service. Keyless.
pub struct WeatherClient {
    endpoint: Endpoint,
}

impl WeatherClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            endpoint: Endpoint::new(base_url, transport.build_client()?)?,
        })
    }

    pub fn base_url(&self) -> &url::Url {
        self.endpoint.base_url()
    }

    pub async fn forecast(&self, query: &WeatherQuery) -> Result<ForecastResponse, Error> {
        self.endpoint.get_with_params("", &query.to_params()).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn query() -> WeatherQuery {
        WeatherQuery {
            latitude: 40.71,
            longitude: -74.01,
            timezone: "America/New_York".into(),
            current: vec!["temperature_2m".into(), "weather_code".into()],
            daily: vec![],
            units: UnitSystem::Imperial,
            forecast_days: 3,
        }
    }

    #[test]
    fn params_join_fields_and_skip_empty_daily() {
        let params = query().to_params();
        let lookup = |k: &str| params.iter().find(|(key, _)| *key == k).map(|(_, v)| v.clone());

        assert_eq!(lookup("current").as_deref(), Some("temperature_2m,weather_code"));
        assert_eq!(lookup("daily"), None);
        assert_eq!(lookup("temperature_unit").as_deref(), Some("fahrenheit"));
        assert_eq!(lookup("forecast_days").as_deref(), Some("3"));
    }

    #[test]
    fn decodes_current_and_daily_blocks() {
        let body: ForecastResponse = serde_json::from_value(serde_json::json!({
            "current": { "time": "2026-10-19T09:00", "temperature_2m": 12.5, "weather_code": 3 },
            "current_units": { "temperature_2m": "°C" },
            "daily": {
                "time": ["2026-10-19", "2026-10-20"],
                "temperature_2m_max": [15.0, null],
                "sunrise": ["2026-10-19T07:10", "2026-10-20T07:11"]
            }
        }))
        .unwrap();

        let current = body.current.unwrap();
        assert_eq!(current.number("temperature_2m"), Some(12.5));
        let daily = body.daily.unwrap();
        assert_eq!(daily.number("temperature_2m_max", 0), Some(15.0));
        assert_eq!(daily.number("temperature_2m_max", 1), None);
    }
}
