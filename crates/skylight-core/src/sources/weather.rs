// ── Weather source ──

use chrono::NaiveDate;
use skylight_api::{ForecastResponse, TransportConfig, UnitSystem, WeatherClient, WeatherQuery};
use tracing::warn;

use crate::config::{Configuration, TileDescriptor, endpoint};
use crate::convert::{format_number, value_as_u8};
use crate::error::CoreError;
use crate::model::{Condition, ConditionReading, DailyForecast, Weather};
use crate::sync::{FailurePolicy, Source};

/// Always requested, whatever the tile shows.
pub const BASE_CURRENT_FIELDS: &[&str] = &["temperature_2m", "weather_code", "is_day"];

const DAILY_FIELDS: &[&str] = &["weather_code", "temperature_2m_max", "temperature_2m_min"];

const DEFAULT_FORECAST_DAYS: u64 = 5;

/// Parse condition names, warning about and skipping unknown ones.
/// Duplicates collapse to their first occurrence.
pub fn parse_conditions(names: &[String]) -> Vec<Condition> {
    let mut conditions = Vec::new();
    for name in names {
        match name.trim().parse::<Condition>() {
            Ok(condition) if !conditions.contains(&condition) => conditions.push(condition),
            Ok(_) => {}
            Err(_) => warn!(condition = %name, "ignoring unknown weather condition"),
        }
    }
    conditions
}

/// The exact `current` field list: the base fields plus whatever the
/// conditions need, without duplicates, in request order.
pub fn current_fields(conditions: &[Condition]) -> Vec<String> {
    let mut fields: Vec<String> = BASE_CURRENT_FIELDS.iter().map(|f| (*f).to_owned()).collect();
    for field in conditions.iter().flat_map(|c| c.fields()) {
        if !fields.iter().any(|f| f == field) {
            fields.push((*field).to_owned());
        }
    }
    fields
}

/// Fetches current conditions and the daily forecast for one location.
pub struct WeatherSource {
    client: WeatherClient,
    query: WeatherQuery,
    conditions: Vec<Condition>,
}

impl WeatherSource {
    /// Build from a weather tile. The tile must carry `latitude` and
    /// `longitude`; `conditions`, `units`, `timezone` and `forecast_days`
    /// are optional.
    pub fn from_tile(
        tile: &TileDescriptor,
        config: &Configuration,
        transport: &TransportConfig,
    ) -> Result<Self, CoreError> {
        let (Some(latitude), Some(longitude)) =
            (tile.param_f64("latitude"), tile.param_f64("longitude"))
        else {
            return Err(CoreError::not_configured("No location configured"));
        };

        let units = match tile.param_str("units") {
            Some(u) if u.eq_ignore_ascii_case("imperial") => UnitSystem::Imperial,
            _ => UnitSystem::Metric,
        };
        let days = tile
            .param_u64("forecast_days")
            .unwrap_or(DEFAULT_FORECAST_DAYS)
            .clamp(1, 14);
        let conditions = parse_conditions(&tile.param_list("conditions"));

        let query = WeatherQuery {
            latitude,
            longitude,
            timezone: tile.param_str("timezone").unwrap_or("auto").to_owned(),
            current: current_fields(&conditions),
            daily: DAILY_FIELDS.iter().map(|f| (*f).to_owned()).collect(),
            units,
            forecast_days: u8::try_from(days).unwrap_or(14),
        };

        let url = config
            .api_url(endpoint::WEATHER)
            .unwrap_or(skylight_api::weather::DEFAULT_FORECAST_URL);
        let client = WeatherClient::new(url, transport)?;

        Ok(Self {
            client,
            query,
            conditions,
        })
    }

    pub fn query(&self) -> &WeatherQuery {
        &self.query
    }
}

impl Source for WeatherSource {
    type Output = Weather;
    const NAME: &'static str = "weather";
    const FAILURE_POLICY: FailurePolicy = FailurePolicy::Clear;

    async fn fetch(&self) -> Result<Weather, CoreError> {
        let forecast = self.client.forecast(&self.query).await?;
        Ok(weather_from_forecast(&forecast, &self.conditions, self.query.units))
    }
}

fn weather_from_forecast(
    forecast: &ForecastResponse,
    conditions: &[Condition],
    units: UnitSystem,
) -> Weather {
    let current = forecast.current.clone().unwrap_or_default();
    let readings = conditions
        .iter()
        .filter_map(|&condition| {
            let value = match condition {
                Condition::Humidity => current
                    .number("relative_humidity_2m")
                    .map(|v| format!("{}%", format_number(v))),
                Condition::Uv => current.number("uv_index").map(format_number),
                Condition::Wind => current.number("wind_speed_10m").map(|speed| {
                    let unit = match units {
                        UnitSystem::Metric => "km/h",
                        UnitSystem::Imperial => "mph",
                    };
                    let dir = current
                        .number("wind_direction_10m")
                        .map(compass)
                        .unwrap_or_default();
                    format!("{} {unit} {dir}", format_number(speed)).trim_end().to_owned()
                }),
                Condition::FeelsLike => current
                    .number("apparent_temperature")
                    .map(|v| format!("{}°", format_number(v))),
                Condition::Precipitation => current.number("precipitation").map(|v| {
                    let unit = match units {
                        UnitSystem::Metric => "mm",
                        UnitSystem::Imperial => "in",
                    };
                    format!("{} {unit}", format_number(v))
                }),
                Condition::Pressure => current
                    .number("surface_pressure")
                    .map(|v| format!("{v:.0} hPa")),
                Condition::CloudCover => current
                    .number("cloud_cover")
                    .map(|v| format!("{}%", format_number(v))),
            }?;
            Some(ConditionReading { condition, value })
        })
        .collect();

    let daily = forecast
        .daily
        .as_ref()
        .map(|d| {
            d.time
                .iter()
                .enumerate()
                .filter_map(|(i, day)| {
                    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
                    Some(DailyForecast {
                        date,
                        high: d.number("temperature_2m_max", i),
                        low: d.number("temperature_2m_min", i),
                        code: d
                            .series
                            .get("weather_code")
                            .and_then(|codes| codes.get(i))
                            .and_then(value_as_u8),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Weather {
        temperature: current.number("temperature_2m"),
        code: current.values.get("weather_code").and_then(value_as_u8),
        is_day: current.number("is_day").is_none_or(|v| v >= 1.0),
        units,
        readings,
        daily,
    }
}

/// Degrees to a 16-point compass direction.
fn compass(degrees: f64) -> String {
    const POINTS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];
    let normalized = degrees.rem_euclid(360.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    let index = ((normalized / 22.5).round() as usize) % POINTS.len();
    POINTS.get(index).copied().unwrap_or("N").to_owned()
}
