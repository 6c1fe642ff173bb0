// ── Weather domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skylight_api::UnitSystem;
use strum::{Display, EnumString};

/// Optional readings a weather tile can show next to the temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Condition {
    Humidity,
    Uv,
    Wind,
    FeelsLike,
    Precipitation,
    Pressure,
    CloudCover,
}

impl Condition {
    /// `current` fields the forecast request must include for this reading.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Humidity => &["relative_humidity_2m"],
            Self::Uv => &["uv_index"],
            Self::Wind => &["wind_speed_10m", "wind_direction_10m"],
            Self::FeelsLike => &["apparent_temperature"],
            Self::Precipitation => &["precipitation"],
            Self::Pressure => &["surface_pressure"],
            Self::CloudCover => &["cloud_cover"],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Humidity => "Humidity",
            Self::Uv => "UV",
            Self::Wind => "Wind",
            Self::FeelsLike => "Feels like",
            Self::Precipitation => "Precip",
            Self::Pressure => "Pressure",
            Self::CloudCover => "Clouds",
        }
    }
}

/// One rendered reading, already formatted with its unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionReading {
    pub condition: Condition,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub code: Option<u8>,
}

/// Current conditions plus the short-range forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: Option<f64>,
    pub code: Option<u8>,
    pub is_day: bool,
    pub units: UnitSystem,
    pub readings: Vec<ConditionReading>,
    pub daily: Vec<DailyForecast>,
}

impl Weather {
    pub fn description(&self) -> &'static str {
        self.code.map_or("Unknown", describe_code)
    }

    pub fn temperature_unit(&self) -> &'static str {
        match self.units {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }
}

/// WMO weather interpretation code to a short description.
pub fn describe_code(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 => "Rain",
        65 => "Heavy rain",
        66 | 67 => "Freezing rain",
        71 | 73 => "Snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
