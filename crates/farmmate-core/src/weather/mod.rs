//! Weather readings and forecast summaries.

use serde::{Deserialize, Serialize};

/// Temperature value the backend uses for "not forecast yet".
pub const UNDETERMINED_TEMPERATURE: f64 = -999.0;

/// Current weather at an address (`GET /weather/current`).
///
/// [`Default`] is the reading shown when the backend cannot be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temperature: f64,
    pub humidity: f64,
    pub sky_condition_code: i32,
    #[serde(default)]
    pub precipitation_type_code: i32,
    #[serde(default)]
    pub precipitation: f64,
}

impl Default for CurrentWeather {
    fn default() -> Self {
        Self {
            temperature: 20.0,
            humidity: 50.0,
            sky_condition_code: 2,
            precipitation_type_code: 0,
            precipitation: 0.0,
        }
    }
}

impl CurrentWeather {
    pub fn sky(&self) -> SkyCondition {
        SkyCondition::from_code(self.sky_condition_code)
    }
}

/// A current-weather value and whether it is the fallback reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReading {
    pub weather: CurrentWeather,
    pub is_fallback: bool,
}

impl WeatherReading {
    pub fn live(weather: CurrentWeather) -> Self {
        Self {
            weather,
            is_fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            weather: CurrentWeather::default(),
            is_fallback: true,
        }
    }
}

/// Sky state from the KMA sky condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Overcast,
}

impl SkyCondition {
    /// Unknown codes read as clear sky.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            4 => Self::Overcast,
            _ => Self::Clear,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Clear => 1,
            Self::PartlyCloudy => 2,
            Self::Cloudy => 3,
            Self::Overcast => 4,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "맑음",
            Self::PartlyCloudy => "구름조금",
            Self::Cloudy => "구름많음",
            Self::Overcast => "흐림",
        }
    }

    /// Icon name used by the web client (`sun`, `partly_cloudy`, ...).
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "partly_cloudy",
            Self::Cloudy => "cloudy",
            Self::Overcast => "overcast",
        }
    }
}

impl std::fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One hourly entry of a short-term forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourForecast {
    /// `HH:MM` (older payloads use `HHMM`).
    pub forecast_time: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub sky_condition_code: i32,
    #[serde(default)]
    pub precipitation_probability: f64,
    #[serde(default)]
    pub precipitation_type_code: i32,
    #[serde(default)]
    pub precipitation_amount: f64,
    #[serde(default)]
    pub snow_amount: f64,
}

impl HourForecast {
    /// Hour of day, `None` when `forecast_time` is not a time.
    pub fn hour(&self) -> Option<u32> {
        parse_hour(&self.forecast_time)
    }

    pub fn sky(&self) -> SkyCondition {
        SkyCondition::from_code(self.sky_condition_code)
    }
}

/// One day of `GET /weather/short-term`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayForecast {
    pub forecast_date: String,
    #[serde(default = "undetermined")]
    pub max_temperature: f64,
    #[serde(default = "undetermined")]
    pub min_temperature: f64,
    #[serde(default)]
    pub hour_forecast_infos: Vec<HourForecast>,
}

fn undetermined() -> f64 {
    UNDETERMINED_TEMPERATURE
}

/// Morning/afternoon digest of a forecast day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub forecast_date: String,
    pub morning: SkyCondition,
    pub afternoon: SkyCondition,
    /// `None` when the backend has not decided the value yet.
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
}

/// Maps the backend's "undetermined" marker to `None`.
pub fn determined(temperature: f64) -> Option<f64> {
    (temperature != UNDETERMINED_TEMPERATURE).then_some(temperature)
}

/// Parses the hour of `HH:MM` or `HHMM`.
pub fn parse_hour(forecast_time: &str) -> Option<u32> {
    let raw = forecast_time.trim();
    let digits = match raw.split_once(':') {
        Some((hour, _)) => hour,
        None if raw.len() == 4 => raw.get(..2)?,
        None => raw,
    };
    digits.parse::<u32>().ok().filter(|hour| *hour < 24)
}

/// Most frequent sky condition among the hours. Ties go to the lower code;
/// unknown codes are not counted; no hours reads as clear.
pub fn dominant_sky<'a>(hours: impl IntoIterator<Item = &'a HourForecast>) -> SkyCondition {
    let mut counts = [0usize; 4];
    for hour in hours {
        if let Ok(slot) = usize::try_from(hour.sky_condition_code - 1) {
            if let Some(count) = counts.get_mut(slot) {
                *count += 1;
            }
        }
    }

    let mut best = 0;
    for (slot, count) in counts.iter().enumerate() {
        if *count > counts[best] {
            best = slot;
        }
    }
    SkyCondition::from_code(best as i32 + 1)
}

/// Summarizes a forecast day into morning (before noon) and afternoon skies.
/// Hours whose time cannot be parsed are ignored.
pub fn summarize_day(day: &DayForecast) -> DaySummary {
    let hours = &day.hour_forecast_infos;
    let morning = dominant_sky(hours.iter().filter(|h| h.hour().is_some_and(|hr| hr < 12)));
    let afternoon = dominant_sky(hours.iter().filter(|h| h.hour().is_some_and(|hr| hr >= 12)));

    DaySummary {
        forecast_date: day.forecast_date.clone(),
        morning,
        afternoon,
        max_temperature: determined(day.max_temperature),
        min_temperature: determined(day.min_temperature),
    }
}
