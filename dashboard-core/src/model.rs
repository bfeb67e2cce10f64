use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::VARIABLES;

/// A selectable city. `name` is the identity used everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self { name: name.into(), lat, lon }
    }
}

/// Current conditions in metric units, as reported by the forecast source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub windspeed: f64,
    pub winddirection: f64,
}

/// Hourly series keyed by variable. Readings may be missing.
pub type HourlySeries = BTreeMap<String, Vec<Option<f64>>>;

/// Full, unsliced forecast as returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub time: Vec<String>,
    pub hourly: HourlySeries,
    pub current: CurrentConditions,
}

/// Forecast data for one city sliced to the requested time range.
///
/// Every series in `hourly` has the same length as `time`. Snapshots are
/// never edited after construction; a new fetch builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub time: Vec<String>,
    pub hourly: HourlySeries,
    pub current: CurrentConditions,
}

impl WeatherSnapshot {
    /// Slice a forecast to the first `time_range` hours, keeping only the
    /// catalog variables.
    pub fn from_forecast(forecast: Forecast, time_range: u32) -> Self {
        let Forecast { mut time, mut hourly, current } = forecast;
        let limit = time_range as usize;
        time.truncate(limit);

        let hourly = VARIABLES
            .iter()
            .filter_map(|var| {
                let mut values = hourly.remove(var.key)?;
                values.resize(time.len(), None);
                Some((var.key.to_string(), values))
            })
            .collect();

        Self { time, hourly, current }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Reading for `key` at `index`, if both exist and the value is present.
    pub fn value(&self, key: &str, index: usize) -> Option<f64> {
        self.hourly.get(key).and_then(|series| series.get(index).copied().flatten())
    }
}

/// Current air quality indices. Either index may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQuality {
    pub us_aqi: Option<f64>,
    pub european_aqi: Option<f64>,
}

/// One city's data in a comparison batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub city: City,
    pub snapshot: WeatherSnapshot,
}
