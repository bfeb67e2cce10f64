//! CSV/JSON export payloads and the sink that writes them.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    catalog,
    error::ExportError,
    model::{City, CurrentConditions, HourlySeries, WeatherSnapshot},
    series::parse_timestamp,
    units::{self, UnitSystem},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// `weather_<city>_<unix millis>.<ext>`
    pub fn file_name(self, city: &City, at: DateTime<Utc>) -> String {
        let name = city.name.replace(['/', '\\'], "_");
        format!("weather_{}_{}.{}", name, at.timestamp_millis(), self.extension())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Unknown export format '{s}'. Expected csv or json.")),
        }
    }
}

/// CSV with one row per hour and one column per selected variable.
///
/// Values are the stored metric readings. Timestamps use the US local style
/// `M/D/YYYY, h:MM:SS AM`; the comma inside it is not quoted.
pub fn to_csv<S: AsRef<str>>(snapshot: &WeatherSnapshot, selected: &[S]) -> String {
    let header = std::iter::once("Time".to_string())
        .chain(selected.iter().map(|key| {
            let key = key.as_ref();
            catalog::variable(key).map_or(key, |v| v.label).to_string()
        }))
        .collect::<Vec<_>>()
        .join(",");

    let rows = snapshot.time.iter().enumerate().map(|(i, time)| {
        std::iter::once(local_timestamp(time))
            .chain(selected.iter().map(|key| {
                snapshot.value(key.as_ref(), i).map(|v| v.to_string()).unwrap_or_default()
            }))
            .collect::<Vec<_>>()
            .join(",")
    });

    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

fn local_timestamp(value: &str) -> String {
    match parse_timestamp(value) {
        Some(t) => t.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        None => value.to_string(),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    city: &'a str,
    export_time: String,
    time_range: u32,
    data: JsonData<'a>,
}

#[derive(Serialize)]
struct JsonData<'a> {
    time: &'a [String],
    hourly: &'a HourlySeries,
    current: &'a CurrentConditions,
}

/// Pretty-printed JSON of the whole snapshot.
pub fn to_json(
    snapshot: &WeatherSnapshot,
    city: &City,
    time_range: u32,
    exported_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let export = JsonExport {
        city: &city.name,
        export_time: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        time_range,
        data: JsonData {
            time: &snapshot.time,
            hourly: &snapshot.hourly,
            current: &snapshot.current,
        },
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Plain-text summary handed to a share target.
pub fn share_message(city: &City, current: &CurrentConditions, units: UnitSystem) -> String {
    format!(
        "Weather in {}:\nTemperature: {}\nWind: {}\nDirection: {}°",
        city.name,
        units::format_temperature(current.temperature, units),
        units::format_speed(current.windspeed, units),
        current.winddirection,
    )
}

/// Destination for export payloads.
#[async_trait]
pub trait ExportSink: Send + Sync + std::fmt::Debug {
    /// Write `contents` under `file_name` and return where it ended up.
    async fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ExportSink for FileExporter {
    async fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, contents).await?;
        tracing::info!("Exported {}", path.display());
        Ok(path)
    }
}
