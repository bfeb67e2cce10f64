//! Plain-text rendering of dashboard state.

use std::fmt::Write;

use dashboard_core::{
    AirQuality, City, DashboardState, UnitSystem,
    alerts::{Alert, Severity, aqi_description},
    catalog::{UnitClass, VARIABLES},
    model::ComparisonResult,
    series::{ChartData, forecast_title},
    units::{format_speed, format_temperature, unit_suffix},
};

const SPARK: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const MAX_SPARK_WIDTH: usize = 72;

pub fn current(state: &DashboardState, is_favorite: bool) -> Option<String> {
    let (city, snapshot) = state.loaded()?;
    let now = &snapshot.current;
    let star = if is_favorite { "★" } else { "☆" };

    Some(format!(
        "{} {}\n{}\nWind: {}\nDirection: {}°",
        city.name,
        star,
        format_temperature(now.temperature, state.units),
        format_speed(now.windspeed, state.units),
        now.winddirection,
    ))
}

pub fn alerts(alerts: &[Alert]) -> Option<String> {
    if alerts.is_empty() {
        return None;
    }
    let mut out = String::from("⚠ Weather Alerts");
    for alert in alerts {
        let marker = match alert.severity {
            Severity::High => "[HIGH]",
            Severity::Moderate => "[MODERATE]",
        };
        let _ = write!(out, "\n  {marker} {}", alert.message);
    }
    Some(out)
}

pub fn air_quality(aq: &AirQuality) -> String {
    format!(
        "Air Quality\n  US AQI: {} - {}\n  EU AQI: {} - {}",
        index(aq.us_aqi),
        aqi_description(aq.us_aqi),
        index(aq.european_aqi),
        aqi_description(aq.european_aqi),
    )
}

fn index(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

pub fn chart(city: Option<&City>, time_range: u32, chart: &ChartData, units: UnitSystem) -> String {
    let name = city.map_or("Weather", |c| c.name.as_str());
    let mut out = format!("{name} - {}", forecast_title(time_range));

    let width = chart.datasets.iter().map(|d| d.label.len()).max().unwrap_or(0);
    for dataset in &chart.datasets {
        let suffix = unit_suffix(dataset.unit_class, units);
        let range = min_max(&dataset.points)
            .map(|(lo, hi)| format!("{lo:.1}..{hi:.1}{suffix}"))
            .unwrap_or_else(|| "no data".to_string());
        let _ = write!(
            out,
            "\n  {:<width$}  {}  {}",
            dataset.label,
            sparkline(&dataset.points),
            range,
        );
    }

    let ticks: Vec<_> = chart.labels.iter().filter(|l| !l.is_empty()).map(String::as_str).collect();
    if !ticks.is_empty() {
        let _ = write!(out, "\n  {}", ticks.join(" · "));
    }
    out
}

pub fn sparkline(points: &[Option<f64>]) -> String {
    let Some((lo, hi)) = min_max(points) else {
        return String::new();
    };
    let stride = points.len().div_ceil(MAX_SPARK_WIDTH).max(1);
    let span = hi - lo;

    points
        .iter()
        .step_by(stride)
        .map(|p| match p {
            None => ' ',
            Some(_) if span == 0.0 => SPARK[SPARK.len() / 2],
            Some(v) => {
                let level = ((v - lo) / span * (SPARK.len() - 1) as f64).round() as usize;
                SPARK[level.min(SPARK.len() - 1)]
            }
        })
        .collect()
}

fn min_max(points: &[Option<f64>]) -> Option<(f64, f64)> {
    points.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

pub fn comparison(results: &[ComparisonResult], units: UnitSystem) -> String {
    const CELL: usize = 14;
    let mut rows = [
        format!("{:<CELL$}", "City"),
        format!("{:<CELL$}", "Temp"),
        format!("{:<CELL$}", "Wind"),
    ];
    for result in results {
        let now = &result.snapshot.current;
        let _ = write!(rows[0], "{:<CELL$}", result.city.name);
        let _ = write!(rows[1], "{:<CELL$}", format_temperature(now.temperature, units));
        let _ = write!(rows[2], "{:<CELL$}", format_speed(now.windspeed, units));
    }
    rows.iter().map(|r| r.trim_end()).collect::<Vec<_>>().join("\n")
}

pub fn cities<'a>(cities: impl IntoIterator<Item = &'a City>) -> String {
    cities
        .into_iter()
        .map(|c| format!("{:<20} {:>9.4} {:>10.4}", c.name, c.lat, c.lon))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn variable_help() -> String {
    VARIABLES
        .iter()
        .map(|v| {
            let kind = match v.unit_class {
                UnitClass::Temperature => "temperature",
                UnitClass::Speed => "speed",
                UnitClass::None => "",
            };
            format!("{:<26} {:<16} {kind}", v.key, v.label).trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Everything shown on the main dashboard screen.
pub fn dashboard(state: &DashboardState, is_favorite: bool) -> String {
    let mut sections = Vec::new();

    if let Some(current) = current(state, is_favorite) {
        sections.push(current);
    }
    if let Some(alerts) = alerts(&state.alerts) {
        sections.push(alerts);
    }
    if let Some(aq) = &state.air_quality {
        sections.push(air_quality(aq));
    }
    if state.loading {
        sections.push("Loading...".to_string());
    }
    if let Some(error) = &state.error {
        sections.push(format!("Error: {error}"));
    }
    if !state.loading
        && state.error.is_none()
        && let Some(data) = state.chart()
    {
        sections.push(chart(state.snapshot_city.as_ref(), state.time_range, &data, state.units));
    }
    if state.comparison_enabled && !state.comparison_results.is_empty() {
        sections.push(comparison(&state.comparison_results, state.units));
    }

    sections.join("\n\n")
}
