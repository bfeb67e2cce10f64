//! Turns a snapshot into chart-ready series.
//!
//! Labels are generated per time-range tier and then thinned for display.
//! Data points are never thinned: a renderer aligns the (possibly shorter or
//! sparsely empty) label list with the points by index.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

use crate::{
    catalog::{self, UnitClass},
    model::WeatherSnapshot,
    units::{self, UnitSystem},
};

/// Label density bucket selected by the time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTier {
    /// Up to a day: `HH:00` on every point.
    Hourly,
    /// Up to three days: weekday and hour on every point.
    MultiDay,
    /// Up to a week: date and hour on every third point.
    Weekly,
    /// Longer: date only on every sixth point.
    Extended,
}

impl LabelTier {
    pub fn for_range(hours: u32) -> Self {
        match hours {
            0..=24 => LabelTier::Hourly,
            25..=72 => LabelTier::MultiDay,
            73..=168 => LabelTier::Weekly,
            _ => LabelTier::Extended,
        }
    }

    /// Stride used when thinning labels for display.
    pub fn skip(self) -> usize {
        match self {
            LabelTier::Hourly => 2,
            LabelTier::MultiDay => 4,
            LabelTier::Weekly => 6,
            LabelTier::Extended => 8,
        }
    }

    fn label(self, index: usize, at: Option<NaiveDateTime>) -> String {
        match self {
            LabelTier::Hourly => at.map(|t| t.format("%H:00").to_string()),
            LabelTier::MultiDay => at.map(|t| format!("{} {}h", t.format("%a"), t.hour())),
            LabelTier::Weekly if index % 3 == 0 => {
                at.map(|t| format!("{}/{} {}h", t.month(), t.day(), t.hour()))
            }
            LabelTier::Extended if index % 6 == 0 => {
                at.map(|t| format!("{}/{}", t.month(), t.day()))
            }
            LabelTier::Weekly | LabelTier::Extended => None,
        }
        .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub key: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub unit_class: UnitClass,
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Thinned display labels.
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Build chart data for the selected variables.
///
/// Returns `None` while there is no snapshot to draw.
pub fn chart_data<S: AsRef<str>>(
    snapshot: Option<&WeatherSnapshot>,
    time_range: u32,
    selected: &[S],
    units: UnitSystem,
) -> Option<ChartData> {
    let snapshot = snapshot?;
    let labels = generate_labels(&snapshot.time, time_range);

    let datasets = selected
        .iter()
        .filter_map(|key| catalog::variable(key.as_ref()))
        .map(|var| {
            let points = snapshot
                .hourly
                .get(var.key)
                .map(|series| {
                    series
                        .iter()
                        .map(|v| v.map(|v| units::convert(v, var.unit_class, units)))
                        .collect()
                })
                .unwrap_or_default();

            Dataset {
                key: var.key,
                label: var.label,
                color: var.color,
                unit_class: var.unit_class,
                points,
            }
        })
        .collect();

    Some(ChartData { labels: thin_labels(&labels, time_range), datasets })
}

/// One label per timestamp, formatted for the range's tier.
pub fn generate_labels<S: AsRef<str>>(times: &[S], time_range: u32) -> Vec<String> {
    let tier = LabelTier::for_range(time_range);
    times
        .iter()
        .enumerate()
        .map(|(i, t)| tier.label(i, parse_timestamp(t.as_ref())))
        .collect()
}

/// Keep labels on the tier's stride plus any label the tier already filled.
pub fn thin_labels(labels: &[String], time_range: u32) -> Vec<String> {
    let skip = LabelTier::for_range(time_range).skip();
    labels
        .iter()
        .enumerate()
        .filter(|(i, label)| i % skip == 0 || !label.is_empty())
        .map(|(_, label)| label.clone())
        .collect()
}

/// Heading for a chart covering `hours`, e.g. "2 days Forecast".
pub fn forecast_title(hours: u32) -> String {
    let days = hours / 24;
    let rest = hours % 24;
    match (days, rest) {
        (0, h) => format!("{h} hour{} Forecast", plural(h)),
        (d, 0) => format!("{d} day{} Forecast", plural(d)),
        (d, h) => format!("{d}d {h}h Forecast"),
    }
}

fn plural(n: u32) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// Parse a source timestamp as local wall-clock time.
///
/// Open-Meteo with `timezone=auto` sends `YYYY-MM-DDTHH:MM` without an offset.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::TIME_RANGES,
        model::{CurrentConditions, HourlySeries},
    };
    use chrono::{Duration, NaiveDate};

    fn times(hours: usize) -> Vec<String> {
        // 2024-01-01 is a Monday.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid start");
        (0..hours)
            .map(|h| (start + Duration::hours(h as i64)).format("%Y-%m-%dT%H:%M").to_string())
            .collect()
    }

    fn snapshot(hours: usize) -> WeatherSnapshot {
        let mut hourly = HourlySeries::new();
        hourly.insert("temperature_2m".into(), vec![Some(10.0); hours]);
        hourly.insert("relativehumidity_2m".into(), vec![Some(60.0); hours]);
        hourly.insert("windspeed_10m".into(), vec![Some(100.0); hours]);
        WeatherSnapshot {
            time: times(hours),
            hourly,
            current: CurrentConditions { temperature: 10.0, windspeed: 100.0, winddirection: 0.0 },
        }
    }

    #[test]
    fn absent_snapshot_is_not_ready() {
        assert!(chart_data::<&str>(None, 24, &["temperature_2m"], UnitSystem::Metric).is_none());
    }

    #[test]
    fn dataset_and_label_lengths_match_time_for_every_range() {
        let selected = ["temperature_2m", "relativehumidity_2m", "windspeed_10m"];
        for range in TIME_RANGES {
            let snap = snapshot(range.hours as usize);
            let chart = chart_data(Some(&snap), range.hours, &selected, UnitSystem::Metric)
                .expect("chart data");

            assert_eq!(chart.datasets.len(), 3);
            for dataset in &chart.datasets {
                assert_eq!(dataset.points.len(), snap.time.len());
            }
            assert_eq!(generate_labels(&snap.time, range.hours).len(), snap.time.len());
            assert!(chart.labels.len() <= snap.time.len());
        }
    }

    #[test]
    fn hourly_tier_uses_padded_clock() {
        let labels = generate_labels(&times(24), 24);
        assert_eq!(labels[0], "00:00");
        assert_eq!(labels[9], "09:00");
        assert_eq!(labels[23], "23:00");
    }

    #[test]
    fn multi_day_tier_uses_weekday_and_hour() {
        let labels = generate_labels(&times(48), 48);
        assert_eq!(labels[0], "Mon 0h");
        assert_eq!(labels[25], "Tue 1h");
    }

    #[test]
    fn weekly_tier_labels_every_third_point() {
        let labels = generate_labels(&times(168), 168);
        assert_eq!(labels[0], "1/1 0h");
        assert_eq!(labels[1], "");
        assert_eq!(labels[2], "");
        assert_eq!(labels[3], "1/1 3h");
        assert_eq!(labels[27], "1/2 3h");
    }

    #[test]
    fn extended_tier_labels_every_sixth_point_with_date_only() {
        let labels = generate_labels(&times(240), 240);
        assert_eq!(labels[0], "1/1");
        assert_eq!(labels[5], "");
        assert_eq!(labels[24], "1/2");
    }

    #[test]
    fn thinning_composes_with_tiering() {
        // Weekly: stride 6 keeps 0, 6, 12...; tiering already filled 3, 9...
        let labels = generate_labels(&times(168), 168);
        let thinned = thin_labels(&labels, 168);
        assert_eq!(thinned.len(), 56);
        assert!(thinned.iter().all(|l| !l.is_empty()));

        // Extended: stride 8 keeps some empty labels (8, 16) next to filled ones.
        let labels = generate_labels(&times(48), 200);
        let thinned = thin_labels(&labels, 200);
        assert_eq!(
            thinned,
            ["1/1", "1/1", "", "1/1", "", "1/1", "1/2", "1/2", "", "1/2", "", "1/2"]
        );
    }

    #[test]
    fn full_tiers_keep_every_label() {
        let labels = generate_labels(&times(72), 72);
        assert_eq!(thin_labels(&labels, 72).len(), 72);
    }

    #[test]
    fn imperial_converts_only_temperature_and_speed() {
        let snap = snapshot(24);
        let chart = chart_data(
            Some(&snap),
            24,
            &["temperature_2m", "relativehumidity_2m", "windspeed_10m"],
            UnitSystem::Imperial,
        )
        .expect("chart data");

        assert_eq!(chart.datasets[0].points[0], Some(50.0));
        assert_eq!(chart.datasets[1].points[0], Some(60.0));
        let mph = chart.datasets[2].points[0].expect("value");
        assert!((mph - 62.1371).abs() < 1e-9);
    }

    #[test]
    fn unknown_variables_are_skipped_and_order_is_kept() {
        let snap = snapshot(24);
        let chart = chart_data(
            Some(&snap),
            24,
            &["windspeed_10m", "snow_depth", "temperature_2m"],
            UnitSystem::Metric,
        )
        .expect("chart data");

        let keys: Vec<_> = chart.datasets.iter().map(|d| d.key).collect();
        assert_eq!(keys, ["windspeed_10m", "temperature_2m"]);
        assert_eq!(chart.datasets[0].color, "#4BC0C0");
    }

    #[test]
    fn catalog_variable_without_data_yields_empty_dataset() {
        let snap = snapshot(24);
        let chart = chart_data(Some(&snap), 24, &["precipitation_probability"], UnitSystem::Metric)
            .expect("chart data");
        assert!(chart.datasets[0].points.is_empty());
    }

    #[test]
    fn missing_readings_stay_missing_after_conversion() {
        let mut snap = snapshot(24);
        snap.hourly.insert("temperature_2m".into(), {
            let mut v = vec![Some(0.0); 24];
            v[3] = None;
            v
        });
        let chart = chart_data(Some(&snap), 24, &["temperature_2m"], UnitSystem::Imperial)
            .expect("chart data");
        assert_eq!(chart.datasets[0].points[0], Some(32.0));
        assert_eq!(chart.datasets[0].points[3], None);
    }

    #[test]
    fn unparseable_timestamps_get_empty_labels() {
        let labels = generate_labels(&["garbage", "2024-01-01T05:00"], 24);
        assert_eq!(labels, ["", "05:00"]);
    }

    #[test]
    fn accepts_seconds_and_offsets() {
        assert!(parse_timestamp("2024-01-01T05:00:00").is_some());
        assert_eq!(
            parse_timestamp("2024-01-01T05:00:00+02:00").map(|t| t.hour()),
            Some(5)
        );
    }

    #[test]
    fn titles_follow_day_hour_split() {
        assert_eq!(forecast_title(24), "1 day Forecast");
        assert_eq!(forecast_title(168), "7 days Forecast");
        assert_eq!(forecast_title(30), "1d 6h Forecast");
        assert_eq!(forecast_title(12), "12 hours Forecast");
        assert_eq!(forecast_title(1), "1 hour Forecast");
    }
}
