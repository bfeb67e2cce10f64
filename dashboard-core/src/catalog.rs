//! Fixed catalogs: chartable variables, time ranges and the city list.

use std::{cmp::Ordering, path::Path};

use anyhow::{Context, Result};

use crate::model::City;

/// How a variable's values respond to the unit system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    None,
    Temperature,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub unit_class: UnitClass,
    pub color: &'static str,
}

pub const VARIABLES: [VariableDescriptor; 5] = [
    VariableDescriptor {
        key: "temperature_2m",
        label: "Temperature",
        unit_class: UnitClass::Temperature,
        color: "#FF6384",
    },
    VariableDescriptor {
        key: "relativehumidity_2m",
        label: "Humidity (%)",
        unit_class: UnitClass::None,
        color: "#36A2EB",
    },
    VariableDescriptor {
        key: "apparent_temperature",
        label: "Feels Like",
        unit_class: UnitClass::Temperature,
        color: "#FF9F40",
    },
    VariableDescriptor {
        key: "windspeed_10m",
        label: "Wind Speed",
        unit_class: UnitClass::Speed,
        color: "#4BC0C0",
    },
    VariableDescriptor {
        key: "precipitation_probability",
        label: "Rain Chance (%)",
        unit_class: UnitClass::None,
        color: "#66CCFF",
    },
];

/// Variables charted when nothing else is configured.
pub const DEFAULT_VARIABLES: [&str; 2] = ["temperature_2m", "relativehumidity_2m"];

pub fn variable(key: &str) -> Option<&'static VariableDescriptor> {
    VARIABLES.iter().find(|v| v.key == key)
}

/// Comma-joined catalog keys, as sent in the `hourly` query parameter.
pub fn hourly_query() -> String {
    VARIABLES.iter().map(|v| v.key).collect::<Vec<_>>().join(",")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRangeOption {
    pub label: &'static str,
    pub hours: u32,
}

pub const TIME_RANGES: [TimeRangeOption; 4] = [
    TimeRangeOption { label: "1 Day", hours: 24 },
    TimeRangeOption { label: "2 Days", hours: 48 },
    TimeRangeOption { label: "3 Days", hours: 72 },
    TimeRangeOption { label: "7 Days", hours: 168 },
];

pub const DEFAULT_TIME_RANGE: u32 = 24;

pub fn time_range(hours: u32) -> Option<&'static TimeRangeOption> {
    TIME_RANGES.iter().find(|r| r.hours == hours)
}

/// Number of cities listed when the search query is empty.
const UNFILTERED_LIMIT: usize = 20;

const BUILTIN_CITIES: &str = include_str!("../data/cities.json");

/// The static city list, sorted by name.
#[derive(Debug, Clone)]
pub struct CityCatalog {
    cities: Vec<City>,
}

impl CityCatalog {
    pub fn new(mut cities: Vec<City>) -> Self {
        cities.sort_by(|a, b| compare_names(&a.name, &b.name));
        Self { cities }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let cities: Vec<City> = serde_json::from_str(json).context("Failed to parse city list")?;
        Ok(Self::new(cities))
    }

    /// The list bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CITIES)
    }

    /// Load from a JSON file of `{name, lat, lon}` records.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read city list: {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid city list: {}", path.display()))
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn first(&self) -> Option<&City> {
        self.cities.first()
    }

    pub fn find(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.name == name)
    }

    /// Case-insensitive substring search. An empty query lists the first
    /// few cities.
    pub fn search(&self, query: &str) -> Vec<&City> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.cities.iter().take(UNFILTERED_LIMIT).collect();
        }
        self.cities.iter().filter(|c| c.name.to_lowercase().contains(&query)).collect()
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}
