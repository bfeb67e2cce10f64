//! Metric/imperial conversion and display formatting.
//!
//! Stored data is always metric. Conversion only ever goes metric to display
//! units and is applied at the point of display.

use serde::{Deserialize, Serialize};

use crate::catalog::UnitClass;

const KPH_TO_MPH: f64 = 0.621371;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn is_imperial(self) -> bool {
        self == UnitSystem::Imperial
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(format!("Unknown unit system '{s}'. Expected metric or imperial.")),
        }
    }
}

pub fn convert_temperature(celsius: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => celsius,
        UnitSystem::Imperial => celsius * 9.0 / 5.0 + 32.0,
    }
}

pub fn convert_speed(kph: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => kph,
        UnitSystem::Imperial => kph * KPH_TO_MPH,
    }
}

/// Convert a metric reading according to its variable's unit class.
pub fn convert(value: f64, class: UnitClass, units: UnitSystem) -> f64 {
    match class {
        UnitClass::Temperature => convert_temperature(value, units),
        UnitClass::Speed => convert_speed(value, units),
        UnitClass::None => value,
    }
}

pub fn format_temperature(celsius: f64, units: UnitSystem) -> String {
    let value = rounded(convert_temperature(celsius, units));
    format!("{value}{}", unit_suffix(UnitClass::Temperature, units))
}

pub fn format_speed(kph: f64, units: UnitSystem) -> String {
    let value = rounded(convert_speed(kph, units));
    format!("{value} {}", unit_suffix(UnitClass::Speed, units))
}

// Ties round toward +inf (-2.5 -> -2). Adding zero folds -0 into 0 so
// "-0°C" never shows.
fn rounded(value: f64) -> f64 {
    (value + 0.5).floor() + 0.0
}

pub fn unit_suffix(class: UnitClass, units: UnitSystem) -> &'static str {
    match (class, units) {
        (UnitClass::Temperature, UnitSystem::Metric) => "°C",
        (UnitClass::Temperature, UnitSystem::Imperial) => "°F",
        (UnitClass::Speed, UnitSystem::Metric) => "km/h",
        (UnitClass::Speed, UnitSystem::Imperial) => "mph",
        (UnitClass::None, _) => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freezing_point_formats_exactly() {
        assert_eq!(format_temperature(0.0, UnitSystem::Metric), "0°C");
        assert_eq!(format_temperature(0.0, UnitSystem::Imperial), "32°F");
    }

    #[test]
    fn temperature_conversion_is_unrounded() {
        assert_eq!(convert_temperature(21.5, UnitSystem::Metric), 21.5);
        assert!((convert_temperature(21.5, UnitSystem::Imperial) - 70.7).abs() < 1e-9);
    }

    #[test]
    fn speed_conversion_uses_mile_factor() {
        assert!((convert_speed(100.0, UnitSystem::Imperial) - 62.1371).abs() < 1e-9);
        assert_eq!(convert_speed(100.0, UnitSystem::Metric), 100.0);
    }

    #[test]
    fn formatting_rounds_to_nearest_integer() {
        assert_eq!(format_temperature(-3.6, UnitSystem::Metric), "-4°C");
        assert_eq!(format_speed(12.5, UnitSystem::Metric), "13 km/h");
        assert_eq!(format_speed(100.0, UnitSystem::Imperial), "62 mph");
    }

    #[test]
    fn small_negatives_do_not_render_negative_zero() {
        assert_eq!(format_temperature(-0.4, UnitSystem::Metric), "0°C");
        assert_eq!(format_temperature(-0.5, UnitSystem::Metric), "0°C");
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(format_temperature(-2.5, UnitSystem::Metric), "-2°C");
        assert_eq!(format_temperature(2.5, UnitSystem::Metric), "3°C");
        assert_eq!(format_speed(-1.5, UnitSystem::Metric), "-1 km/h");
    }

    #[test]
    fn convert_leaves_unitless_values_alone() {
        assert_eq!(convert(55.0, UnitClass::None, UnitSystem::Imperial), 55.0);
        assert_eq!(convert(10.0, UnitClass::Temperature, UnitSystem::Imperial), 50.0);
    }

    #[test]
    fn parses_unit_system_names() {
        assert_eq!("Imperial".parse::<UnitSystem>(), Ok(UnitSystem::Imperial));
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }
}
