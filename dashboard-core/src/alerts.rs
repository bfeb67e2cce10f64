use serde::Serialize;

use crate::model::CurrentConditions;

const HEAT_THRESHOLD_C: f64 = 35.0;
const COLD_THRESHOLD_C: f64 = -10.0;
const WIND_THRESHOLD_KPH: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Heat,
    Cold,
    Wind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Moderate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: &'static str,
    pub severity: Severity,
}

/// Threshold alerts for the given metric readings.
///
/// Heat and cold are exclusive; wind is evaluated on its own and may
/// accompany either.
pub fn evaluate(current: &CurrentConditions) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if current.temperature > HEAT_THRESHOLD_C {
        alerts.push(Alert {
            kind: AlertKind::Heat,
            message: "Extreme heat warning",
            severity: Severity::High,
        });
    } else if current.temperature < COLD_THRESHOLD_C {
        alerts.push(Alert {
            kind: AlertKind::Cold,
            message: "Extreme cold warning",
            severity: Severity::High,
        });
    }

    if current.windspeed > WIND_THRESHOLD_KPH {
        alerts.push(Alert {
            kind: AlertKind::Wind,
            message: "High wind warning",
            severity: Severity::Moderate,
        });
    }

    alerts
}

/// US/EU AQI category name. A reading of 0 is treated as no reading.
pub fn aqi_description(aqi: Option<f64>) -> &'static str {
    match aqi {
        None => "Unknown",
        Some(v) if v == 0.0 || v.is_nan() => "Unknown",
        Some(v) if v <= 50.0 => "Good",
        Some(v) if v <= 100.0 => "Moderate",
        Some(v) if v <= 150.0 => "Unhealthy for Sensitive Groups",
        Some(v) if v <= 200.0 => "Unhealthy",
        Some(v) if v <= 300.0 => "Very Unhealthy",
        Some(_) => "Hazardous",
    }
}
