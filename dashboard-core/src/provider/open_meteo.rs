use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    catalog,
    error::FetchError,
    model::{AirQuality, City, CurrentConditions, Forecast, HourlySeries},
};

use super::WeatherProvider;

pub const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const AIR_QUALITY_URL: &str = "https://air-quality-api.open-meteo.com/v1/air-quality";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    forecast_url: String,
    air_quality_url: String,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(
        forecast_url: &str,
        air_quality_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            forecast_url: forecast_url.to_string(),
            air_quality_url: air_quality_url.to_string(),
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    #[serde(flatten)]
    series: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    hourly: OmHourly,
    current_weather: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct OmAirQualityResponse {
    current: AirQuality,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn forecast(&self, city: &City) -> Result<Forecast, FetchError> {
        let query = [
            ("latitude", city.lat.to_string()),
            ("longitude", city.lon.to_string()),
            ("hourly", catalog::hourly_query()),
            ("timezone", "auto".to_string()),
            ("current_weather", "true".to_string()),
        ];

        tracing::debug!(city = %city.name, "Requesting forecast");
        let parsed: OmForecastResponse = self.get_json(&self.forecast_url, &query).await?;

        Ok(Forecast {
            time: parsed.hourly.time,
            hourly: parsed.hourly.series,
            current: parsed.current_weather,
        })
    }

    async fn air_quality(&self, city: &City) -> Result<AirQuality, FetchError> {
        let query = [
            ("latitude", city.lat.to_string()),
            ("longitude", city.lon.to_string()),
            ("current", "european_aqi,us_aqi".to_string()),
            ("hourly", "pm10,pm2_5".to_string()),
        ];

        tracing::debug!(city = %city.name, "Requesting air quality");
        let parsed: OmAirQualityResponse = self.get_json(&self.air_quality_url, &query).await?;
        Ok(parsed.current)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
