use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{
    Config,
    error::FetchError,
    model::{AirQuality, City, Forecast},
    provider::open_meteo::OpenMeteoProvider,
};

pub mod open_meteo;

/// Source of forecast and air-quality data for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Hourly series for every catalog variable plus current conditions.
    async fn forecast(&self, city: &City) -> Result<Forecast, FetchError>;

    /// Current air quality. Callers treat failures as best-effort.
    async fn air_quality(&self, city: &City) -> Result<AirQuality, FetchError>;
}

/// Construct the provider described by the configured endpoints.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenMeteoProvider::new(
        &config.forecast_url,
        &config.air_quality_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(Arc::new(provider))
}
