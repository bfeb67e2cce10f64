//! Application state and the fetch cycles that keep it current.
//!
//! Every user event is a method on [`Dashboard`]. Events that change the
//! selected city or time range start a primary fetch cycle; events that
//! change the comparison inputs start a comparison cycle. Each cycle takes a
//! generation number when it starts and only applies its results if that
//! number is still current, so a slow response for a superseded selection is
//! dropped instead of overwriting newer data. Network calls are never
//! aborted.
//!
//! The state lock is only held for synchronous updates, never across a
//! network call.

use std::{sync::Arc, time::Duration};

use futures::future::try_join_all;
use tokio::sync::Mutex;

use crate::{
    Config,
    alerts::{self, Alert},
    comparison::ComparisonSet,
    error::{ComparisonError, FetchError},
    model::{AirQuality, City, ComparisonResult, Forecast, WeatherSnapshot},
    provider::WeatherProvider,
    series::{self, ChartData},
    units::UnitSystem,
};

/// Everything the view renders. Cloned out of the dashboard on request.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub selected_city: Option<City>,
    pub time_range: u32,
    pub variables: Vec<String>,
    pub units: UnitSystem,
    pub snapshot: Option<Arc<WeatherSnapshot>>,
    /// City `snapshot` was fetched for. Differs from `selected_city` after a
    /// failed fetch, since the previous snapshot is kept.
    pub snapshot_city: Option<City>,
    pub air_quality: Option<AirQuality>,
    pub alerts: Vec<Alert>,
    pub loading: bool,
    pub error: Option<String>,
    pub comparison: ComparisonSet,
    pub comparison_enabled: bool,
    pub comparison_results: Vec<ComparisonResult>,
}

impl DashboardState {
    /// Chart series for the current snapshot and selections.
    pub fn chart(&self) -> Option<ChartData> {
        series::chart_data(self.snapshot.as_deref(), self.time_range, &self.variables, self.units)
    }

    /// The held snapshot together with the city it belongs to.
    pub fn loaded(&self) -> Option<(&City, &WeatherSnapshot)> {
        Some((self.snapshot_city.as_ref()?, self.snapshot.as_deref()?))
    }
}

/// Startup selections and timing.
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub time_range: u32,
    pub variables: Vec<String>,
    pub units: UnitSystem,
    pub loading_delay: Duration,
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            time_range: config.time_range,
            variables: config.variables.clone(),
            units: config.units,
            loading_delay: Duration::from_millis(config.loading_delay_ms),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// How a fetch cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New data replaced the previous data.
    Applied,
    /// The fetch failed; previous data is kept.
    Failed,
    /// A newer cycle started first; results were dropped.
    Stale,
    /// Nothing to fetch, or nothing changed.
    Skipped,
    /// Comparison turned off or emptied; results cleared without a request.
    Cleared,
}

/// Inputs a comparison batch depends on.
#[derive(Debug, Clone, PartialEq)]
struct ComparisonKey {
    enabled: bool,
    cities: Vec<String>,
    time_range: u32,
    variables: Vec<String>,
}

impl ComparisonKey {
    fn of(state: &DashboardState) -> Self {
        Self {
            enabled: state.comparison_enabled,
            cities: state.comparison.cities().iter().map(|c| c.name.clone()).collect(),
            time_range: state.time_range,
            variables: state.variables.clone(),
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: DashboardState,
    weather_generation: u64,
    comparison_generation: u64,
    comparison_key: Option<ComparisonKey>,
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    inner: Arc<Mutex<Inner>>,
    provider: Arc<dyn WeatherProvider>,
    loading_delay: Duration,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, settings: DashboardSettings) -> Self {
        let state = DashboardState {
            selected_city: None,
            time_range: settings.time_range,
            variables: settings.variables,
            units: settings.units,
            snapshot: None,
            snapshot_city: None,
            air_quality: None,
            alerts: Vec::new(),
            loading: false,
            error: None,
            comparison: ComparisonSet::new(),
            comparison_enabled: false,
            comparison_results: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                weather_generation: 0,
                comparison_generation: 0,
                comparison_key: None,
            })),
            provider,
            loading_delay: settings.loading_delay,
        }
    }

    pub async fn state(&self) -> DashboardState {
        self.inner.lock().await.state.clone()
    }

    pub async fn select_city(&self, city: City) -> CycleOutcome {
        self.inner.lock().await.state.selected_city = Some(city);
        self.run_weather_cycle().await
    }

    /// Change the range; refetches the selected city and the comparison.
    pub async fn set_time_range(&self, hours: u32) -> CycleOutcome {
        self.inner.lock().await.state.time_range = hours;
        let (outcome, _) = tokio::join!(self.run_weather_cycle(), self.sync_comparison());
        outcome
    }

    /// Display-only; never fetches.
    pub async fn set_units(&self, units: UnitSystem) {
        self.inner.lock().await.state.units = units;
    }

    pub async fn set_variables(&self, variables: Vec<String>) -> CycleOutcome {
        self.inner.lock().await.state.variables = variables;
        self.sync_comparison().await
    }

    /// Add `key` to the selection, or remove it if already selected.
    pub async fn toggle_variable(&self, key: &str) -> CycleOutcome {
        {
            let mut inner = self.inner.lock().await;
            let variables = &mut inner.state.variables;
            match variables.iter().position(|v| v == key) {
                Some(index) => {
                    variables.remove(index);
                }
                None => variables.push(key.to_string()),
            }
        }
        self.sync_comparison().await
    }

    pub async fn set_comparison_enabled(&self, enabled: bool) -> CycleOutcome {
        self.inner.lock().await.state.comparison_enabled = enabled;
        self.sync_comparison().await
    }

    pub async fn add_comparison_city(&self, city: City) -> Result<CycleOutcome, ComparisonError> {
        self.inner.lock().await.state.comparison.add(city)?;
        Ok(self.sync_comparison().await)
    }

    pub async fn remove_comparison_city(
        &self,
        index: usize,
    ) -> Result<(City, CycleOutcome), ComparisonError> {
        let removed = self.inner.lock().await.state.comparison.remove(index)?;
        Ok((removed, self.sync_comparison().await))
    }

    /// Refetch the selected city without changing any selection.
    pub async fn refresh(&self) -> CycleOutcome {
        self.run_weather_cycle().await
    }

    /// Refetch the comparison batch even if its inputs are unchanged.
    pub async fn refresh_comparison(&self) -> CycleOutcome {
        self.inner.lock().await.comparison_key = None;
        self.sync_comparison().await
    }

    async fn run_weather_cycle(&self) -> CycleOutcome {
        let (generation, city, time_range) = {
            let mut inner = self.inner.lock().await;
            let Some(city) = inner.state.selected_city.clone() else {
                return CycleOutcome::Skipped;
            };
            inner.weather_generation += 1;
            inner.state.error = None;
            inner.state.loading = false;
            inner.state.air_quality = None;
            (inner.weather_generation, city, inner.state.time_range)
        };

        let primary = async {
            let fetch = self.provider.forecast(&city);
            tokio::pin!(fetch);

            let result = tokio::select! {
                result = &mut fetch => result,
                _ = tokio::time::sleep(self.loading_delay) => {
                    self.show_loading(generation).await;
                    fetch.await
                }
            };

            self.apply_forecast(generation, &city, time_range, result).await
        };

        let secondary = async {
            let result = self.provider.air_quality(&city).await;
            self.apply_air_quality(generation, &city, result).await;
        };

        let (outcome, ()) = tokio::join!(primary, secondary);
        outcome
    }

    async fn show_loading(&self, generation: u64) {
        let mut inner = self.inner.lock().await;
        if inner.weather_generation == generation {
            inner.state.loading = true;
        }
    }

    async fn apply_forecast(
        &self,
        generation: u64,
        city: &City,
        time_range: u32,
        result: Result<Forecast, FetchError>,
    ) -> CycleOutcome {
        let mut inner = self.inner.lock().await;
        if inner.weather_generation != generation {
            tracing::debug!(city = %city.name, "Dropping forecast for a superseded selection");
            return CycleOutcome::Stale;
        }

        inner.state.loading = false;
        match result {
            Ok(forecast) => {
                let snapshot = WeatherSnapshot::from_forecast(forecast, time_range);
                inner.state.alerts = alerts::evaluate(&snapshot.current);
                inner.state.snapshot = Some(Arc::new(snapshot));
                inner.state.snapshot_city = Some(city.clone());
                tracing::info!(city = %city.name, time_range, "Forecast updated");
                CycleOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(city = %city.name, "Forecast request failed: {}", e);
                inner.state.error = Some(e.to_string());
                CycleOutcome::Failed
            }
        }
    }

    async fn apply_air_quality(
        &self,
        generation: u64,
        city: &City,
        result: Result<AirQuality, FetchError>,
    ) {
        match result {
            Ok(air_quality) => {
                let mut inner = self.inner.lock().await;
                if inner.weather_generation == generation {
                    inner.state.air_quality = Some(air_quality);
                }
            }
            Err(e) => tracing::warn!(city = %city.name, "Failed to fetch air quality: {}", e),
        }
    }

    /// Refetch the comparison batch if its inputs changed since the last run.
    async fn sync_comparison(&self) -> CycleOutcome {
        let (generation, cities, time_range) = {
            let mut inner = self.inner.lock().await;
            let key = ComparisonKey::of(&inner.state);
            if inner.comparison_key.as_ref() == Some(&key) {
                return CycleOutcome::Skipped;
            }

            inner.comparison_key = Some(key);
            inner.comparison_generation += 1;

            if !inner.state.comparison_enabled || inner.state.comparison.is_empty() {
                inner.state.comparison_results = Vec::new();
                return CycleOutcome::Cleared;
            }

            (
                inner.comparison_generation,
                inner.state.comparison.cities().to_vec(),
                inner.state.time_range,
            )
        };

        let fetches = cities.iter().map(|city| async move {
            let forecast = self.provider.forecast(city).await?;
            Ok::<_, FetchError>(ComparisonResult {
                city: city.clone(),
                snapshot: WeatherSnapshot::from_forecast(forecast, time_range),
            })
        });
        let result = try_join_all(fetches).await;

        let mut inner = self.inner.lock().await;
        if inner.comparison_generation != generation {
            tracing::debug!("Dropping superseded comparison batch");
            return CycleOutcome::Stale;
        }

        match result {
            Ok(results) => {
                tracing::info!(cities = results.len(), "Comparison updated");
                inner.state.comparison_results = results;
                CycleOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to fetch comparison data: {}", e);
                CycleOutcome::Failed
            }
        }
    }
}
