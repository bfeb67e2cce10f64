use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Result, bail};
use chrono::Utc;
use dashboard_core::{
    City, CityCatalog, Config, CycleOutcome, Dashboard, DashboardSettings, FavoritesStore,
    export::{self, ExportFormat, ExportSink, FileExporter},
    provider_from_config,
    storage::{FileKeyValueStore, KeyValueStore},
};

use crate::render;

const LOADING_POLL: Duration = Duration::from_millis(50);

/// Everything a command needs, built once from the loaded config.
#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub catalog: CityCatalog,
    pub dashboard: Dashboard,
    pub favorites: FavoritesStore,
    exporter: FileExporter,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        let catalog = config.city_catalog()?;
        let provider = provider_from_config(&config)?;
        let dashboard = Dashboard::new(provider, DashboardSettings::from_config(&config));

        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(config.data_dir()?));
        let favorites = FavoritesStore::load(store).await;
        let exporter = FileExporter::new(config.export_dir()?);

        tracing::debug!(
            cities = catalog.cities().len(),
            favorites = favorites.cities().len(),
            "Dashboard ready"
        );
        Ok(Self { config, catalog, dashboard, favorites, exporter })
    }

    /// Exact name first, then a unique substring match.
    pub fn resolve_city(&self, name: &str) -> Result<City> {
        if let Some(city) = self.catalog.find(name) {
            return Ok(city.clone());
        }

        match self.catalog.search(name).as_slice() {
            [only] => Ok((*only).clone()),
            [] => bail!("Unknown city '{name}'. Try `dashboard cities {name}`."),
            many => {
                let names: Vec<_> = many.iter().map(|c| c.name.as_str()).collect();
                bail!("'{name}' matches several cities: {}", names.join(", "))
            }
        }
    }

    /// The configured default city, or the first one in the catalog.
    pub fn startup_city(&self) -> Option<City> {
        self.config
            .default_city
            .as_deref()
            .and_then(|name| self.catalog.find(name))
            .or_else(|| self.catalog.first())
            .cloned()
    }

    /// Drive a dashboard operation, printing a notice once the loading flag
    /// comes up.
    pub async fn with_loading<F>(&self, op: F) -> CycleOutcome
    where
        F: Future<Output = CycleOutcome>,
    {
        tokio::pin!(op);
        let mut shown = false;
        loop {
            tokio::select! {
                outcome = &mut op => return outcome,
                _ = tokio::time::sleep(LOADING_POLL), if !shown => {
                    if self.dashboard.state().await.loading {
                        eprintln!("Loading...");
                        shown = true;
                    }
                }
            }
        }
    }

    pub fn is_favorite(&self, city: Option<&City>) -> bool {
        city.is_some_and(|c| self.favorites.contains(&c.name))
    }

    /// Write the current snapshot. `None` when nothing has loaded yet.
    pub async fn export(&self, format: ExportFormat) -> Result<Option<PathBuf>> {
        let state = self.dashboard.state().await;
        let Some((city, snapshot)) = state.loaded() else {
            return Ok(None);
        };

        let now = Utc::now();
        let contents = match format {
            ExportFormat::Csv => export::to_csv(snapshot, &state.variables),
            ExportFormat::Json => export::to_json(snapshot, city, state.time_range, now)?,
        };
        let path = self.exporter.write(&format.file_name(city, now), &contents).await?;
        Ok(Some(path))
    }

    /// Share text for the current conditions, if any.
    pub async fn share_message(&self) -> Option<String> {
        let state = self.dashboard.state().await;
        let (city, snapshot) = state.loaded()?;
        Some(export::share_message(city, &snapshot.current, state.units))
    }

    pub async fn print_dashboard(&self) {
        let state = self.dashboard.state().await;
        let favorite = self.is_favorite(state.snapshot_city.as_ref());
        println!("{}", render::dashboard(&state, favorite));
    }
}
