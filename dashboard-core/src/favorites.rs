use std::sync::Arc;

use crate::{error::StorageError, model::City, storage::KeyValueStore};

/// Storage key holding the serialized favorites list.
pub const FAVORITES_KEY: &str = "favorites";

/// Ordered favorites, unique by city name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesSet {
    cities: Vec<City>,
}

impl FavoritesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored list, dropping later entries that repeat a name.
    pub fn from_cities(cities: Vec<City>) -> Self {
        let mut set = Self::new();
        for city in cities {
            if !set.contains(&city.name) {
                set.cities.push(city);
            }
        }
        set
    }

    /// Remove `city` if a city with its name is present, otherwise append it.
    /// Returns whether the city is a favorite afterwards.
    pub fn toggle(&mut self, city: &City) -> bool {
        if self.contains(&city.name) {
            self.cities.retain(|c| c.name != city.name);
            false
        } else {
            self.cities.push(city.clone());
            true
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cities.iter().any(|c| c.name == name)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

/// Favorites backed by a key-value store. Every change writes the whole list.
#[derive(Debug)]
pub struct FavoritesStore {
    set: FavoritesSet,
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesStore {
    /// Read the persisted list. Missing or unreadable data starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let set = match store.get(FAVORITES_KEY).await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<City>>(&json) {
                Ok(cities) => FavoritesSet::from_cities(cities),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable favorites: {}", e);
                    FavoritesSet::new()
                }
            },
            Ok(None) => FavoritesSet::new(),
            Err(e) => {
                tracing::warn!("Failed to load favorites: {}", e);
                FavoritesSet::new()
            }
        };

        tracing::debug!(count = set.cities().len(), "Favorites loaded");
        Self { set, store }
    }

    /// Toggle `city` and persist. The in-memory change stands even if the
    /// write fails.
    pub async fn toggle(&mut self, city: &City) -> Result<bool, StorageError> {
        let now_favorite = self.set.toggle(city);
        self.persist().await?;
        Ok(now_favorite)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    pub fn cities(&self) -> &[City] {
        self.set.cities()
    }

    async fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(self.set.cities())?;
        self.store.set(FAVORITES_KEY, &json).await
    }
}
