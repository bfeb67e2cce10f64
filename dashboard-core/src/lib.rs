//! Core library for the weather `dashboard`.
//!
//! This crate defines:
//! - Fixed catalogs (variables, time ranges) and the city list
//! - Unit conversion and chart series preparation
//! - Threshold alerts, favorites, the comparison set and exports
//! - The [`Dashboard`] state and its fetch cycles over a [`WeatherProvider`]
//! - Configuration handling
//!
//! It is used by `dashboard-cli`, but can also back other front-ends.

pub mod alerts;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod favorites;
pub mod model;
pub mod provider;
pub mod series;
pub mod storage;
pub mod units;

pub use catalog::CityCatalog;
pub use config::Config;
pub use dashboard::{CycleOutcome, Dashboard, DashboardSettings, DashboardState};
pub use favorites::FavoritesStore;
pub use model::{AirQuality, City, CurrentConditions, WeatherSnapshot};
pub use provider::{WeatherProvider, provider_from_config};
pub use units::UnitSystem;
