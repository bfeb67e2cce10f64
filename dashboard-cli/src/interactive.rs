//! Prompt loop over a [`Dashboard`](dashboard_core::Dashboard).

use std::fmt;

use anyhow::{Result, anyhow};
use dashboard_core::{
    City, Config, CycleOutcome, UnitSystem,
    catalog::{TIME_RANGES, VARIABLES},
    error::ComparisonError,
    export::ExportFormat,
};
use inquire::{InquireError, MultiSelect, Select};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SelectCity,
    OpenFavorite,
    ToggleFavorite,
    TimeRange,
    Units,
    Variables,
    ToggleComparison,
    AddComparisonCity,
    RemoveComparisonCity,
    ExportCsv,
    ExportJson,
    Share,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 14] = [
        Action::SelectCity,
        Action::OpenFavorite,
        Action::ToggleFavorite,
        Action::TimeRange,
        Action::Units,
        Action::Variables,
        Action::ToggleComparison,
        Action::AddComparisonCity,
        Action::RemoveComparisonCity,
        Action::ExportCsv,
        Action::ExportJson,
        Action::Share,
        Action::Refresh,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::SelectCity => "Select city",
            Action::OpenFavorite => "Open a favorite",
            Action::ToggleFavorite => "Add/remove favorite",
            Action::TimeRange => "Change time range",
            Action::Units => "Switch units",
            Action::Variables => "Choose variables",
            Action::ToggleComparison => "Show/hide comparison",
            Action::AddComparisonCity => "Add city to comparison",
            Action::RemoveComparisonCity => "Remove city from comparison",
            Action::ExportCsv => "Export CSV",
            Action::ExportJson => "Export JSON",
            Action::Share => "Share",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        };
        f.write_str(text)
    }
}

/// `Ok(None)` when the user backs out of a prompt.
fn skippable<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub async fn run(mut app: App) -> Result<()> {
    if let Some(city) = app.startup_city() {
        app.with_loading(app.dashboard.select_city(city)).await;
    }

    loop {
        println!();
        app.print_dashboard().await;

        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };
        if action == Action::Quit {
            break;
        }

        handle(&mut app, action).await?;
    }

    Ok(())
}

async fn handle(app: &mut App, action: Action) -> Result<()> {
    let state = app.dashboard.state().await;

    match action {
        Action::SelectCity => {
            if let Some(city) = pick_city(app.catalog.cities(), "City:")? {
                app.with_loading(app.dashboard.select_city(city)).await;
            }
        }
        Action::OpenFavorite => {
            if app.favorites.cities().is_empty() {
                println!("No favorites yet.");
            } else if let Some(city) = pick_city(app.favorites.cities(), "Favorite:")? {
                app.with_loading(app.dashboard.select_city(city)).await;
            }
        }
        Action::ToggleFavorite => {
            let Some(city) = state.selected_city else {
                return Ok(());
            };
            match app.favorites.toggle(&city).await {
                Ok(true) => println!("Added {} to favorites.", city.name),
                Ok(false) => println!("Removed {} from favorites.", city.name),
                Err(e) => println!("Could not save favorites: {e}"),
            }
        }
        Action::TimeRange => {
            let labels: Vec<_> = TIME_RANGES.iter().map(|r| r.label).collect();
            let cursor = TIME_RANGES.iter().position(|r| r.hours == state.time_range).unwrap_or(0);
            let choice =
                skippable(Select::new("Time range:", labels).with_starting_cursor(cursor).prompt())?;
            if let Some(range) = choice.and_then(|label| TIME_RANGES.iter().find(|r| r.label == label)) {
                app.with_loading(app.dashboard.set_time_range(range.hours)).await;
            }
        }
        Action::Units => {
            let next = match state.units {
                UnitSystem::Metric => UnitSystem::Imperial,
                UnitSystem::Imperial => UnitSystem::Metric,
            };
            app.dashboard.set_units(next).await;
        }
        Action::Variables => {
            let labels: Vec<_> = VARIABLES.iter().map(|v| v.label).collect();
            let selected: Vec<_> = VARIABLES
                .iter()
                .enumerate()
                .filter(|(_, v)| state.variables.iter().any(|k| k == v.key))
                .map(|(i, _)| i)
                .collect();
            let choice = skippable(
                MultiSelect::new("Variables:", labels).with_default(&selected).prompt(),
            )?;
            if let Some(chosen) = choice {
                let keys = VARIABLES
                    .iter()
                    .filter(|v| chosen.contains(&v.label))
                    .map(|v| v.key.to_string())
                    .collect();
                report_comparison(app.dashboard.set_variables(keys).await);
            }
        }
        Action::ToggleComparison => {
            report_comparison(app.dashboard.set_comparison_enabled(!state.comparison_enabled).await);
        }
        Action::AddComparisonCity => {
            if let Some(city) = pick_city(app.catalog.cities(), "Compare with:")? {
                match app.dashboard.add_comparison_city(city).await {
                    Ok(outcome) => report_comparison(outcome),
                    Err(ComparisonError::Duplicate(_)) => {}
                    Err(e) => println!("{e}"),
                }
            }
        }
        Action::RemoveComparisonCity => {
            let names: Vec<_> = state.comparison.cities().iter().map(|c| c.name.clone()).collect();
            if names.is_empty() {
                println!("No cities in comparison.");
                return Ok(());
            }
            if let Some(name) = skippable(Select::new("Remove:", names.clone()).prompt())? {
                let index = names
                    .iter()
                    .position(|n| *n == name)
                    .ok_or_else(|| anyhow!("'{name}' is not in the comparison"))?;
                let (removed, outcome) = app.dashboard.remove_comparison_city(index).await?;
                println!("Removed {} from comparison.", removed.name);
                report_comparison(outcome);
            }
        }
        Action::ExportCsv => export(app, ExportFormat::Csv).await,
        Action::ExportJson => export(app, ExportFormat::Json).await,
        Action::Share => match app.share_message().await {
            Some(message) => println!("{message}"),
            None => println!("Nothing to share yet."),
        },
        Action::Refresh => {
            app.with_loading(app.dashboard.refresh()).await;
            report_comparison(app.dashboard.refresh_comparison().await);
        }
        Action::Quit => {}
    }

    Ok(())
}

fn pick_city(cities: &[City], prompt: &str) -> Result<Option<City>> {
    let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
    let choice = skippable(Select::new(prompt, names).with_page_size(10).prompt())?;
    Ok(choice.and_then(|name| cities.iter().find(|c| c.name == name)).cloned())
}

async fn export(app: &App, format: ExportFormat) {
    match app.export(format).await {
        Ok(Some(path)) => println!("Exported to {}", path.display()),
        Ok(None) => println!("Nothing to export yet."),
        Err(e) => println!("Export failed: {e:#}"),
    }
}

fn report_comparison(outcome: CycleOutcome) {
    if outcome == CycleOutcome::Failed {
        println!("Failed to fetch comparison data.");
    }
}

/// Prompt for the saved display defaults.
pub fn configure(config: &mut Config) -> Result<()> {
    let units = vec![UnitSystem::Metric, UnitSystem::Imperial];
    let cursor = usize::from(config.units.is_imperial());
    config.units = Select::new("Units:", units).with_starting_cursor(cursor).prompt()?;

    let labels: Vec<_> = TIME_RANGES.iter().map(|r| r.label).collect();
    let cursor = TIME_RANGES.iter().position(|r| r.hours == config.time_range).unwrap_or(0);
    let label = Select::new("Default time range:", labels).with_starting_cursor(cursor).prompt()?;
    if let Some(range) = TIME_RANGES.iter().find(|r| r.label == label) {
        config.time_range = range.hours;
    }

    let catalog = config.city_catalog()?;
    let names: Vec<_> = catalog.cities().iter().map(|c| c.name.as_str()).collect();
    let cursor = config
        .default_city
        .as_deref()
        .and_then(|name| names.iter().position(|n| *n == name))
        .unwrap_or(0);
    let city = Select::new("Startup city:", names).with_starting_cursor(cursor).prompt()?;
    config.default_city = Some(city.to_string());

    Ok(())
}
