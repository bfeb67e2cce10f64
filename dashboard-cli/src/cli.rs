use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dashboard_core::{
    Config, CycleOutcome, UnitSystem,
    catalog::{self, TIME_RANGES},
    error::ComparisonError,
    export::ExportFormat,
};

use crate::{app::App, interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Weather dashboard backed by Open-Meteo")]
pub struct Cli {
    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prompt-driven dashboard.
    Interactive,

    /// Current conditions, alerts, air quality and a chart for one city.
    Show {
        city: String,

        /// Hours of forecast: 24, 48, 72 or 168.
        #[arg(long, value_parser = parse_range)]
        range: Option<u32>,

        /// Hourly variable to chart; repeat for several.
        #[arg(long = "var", value_parser = parse_variable)]
        vars: Vec<String>,

        #[arg(long)]
        imperial: bool,
    },

    /// Current temperature and wind side by side for up to three cities.
    Compare {
        #[arg(required = true)]
        cities: Vec<String>,

        #[arg(long, value_parser = parse_range)]
        range: Option<u32>,
    },

    /// Write a city's forecast to the export directory.
    Export {
        city: String,

        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_parser = parse_range)]
        range: Option<u32>,

        #[arg(long = "var", value_parser = parse_variable)]
        vars: Vec<String>,
    },

    /// List or toggle favorite cities.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Search the city list.
    Cities { query: Option<String> },

    /// Set display defaults. Prompts when no flag is given.
    Configure {
        #[arg(long)]
        units: Option<UnitSystem>,

        #[arg(long, value_parser = parse_range)]
        range: Option<u32>,

        /// City selected at startup.
        #[arg(long)]
        city: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    Toggle { city: String },
}

fn parse_range(s: &str) -> Result<u32, String> {
    let hours: u32 = s.parse().map_err(|_| format!("'{s}' is not a number of hours"))?;
    match catalog::time_range(hours) {
        Some(option) => Ok(option.hours),
        None => {
            let supported: Vec<_> = TIME_RANGES.iter().map(|r| r.hours.to_string()).collect();
            Err(format!("Unsupported range {hours}. Supported values: {}.", supported.join(", ")))
        }
    }
}

fn parse_variable(s: &str) -> Result<String, String> {
    match catalog::variable(s) {
        Some(descriptor) => Ok(descriptor.key.to_string()),
        None => Err(format!("Unknown variable '{s}'. Known variables:\n{}", render::variable_help())),
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command.unwrap_or(Command::Interactive) {
            Command::Interactive => {
                let app = App::new(config).await?;
                interactive::run(app).await?;
            }
            Command::Show { city, range, vars, imperial } => {
                let config = with_overrides(config, range, vars, imperial.then_some(UnitSystem::Imperial));
                let app = App::new(config).await?;
                let city = app.resolve_city(&city)?;

                let outcome = app.with_loading(app.dashboard.select_city(city)).await;
                if outcome == CycleOutcome::Failed {
                    bail!(failure(&app).await);
                }
                app.print_dashboard().await;
            }
            Command::Compare { cities, range } => {
                let config = with_overrides(config, range, Vec::new(), None);
                let app = App::new(config).await?;

                // Fill the set while disabled so only one batch is fetched.
                for name in &cities {
                    let city = app.resolve_city(name)?;
                    match app.dashboard.add_comparison_city(city).await {
                        Ok(_) | Err(ComparisonError::Duplicate(_)) => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                if app.dashboard.set_comparison_enabled(true).await == CycleOutcome::Failed {
                    bail!("Failed to fetch comparison data.");
                }

                let state = app.dashboard.state().await;
                println!("{}", render::comparison(&state.comparison_results, state.units));
            }
            Command::Export { city, format, range, vars } => {
                let config = with_overrides(config, range, vars, None);
                let app = App::new(config).await?;
                let city = app.resolve_city(&city)?;

                if app.dashboard.select_city(city).await == CycleOutcome::Failed {
                    bail!(failure(&app).await);
                }
                match app.export(format).await.context("Export failed")? {
                    Some(path) => println!("Exported to {}", path.display()),
                    None => println!("Nothing to export."),
                }
            }
            Command::Favorites { action } => {
                let mut app = App::new(config).await?;
                match action.unwrap_or(FavoritesAction::List) {
                    FavoritesAction::List if app.favorites.cities().is_empty() => {
                        println!("No favorites yet.");
                    }
                    FavoritesAction::List => println!("{}", render::cities(app.favorites.cities())),
                    FavoritesAction::Toggle { city } => {
                        let city = app.resolve_city(&city)?;
                        let added = app
                            .favorites
                            .toggle(&city)
                            .await
                            .context("Failed to save favorites")?;
                        if added {
                            println!("Added {} to favorites.", city.name);
                        } else {
                            println!("Removed {} from favorites.", city.name);
                        }
                    }
                }
            }
            Command::Cities { query } => {
                let catalog = config.city_catalog()?;
                let matches = catalog.search(query.as_deref().unwrap_or(""));
                if matches.is_empty() {
                    println!("No cities found.");
                } else {
                    println!("{}", render::cities(matches));
                }
            }
            Command::Configure { units, range, city } => {
                let mut config = config;
                if units.is_none() && range.is_none() && city.is_none() {
                    interactive::configure(&mut config)?;
                } else {
                    if let Some(units) = units {
                        config.units = units;
                    }
                    if let Some(range) = range {
                        config.time_range = range;
                    }
                    if let Some(name) = city {
                        let catalog = config.city_catalog()?;
                        let found = catalog
                            .find(&name)
                            .ok_or_else(|| anyhow!("Unknown city '{name}'."))?;
                        config.default_city = Some(found.name.clone());
                    }
                }

                config.save()?;
                let path = Config::config_file_path()?;
                tracing::info!(units = %config.units, time_range = config.time_range, "Configuration updated");
                println!("Configuration saved to {}", path.display());
            }
        }

        Ok(())
    }
}

fn with_overrides(
    mut config: Config,
    range: Option<u32>,
    vars: Vec<String>,
    units: Option<UnitSystem>,
) -> Config {
    if let Some(range) = range {
        config.time_range = range;
    }
    if !vars.is_empty() {
        config.variables = vars;
    }
    if let Some(units) = units {
        config.units = units;
    }
    config
}

async fn failure(app: &App) -> String {
    app.dashboard
        .state()
        .await
        .error
        .unwrap_or_else(|| "Failed to fetch weather data.".to_string())
}
