use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{fmt, io::Write};
use weather_core::{
    Config, Favorites, FavoritesStore, OpenWeatherClient, Session, WeatherLookup,
    client_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather and 5-day forecast by city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "Paris" or "Paris,FR".
        #[arg(required_unless_present = "favorite")]
        city: Option<String>,

        /// Look up the N-th favorite (1-based) instead of a city name.
        #[arg(long, conflicts_with = "city")]
        favorite: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List favorite cities.
    Favorites,

    /// Add a city to the favorites, or remove it if already there.
    Toggle {
        city: String,
    },

    /// Search and manage favorites from a prompt.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, favorite, json } => {
                let config = Config::load()?;
                let mut session = open_session(&config)?;

                match (city, favorite) {
                    (Some(city), _) => session.search(&city).await?,
                    (None, Some(n)) => {
                        let index = n
                            .checked_sub(1)
                            .with_context(|| format!("No favorite number {n}"))?;
                        session
                            .search_favorite(index)
                            .await
                            .with_context(|| format!("No favorite number {n}"))??;
                    }
                    (None, None) => anyhow::bail!("Provide a city or --favorite <N>"),
                }

                if json {
                    println!("{}", json_view(session.state())?);
                } else {
                    print!("{}", render::state(session.state()));
                }
                Ok(())
            }
            Command::Favorites => {
                let config = Config::load()?;
                let store = FavoritesStore::new(config.favorites_file_path()?);
                print!("{}", render::favorites(&store.load()));
                Ok(())
            }
            Command::Toggle { city } => {
                let config = Config::load()?;
                let store = FavoritesStore::new(config.favorites_file_path()?);
                let favorites = toggle_in_store(&store, &city)?;

                if favorites.contains(&city) {
                    println!("Added {city} to favorites.");
                } else {
                    println!("Removed {city} from favorites.");
                }
                Ok(())
            }
            Command::Interactive => {
                let config = Config::load()?;
                let session = open_session(&config)?;
                interactive(session).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn open_session(config: &Config) -> anyhow::Result<Session<OpenWeatherClient>> {
    let client = client_from_config(config)?;
    let store = FavoritesStore::new(config.favorites_file_path()?);
    Ok(Session::new(client, store))
}

/// Toggle `city` in the stored list and write it back.
fn toggle_in_store(store: &FavoritesStore, city: &str) -> anyhow::Result<Favorites> {
    let favorites = store.load().toggle(city);
    store.persist(&favorites)?;
    Ok(favorites)
}

fn json_view(state: &weather_core::AppState) -> anyhow::Result<String> {
    let view = serde_json::json!({
        "current": state.current,
        "daily": state.daily_forecast(),
        "favorite": state.current_is_favorite(),
    });
    serde_json::to_string_pretty(&view).context("Failed to serialize weather to JSON")
}

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Search,
    Favorite(String),
    ToggleCurrent { city: String, is_favorite: bool },
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("Search a city"),
            Action::Favorite(city) => write!(f, "★ {city}"),
            Action::ToggleCurrent { city, is_favorite: true } => {
                write!(f, "Remove {city} from favorites")
            }
            Action::ToggleCurrent { city, is_favorite: false } => {
                write!(f, "Add {city} to favorites")
            }
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions(state: &weather_core::AppState) -> Vec<Action> {
    let mut actions = vec![Action::Search];
    actions.extend(
        state
            .favorites
            .iter()
            .map(|city| Action::Favorite(city.to_string())),
    );
    if let Some(current) = &state.current {
        actions.push(Action::ToggleCurrent {
            city: current.city.clone(),
            is_favorite: state.current_is_favorite(),
        });
    }
    actions.push(Action::Quit);
    actions
}

fn is_cancel(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

/// Look up `city`, rendering the state once the lookup has started and again
/// once it has finished.
async fn run_search<L: WeatherLookup>(
    session: &mut Session<L>,
    city: &str,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let Some(city) = session.begin_search(city) else {
        return Ok(());
    };
    write!(out, "{}", render::state(session.state()))?;
    out.flush()?;

    let result = session.lookup().fetch_weather(&city).await;
    if let Err(err) = session.finish_search(result) {
        tracing::debug!(%err, "lookup failed");
    }
    write!(out, "{}", render::state(session.state()))
}

async fn interactive(mut session: Session<OpenWeatherClient>) -> anyhow::Result<()> {
    loop {
        let choice = match Select::new("What next?", actions(session.state())).prompt() {
            Ok(choice) => choice,
            Err(err) if is_cancel(&err) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        match choice {
            Action::Search => {
                let city = match Text::new("City name:").prompt() {
                    Ok(city) => city,
                    Err(err) if is_cancel(&err) => continue,
                    Err(err) => return Err(err.into()),
                };
                run_search(&mut session, &city, &mut std::io::stdout())
                    .await
                    .context("Failed to write output")?;
            }
            Action::Favorite(city) => {
                run_search(&mut session, &city, &mut std::io::stdout())
                    .await
                    .context("Failed to write output")?;
            }
            Action::ToggleCurrent { .. } => {
                match session.toggle_current()? {
                    Some(true) => println!("Added to favorites."),
                    Some(false) => println!("Removed from favorites."),
                    None => {}
                }
            }
            Action::Quit => return Ok(()),
        }
    }
}
