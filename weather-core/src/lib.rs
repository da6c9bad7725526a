//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather client (current conditions + 5-day forecast)
//! - Daily forecast summaries and the persisted favorites list
//! - The session state consumed by the presentation layer
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod favorites;
pub mod forecast;
pub mod model;
pub mod session;

pub use client::{OpenWeatherClient, WeatherLookup, client_from_config};
pub use config::Config;
pub use error::WeatherError;
pub use favorites::{Favorites, FavoritesStore};
pub use forecast::{MAX_FORECAST_DAYS, summarize_daily, summarize_daily_in};
pub use model::{
    Condition, ConditionKind, CurrentConditions, DailySummary, ForecastSample, WeatherReport,
};
pub use session::{AppState, Session};
