use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::fmt::Debug;
use tracing::{debug, instrument};

use crate::{
    Config,
    error::WeatherError,
    model::{Condition, CurrentConditions, ForecastSample, WeatherReport},
};

pub const CITY_NOT_FOUND: &str = "City not found";
pub const FORECAST_NOT_AVAILABLE: &str = "Forecast data not available";

const UNITS: &str = "metric";

/// Resolves a city name into current conditions plus the 5-day forecast.
#[async_trait]
pub trait WeatherLookup: Send + Sync + Debug {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, WeatherError>;
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            api_key,
            base_url,
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, CITY_NOT_FOUND).await?;
        parsed.try_into()
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Vec<ForecastSample>, WeatherError> {
        let parsed: OwForecastResponse =
            self.get_json("forecast", city, FORECAST_NOT_AVAILABLE).await?;
        parsed.list.into_iter().map(ForecastSample::try_from).collect()
    }

    /// GET `<base>/<endpoint>?q=..&appid=..&units=metric` and decode the body.
    /// A non-success status fails with `not_ok_message`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
        not_ok_message: &str,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await?;

        let status = res.status();
        debug!(%url, %status, "OpenWeather responded");

        if !status.is_success() {
            return Err(WeatherError::lookup_failed(not_ok_message));
        }

        let body = res.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let current = self.fetch_current(city).await?;
        let forecast = self.fetch_forecast(city).await?;

        debug!(city = %current.city, samples = forecast.len(), "lookup complete");
        Ok(WeatherReport { current, forecast })
    }
}

/// Build the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `weather configure` and enter your API key."
        )
    })?;

    Ok(OpenWeatherClient::new(api_key.to_owned(), config.base_url.as_str()))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    dt_txt: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition {
            id: w.id,
            main: w.main,
            description: w.description,
            icon: w.icon,
        }
    }
}

fn first_condition(weather: Vec<OwWeather>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(Condition::from)
        .unwrap_or_else(Condition::unknown)
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| {
        WeatherError::lookup_failed(format!("Invalid timestamp in response: {ts}"))
    })
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = WeatherError;

    fn try_from(parsed: OwCurrentResponse) -> Result<Self, Self::Error> {
        Ok(CurrentConditions {
            city: parsed.name,
            country: parsed.sys.country,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            condition: first_condition(parsed.weather),
            observation_time: unix_to_utc(parsed.dt)?,
        })
    }
}

impl TryFrom<OwForecastEntry> for ForecastSample {
    type Error = WeatherError;

    fn try_from(entry: OwForecastEntry) -> Result<Self, Self::Error> {
        Ok(ForecastSample {
            timestamp: unix_to_utc(entry.dt)?,
            temperature_c: entry.main.temp,
            feels_like_c: entry.main.feels_like,
            humidity_pct: entry.main.humidity,
            wind_speed_mps: entry.wind.speed,
            condition: first_condition(entry.weather),
            dt_txt: entry.dt_txt,
        })
    }
}
