//! Application state for one interactive user session.
//!
//! The [`Session`] owns the render state and is the only place it changes:
//! lookups replace the weather data, toggles replace the favorites and write
//! them to storage immediately.

use anyhow::Result;
use tracing::{debug, info};

use crate::{
    client::WeatherLookup,
    error::WeatherError,
    favorites::{Favorites, FavoritesStore},
    forecast::summarize_daily,
    model::{CurrentConditions, DailySummary, ForecastSample, WeatherReport},
};

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current: Option<CurrentConditions>,
    pub forecast: Vec<ForecastSample>,
    pub favorites: Favorites,
    pub error: Option<String>,
    pub loading: bool,
}

impl AppState {
    /// Daily summaries of the current forecast, recomputed on each call.
    pub fn daily_forecast(&self) -> Vec<DailySummary> {
        summarize_daily(&self.forecast)
    }

    /// Whether the displayed city is a favorite.
    pub fn current_is_favorite(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|c| self.favorites.contains(&c.city))
    }
}

#[derive(Debug)]
pub struct Session<L> {
    lookup: L,
    store: FavoritesStore,
    state: AppState,
}

impl<L: WeatherLookup> Session<L> {
    /// Start a session, loading favorites from `store`.
    pub fn new(lookup: L, store: FavoritesStore) -> Self {
        let favorites = store.load();
        Self {
            lookup,
            store,
            state: AppState {
                favorites,
                ..AppState::default()
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Look up `city`. Input that trims to empty is ignored.
    ///
    /// On failure the previous weather and forecast are cleared and the
    /// message is kept in [`AppState::error`]; favorites are untouched.
    /// Taking `&mut self` keeps a session to one lookup in flight.
    pub async fn search(&mut self, city: &str) -> Result<(), WeatherError> {
        let Some(city) = self.begin_search(city) else {
            return Ok(());
        };
        let result = self.lookup.fetch_weather(&city).await;
        self.finish_search(result)
    }

    /// Mark a lookup of `city` as started: sets [`AppState::loading`] and
    /// clears the previous error. Returns the trimmed city, or `None` when it
    /// is empty or a lookup is already running.
    pub fn begin_search(&mut self, city: &str) -> Option<String> {
        let city = city.trim();
        if city.is_empty() {
            debug!("ignoring empty search");
            return None;
        }
        if self.state.loading {
            debug!(city, "lookup already in flight");
            return None;
        }

        self.state.loading = true;
        self.state.error = None;
        Some(city.to_string())
    }

    /// Apply the outcome of the lookup started by [`Session::begin_search`].
    pub fn finish_search(
        &mut self,
        result: Result<WeatherReport, WeatherError>,
    ) -> Result<(), WeatherError> {
        self.state.loading = false;

        match result {
            Ok(report) => {
                self.state.current = Some(report.current);
                self.state.forecast = report.forecast;
                Ok(())
            }
            Err(err) => {
                info!(error = %err, "lookup failed");
                self.state.current = None;
                self.state.forecast.clear();
                self.state.error = Some(err.message().to_string());
                Err(err)
            }
        }
    }

    /// Look up the favorite at `index`, if there is one.
    pub async fn search_favorite(&mut self, index: usize) -> Option<Result<(), WeatherError>> {
        let city = self.state.favorites.get(index)?.to_string();
        Some(self.search(&city).await)
    }

    /// Toggle `city` in the favorites and persist the new list.
    /// Returns whether `city` is now a favorite.
    pub fn toggle_favorite(&mut self, city: &str) -> Result<bool> {
        let favorites = self.state.favorites.toggle(city);
        self.store.persist(&favorites)?;
        self.state.favorites = favorites;
        Ok(self.state.favorites.contains(city))
    }

    /// Toggle the city currently displayed, using the API's display name.
    pub fn toggle_current(&mut self) -> Result<Option<bool>> {
        let Some(city) = self.state.current.as_ref().map(|c| c.city.clone()) else {
            return Ok(None);
        };
        self.toggle_favorite(&city).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::{CITY_NOT_FOUND, FORECAST_NOT_AVAILABLE},
        model::Condition,
    };
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::{collections::HashMap, sync::Mutex};

    /// Canned responses keyed by city; unknown cities are "not found".
    #[derive(Debug, Default)]
    struct FakeLookup {
        responses: HashMap<String, Result<WeatherReport, WeatherError>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn with(mut self, city: &str, response: Result<WeatherReport, WeatherError>) -> Self {
            self.responses.insert(city.to_string(), response);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl WeatherLookup for FakeLookup {
        async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
            self.calls.lock().expect("lock").push(city.to_string());
            self.responses
                .get(city)
                .cloned()
                .unwrap_or_else(|| Err(WeatherError::lookup_failed(CITY_NOT_FOUND)))
        }
    }

    fn report(city: &str) -> WeatherReport {
        let at = DateTime::from_timestamp(1_705_320_000, 0).expect("valid ts");
        WeatherReport {
            current: CurrentConditions {
                city: city.to_string(),
                country: "FR".to_string(),
                temperature_c: 4.0,
                feels_like_c: 1.0,
                humidity_pct: 80,
                pressure_hpa: 1019.0,
                wind_speed_mps: 3.0,
                condition: Condition::unknown(),
                observation_time: at,
            },
            forecast: vec![ForecastSample {
                timestamp: at,
                temperature_c: 5.0,
                feels_like_c: 2.0,
                humidity_pct: 70,
                wind_speed_mps: 2.0,
                condition: Condition::unknown(),
                dt_txt: "2024-01-15 12:00:00".to_string(),
            }],
        }
    }

    fn session(lookup: FakeLookup, dir: &tempfile::TempDir) -> Session<FakeLookup> {
        Session::new(lookup, FavoritesStore::new(dir.path().join("favorites.json")))
    }

    #[tokio::test]
    async fn successful_search_fills_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default().with("Paris", Ok(report("Paris"))), &dir);

        s.search("  Paris ").await.expect("lookup succeeds");

        let state = s.state();
        assert_eq!(state.current.as_ref().map(|c| c.city.as_str()), Some("Paris"));
        assert_eq!(state.forecast.len(), 1);
        assert_eq!(state.daily_forecast().len(), 1);
        assert_eq!(state.error, None);
        assert!(!state.loading);
        assert_eq!(s.lookup.calls(), ["Paris"]);
    }

    #[tokio::test]
    async fn empty_search_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default(), &dir);

        s.search("   ").await.expect("no-op");

        assert!(s.lookup.calls().is_empty());
        assert_eq!(s.state(), &AppState::default());
    }

    #[tokio::test]
    async fn failed_search_clears_previous_weather() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default().with("Paris", Ok(report("Paris"))), &dir);
        s.search("Paris").await.expect("lookup succeeds");

        let err = s.search("Atlantis").await.unwrap_err();

        assert_eq!(err, WeatherError::lookup_failed(CITY_NOT_FOUND));
        let state = s.state();
        assert!(state.current.is_none());
        assert!(state.forecast.is_empty());
        assert_eq!(state.error.as_deref(), Some(CITY_NOT_FOUND));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn next_successful_search_clears_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let lookup = FakeLookup::default()
            .with("Paris", Ok(report("Paris")))
            .with("Oslo", Err(WeatherError::lookup_failed(FORECAST_NOT_AVAILABLE)));
        let mut s = session(lookup, &dir);

        assert!(s.search("Oslo").await.is_err());
        assert_eq!(s.state().error.as_deref(), Some(FORECAST_NOT_AVAILABLE));

        s.search("Paris").await.expect("lookup succeeds");
        assert_eq!(s.state().error, None);
    }

    #[tokio::test]
    async fn lookup_failure_leaves_favorites_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default(), &dir);
        s.toggle_favorite("Paris").expect("toggle");

        assert!(s.search("Paris").await.is_err());

        assert_eq!(s.state().favorites, Favorites::from_names(["Paris"]));
        assert_eq!(FavoritesStore::new(dir.path().join("favorites.json")).load().len(), 1);
    }

    #[test]
    fn toggle_persists_after_every_change() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FavoritesStore::new(dir.path().join("favorites.json"));
        let mut s = session(FakeLookup::default(), &dir);

        assert!(s.toggle_favorite("Paris").expect("toggle"));
        assert_eq!(store.load(), Favorites::from_names(["Paris"]));

        assert!(!s.toggle_favorite("Paris").expect("toggle"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn new_session_loads_stored_favorites() {
        let dir = tempfile::tempdir().expect("tempdir");
        FavoritesStore::new(dir.path().join("favorites.json"))
            .persist(&Favorites::from_names(["Oslo", "Lima"]))
            .expect("persist");

        let s = session(FakeLookup::default(), &dir);
        assert_eq!(s.state().favorites.iter().collect::<Vec<_>>(), ["Oslo", "Lima"]);
    }

    #[tokio::test]
    async fn toggle_current_uses_display_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default().with("paris", Ok(report("Paris"))), &dir);

        assert_eq!(s.toggle_current().expect("nothing shown"), None);

        s.search("paris").await.expect("lookup succeeds");
        assert!(!s.state().current_is_favorite());

        assert_eq!(s.toggle_current().expect("toggle"), Some(true));
        assert!(s.state().current_is_favorite());
        assert!(s.state().favorites.contains("Paris"));
    }

    #[tokio::test]
    async fn search_favorite_looks_up_by_index() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default().with("Oslo", Ok(report("Oslo"))), &dir);
        s.toggle_favorite("Paris").expect("toggle");
        s.toggle_favorite("Oslo").expect("toggle");

        assert!(s.search_favorite(5).await.is_none());

        let result = s.search_favorite(1).await.expect("favorite exists");
        assert!(result.is_ok());
        assert_eq!(s.lookup.calls(), ["Oslo"]);
    }

    #[test]
    fn loading_is_visible_between_begin_and_finish() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default(), &dir);

        let city = s.begin_search("  Paris ").expect("lookup starts");
        assert_eq!(city, "Paris");
        assert!(s.state().loading);
        assert_eq!(s.state().error, None);

        s.finish_search(Ok(report("Paris"))).expect("lookup succeeds");
        assert!(!s.state().loading);
        assert!(s.state().current.is_some());
    }

    #[test]
    fn begin_search_refuses_overlapping_lookup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut s = session(FakeLookup::default(), &dir);

        assert!(s.begin_search("Paris").is_some());
        assert_eq!(s.begin_search("Oslo"), None);
        assert_eq!(s.begin_search("   "), None);

        let err = s.finish_search(Err(WeatherError::lookup_failed(CITY_NOT_FOUND)));
        assert!(err.is_err());
        assert!(!s.state().loading);
        assert!(s.begin_search("Oslo").is_some());
    }

    #[test]
    fn failed_persist_leaves_favorites_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write");
        let store = FavoritesStore::new(blocker.join("favorites.json"));
        let mut s = Session::new(FakeLookup::default(), store);

        assert!(s.toggle_favorite("Paris").is_err());
        assert!(s.state().favorites.is_empty());
    }
}
