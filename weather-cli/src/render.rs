//! Human-friendly output for the session state.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Write as _;
use weather_core::{AppState, CurrentConditions, DailySummary, Favorites};

/// Whole degrees, halves rounded up ("-2.5" shows as "-2").
pub fn temperature(celsius: f64) -> String {
    format!("{:.0}°C", (celsius + 0.5).floor())
}

/// Upper-case the first letter of every word.
pub fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Label like "Mon, Jan 15" in the local timezone.
pub fn day_label(ts: DateTime<Utc>) -> String {
    day_label_in(ts, &Local)
}

pub fn day_label_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%a, %b %-d").to_string()
}

pub fn current(current: &CurrentConditions, is_favorite: bool) -> String {
    let mut out = String::new();
    let marker = if is_favorite { "  ♥ favorite" } else { "" };

    let _ = writeln!(out, "{}, {}{marker}", current.city, current.country);
    let _ = writeln!(
        out,
        "{}  {}  {}",
        current.condition.kind().glyph(),
        temperature(current.temperature_c),
        capitalize(&current.condition.description),
    );
    let _ = writeln!(
        out,
        "Feels like: {:<10} Humidity: {}%",
        temperature(current.feels_like_c),
        current.humidity_pct,
    );
    let _ = writeln!(
        out,
        "Wind: {:<16} Pressure: {} hPa",
        format!("{} m/s", current.wind_speed_mps),
        current.pressure_hpa,
    );
    out
}

pub fn forecast(city: &str, days: &[DailySummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}-Day Forecast for {city}", weather_core::MAX_FORECAST_DAYS);

    for day in days {
        let s = &day.sample;
        let _ = writeln!(
            out,
            "{:<12} {}  {:>5}  {:<20} Humidity {:>3}%  Wind {} m/s",
            day_label(s.timestamp),
            s.condition.kind().glyph(),
            temperature(s.temperature_c),
            capitalize(&s.condition.description),
            s.humidity_pct,
            s.wind_speed_mps,
        );
    }
    out
}

pub fn favorites(favorites: &Favorites) -> String {
    if favorites.is_empty() {
        return "No favorites yet.\n".to_string();
    }

    let mut out = String::from("Favorites:\n");
    for (i, city) in favorites.iter().enumerate() {
        let _ = writeln!(out, "  {}. {city}", i + 1);
    }
    out
}

/// Full view: progress, error, or current conditions followed by the daily
/// forecast.
pub fn state(state: &AppState) -> String {
    if state.loading {
        return "Searching...\n".to_string();
    }

    if let Some(err) = &state.error {
        return format!("Error: {err}\n");
    }

    let Some(now) = &state.current else {
        return String::new();
    };

    let mut out = current(now, state.current_is_favorite());
    out.push('\n');
    out.push_str(&forecast(&now.city, &state.daily_forecast()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::Condition;

    fn paris() -> CurrentConditions {
        CurrentConditions {
            city: "Paris".to_string(),
            country: "FR".to_string(),
            temperature_c: 4.6,
            feels_like_c: 1.4,
            humidity_pct: 81,
            pressure_hpa: 1019.0,
            wind_speed_mps: 3.6,
            condition: Condition {
                id: 803,
                main: "Clouds".to_string(),
                description: "broken clouds".to_string(),
                icon: "04d".to_string(),
            },
            observation_time: DateTime::from_timestamp(1_705_320_000, 0).expect("valid ts"),
        }
    }

    #[test]
    fn temperatures_round_half_up() {
        assert_eq!(temperature(4.6), "5°C");
        assert_eq!(temperature(4.4), "4°C");
        assert_eq!(temperature(2.5), "3°C");
        assert_eq!(temperature(-2.5), "-2°C");
        assert_eq!(temperature(-0.4), "0°C");
    }

    #[test]
    fn capitalize_each_word() {
        assert_eq!(capitalize("broken clouds"), "Broken Clouds");
        assert_eq!(capitalize("light rain"), "Light Rain");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn day_label_is_short_weekday_month_day() {
        let ts = DateTime::from_timestamp(1_705_320_000, 0).expect("valid ts");
        assert_eq!(day_label_in(ts, &Utc), "Mon, Jan 15");
    }

    #[test]
    fn current_view_shows_all_readings() {
        let text = current(&paris(), false);

        assert!(text.starts_with("Paris, FR\n"));
        assert!(text.contains("5°C"));
        assert!(text.contains("Broken Clouds"));
        assert!(text.contains("Humidity: 81%"));
        assert!(text.contains("3.6 m/s"));
        assert!(text.contains("Pressure: 1019 hPa"));
        assert!(!text.contains("favorite"));
    }

    #[test]
    fn current_view_marks_favorites() {
        assert!(current(&paris(), true).contains("♥ favorite"));
    }

    #[test]
    fn favorites_are_numbered_from_one() {
        let favs = Favorites::from_names(["Paris", "Oslo"]);
        assert_eq!(favorites(&favs), "Favorites:\n  1. Paris\n  2. Oslo\n");
        assert_eq!(favorites(&Favorites::default()), "No favorites yet.\n");
    }

    #[test]
    fn state_view_prefers_error() {
        let state = AppState {
            current: Some(paris()),
            error: Some("City not found".to_string()),
            ..AppState::default()
        };
        assert_eq!(super::state(&state), "Error: City not found\n");
        assert_eq!(super::state(&AppState::default()), "");
    }

    #[test]
    fn state_view_shows_progress_while_loading() {
        let state = AppState {
            current: Some(paris()),
            loading: true,
            ..AppState::default()
        };
        assert_eq!(super::state(&state), "Searching...\n");
    }
}
