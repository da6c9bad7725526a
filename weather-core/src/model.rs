use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Weather condition as reported by the API (`weather[0]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Numeric condition code, e.g. 800 for clear sky.
    pub id: u32,
    /// Short group name, e.g. "Clouds".
    pub main: String,
    /// Long description, e.g. "scattered clouds".
    pub description: String,
    /// Icon code, e.g. "03d".
    pub icon: String,
}

impl Condition {
    pub fn unknown() -> Self {
        Self {
            id: 0,
            main: "Unknown".to_string(),
            description: "Unknown".to_string(),
            icon: String::new(),
        }
    }

    pub fn kind(&self) -> ConditionKind {
        ConditionKind::from_icon(&self.icon)
    }
}

/// Coarse icon family derived from the icon code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Sun,
    Cloud,
    Rain,
}

impl ConditionKind {
    pub fn from_icon(icon: &str) -> Self {
        match icon.get(..2) {
            Some("01") => ConditionKind::Sun,
            Some("02" | "03" | "04") => ConditionKind::Cloud,
            Some("09" | "10") => ConditionKind::Rain,
            _ => ConditionKind::Cloud,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionKind::Sun => "☀",
            ConditionKind::Cloud => "☁",
            ConditionKind::Rain => "☂",
        }
    }
}

/// Current conditions for one city. Replaced wholesale on each search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// City display name as resolved by the API.
    pub city: String,
    pub country: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    pub observation_time: DateTime<Utc>,
}

/// One 3-hour reading of the 5-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub condition: Condition,
    /// Date-time stamp as sent by the API, e.g. "2024-01-15 12:00:00".
    pub dt_txt: String,
}

/// The representative sample of one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub sample: ForecastSample,
}

/// Result of a successful city lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastSample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_prefix_maps_to_kind() {
        assert_eq!(ConditionKind::from_icon("01d"), ConditionKind::Sun);
        assert_eq!(ConditionKind::from_icon("01n"), ConditionKind::Sun);
        assert_eq!(ConditionKind::from_icon("02d"), ConditionKind::Cloud);
        assert_eq!(ConditionKind::from_icon("04n"), ConditionKind::Cloud);
        assert_eq!(ConditionKind::from_icon("09d"), ConditionKind::Rain);
        assert_eq!(ConditionKind::from_icon("10n"), ConditionKind::Rain);
    }

    #[test]
    fn unknown_icons_fall_back_to_cloud() {
        assert_eq!(ConditionKind::from_icon("11d"), ConditionKind::Cloud);
        assert_eq!(ConditionKind::from_icon("50n"), ConditionKind::Cloud);
        assert_eq!(ConditionKind::from_icon(""), ConditionKind::Cloud);
        assert_eq!(ConditionKind::from_icon("1"), ConditionKind::Cloud);
    }

    #[test]
    fn unknown_condition_has_cloud_kind() {
        assert_eq!(Condition::unknown().kind(), ConditionKind::Cloud);
    }
}
