use thiserror::Error;

/// Failure of a city lookup.
///
/// "City not found", transport failures and malformed payloads all map to
/// `LookupFailed`; only the message text differs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("{0}")]
    LookupFailed(String),
}

impl WeatherError {
    pub fn lookup_failed(message: impl Into<String>) -> Self {
        WeatherError::LookupFailed(message.into())
    }

    /// The human-readable message carried by the error.
    pub fn message(&self) -> &str {
        match self {
            WeatherError::LookupFailed(msg) => msg,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::LookupFailed(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::LookupFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_message() {
        let err = WeatherError::lookup_failed("City not found");
        assert_eq!(err.to_string(), "City not found");
        assert_eq!(err.message(), "City not found");
    }

    #[test]
    fn json_errors_become_lookup_failures() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let expected = parse_err.to_string();

        let err = WeatherError::from(parse_err);
        assert_eq!(err, WeatherError::LookupFailed(expected));
    }
}
