//! Error types and handling for `WeatherGuard`

use thiserror::Error;

/// Main error type for the `WeatherGuard` weather pipeline
#[derive(Error, Debug)]
pub enum WeatherGuardError {
    /// No usable API credential is configured
    #[error("Configuration missing: {message}")]
    ConfigurationMissing { message: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Network failure or non-success HTTP status from an upstream provider
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String, status: Option<u16> },

    /// Upstream answered, but not in the shape we expect
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Caller supplied arguments outside the contract
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherGuardError {
    /// Create a new missing-credential error
    pub fn configuration_missing<S: Into<String>>(message: S) -> Self {
        Self::ConfigurationMissing {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new upstream error without an HTTP status
    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status: None,
        }
    }

    /// Create a new upstream error carrying the HTTP status code
    pub fn upstream_status<S: Into<String>>(message: S, status: u16) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller rather than the outside world.
    ///
    /// Caller errors are surfaced; everything else is absorbed into an empty
    /// fetch result.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherGuardError::ConfigurationMissing { .. } => {
                "No weather API key configured. Set `apiKey` in config.properties or WEATHERGUARD_WEATHER__API_KEY."
                    .to_string()
            }
            WeatherGuardError::Config { message } => {
                format!("Configuration error: {message}")
            }
            WeatherGuardError::UpstreamUnavailable { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            WeatherGuardError::MalformedResponse { .. } => {
                "The weather service returned data we could not understand.".to_string()
            }
            WeatherGuardError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WeatherGuardError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<image::ImageError> for WeatherGuardError {
    fn from(err: image::ImageError) -> Self {
        Self::malformed(format!("image decode failed: {err}"))
    }
}

impl From<serde_json::Error> for WeatherGuardError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(format!("invalid JSON: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let missing = WeatherGuardError::configuration_missing("no apiKey");
        assert!(matches!(missing, WeatherGuardError::ConfigurationMissing { .. }));

        let upstream = WeatherGuardError::upstream_status("bad gateway", 502);
        assert!(matches!(
            upstream,
            WeatherGuardError::UpstreamUnavailable {
                status: Some(502),
                ..
            }
        ));

        let validation = WeatherGuardError::validation("empty city");
        assert!(matches!(validation, WeatherGuardError::Validation { .. }));
    }

    #[test]
    fn test_only_validation_is_caller_error() {
        assert!(WeatherGuardError::validation("x").is_caller_error());
        assert!(!WeatherGuardError::upstream("x").is_caller_error());
        assert!(!WeatherGuardError::malformed("x").is_caller_error());
        assert!(!WeatherGuardError::configuration_missing("x").is_caller_error());
    }

    #[test]
    fn test_user_messages() {
        let upstream = WeatherGuardError::upstream("timeout");
        assert!(upstream.user_message().contains("Unable to reach"));

        let validation = WeatherGuardError::validation("City cannot be empty");
        assert!(validation.user_message().contains("City cannot be empty"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: WeatherGuardError = json_err.into();
        assert!(matches!(err, WeatherGuardError::MalformedResponse { .. }));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WeatherGuardError = io_err.into();
        assert!(matches!(err, WeatherGuardError::Io { .. }));
    }
}
