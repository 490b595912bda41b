//! Load-time error types.
//!
//! Simulation ticks never fail: a misconfigured level or degenerate geometry is
//! logged and skipped. Errors only surface when reading or validating settings
//! and the best-score file.

use std::fmt;

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing a file failed.
    Io(std::io::Error),

    /// The file was not valid JSON for the expected shape.
    Parse(serde_json::Error),

    /// A value parsed correctly but is outside its usable range.
    Invalid {
        /// Dotted path of the offending field (for logging).
        field: &'static str,
        /// Human-readable description of the problem.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config i/o failed: {}", err),
            ConfigError::Parse(err) => write!(f, "config parse failed: {}", err),
            ConfigError::Invalid { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_names_field() {
        let err = ConfigError::invalid("bounce.speed", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid value for 'bounce.speed': must be positive"
        );
    }

    #[test]
    fn test_parse_error_has_source() {
        use std::error::Error;
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.source().is_some());
    }
}
