//! Error types shared by the engine, the session controller and the binaries.
use std::path::PathBuf;

/// Errors raised while turning boundary data into validated tubes.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("tube {tube} has {found} slots (expected {expected})")]
    WrongSlotCount {
        tube: String,
        found: usize,
        expected: usize,
    },

    #[error("tube {tube} has an empty slot at position {slot} below a filled slot")]
    GapInTube { tube: String, slot: usize },

    #[error("tube {tube} has undefined color '{token}'")]
    UnknownColor { tube: String, token: String },

    #[error("tube name '{0}' is used more than once")]
    DuplicateTubeName(String),

    #[error("a puzzle needs at least one tube")]
    NoTubes,

    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },

    #[error("failed to parse puzzle JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when a requested move cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("no tube named '{0}'")]
    UnknownTube(String),

    #[error("cannot move from {from} to {to}")]
    IllegalMove { from: String, to: String },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_error_display() {
        let err = SetupError::GapInTube {
            tube: "Tube3".to_string(),
            slot: 1,
        };
        assert_eq!(
            err.to_string(),
            "tube Tube3 has an empty slot at position 1 below a filled slot"
        );
    }

    #[test]
    fn test_move_error_display() {
        let err = MoveError::IllegalMove {
            from: "Tube1".to_string(),
            to: "Tube2".to_string(),
        };
        assert_eq!(err.to_string(), "cannot move from Tube1 to Tube2");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("max_candidates must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: max_candidates must be > 0"
        );
    }
}
