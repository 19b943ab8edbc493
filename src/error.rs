use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failures of a navigation request. The ship is left in its prior mode and
/// nothing is enqueued.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("no obstacle-free path to target")]
    PlanningFailure,
    #[error("ship is docked; undock before navigating")]
    Docked,
}

/// Failures of the docking protocol.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DockError {
    #[error("station '{station}' denied the docking request")]
    Denied { station: String },
    #[error("no obstacle-free approach path to station '{station}'")]
    PlanningFailure { station: String },
    #[error("station '{0}' not found")]
    StationNotFound(String),
    #[error("ship is not docked")]
    NotDocked,
    #[error("ship is already docked")]
    AlreadyDocked,
}

/// Failures loading configuration or save records.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to (de)serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid vehicle '{name}': {reason}")]
    InvalidVehicle { name: String, reason: String },
}
