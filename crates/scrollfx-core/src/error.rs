use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown easing: {0}")]
    UnknownEasing(String),

    #[error("Invalid trigger range: start and end are both {0}")]
    InvalidTriggerRange(f64),

    #[error("Target not found: {0}")]
    MissingTarget(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Trigger not found: {0}")]
    TriggerNotFound(String),

    #[error("Animation not found: {0}")]
    AnimationNotFound(String),

    #[error("Timeline not found: {0}")]
    TimelineNotFound(String),

    #[error("Scenario error: {0}")]
    Scenario(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
