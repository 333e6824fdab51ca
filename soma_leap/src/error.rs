use soma_core::{ConfigError, PositionError};

/// Why the controller could not start or keep running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot read config file {path}: {source}")]
    ConfigRead {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path:   String,
        #[source]
        source: serde_json::Error,
    },

    #[error("calibration failed: {0}")]
    Calibration(#[from] PositionError),
}
