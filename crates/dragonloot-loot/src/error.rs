use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LootError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a JSON object", .0.display())]
    NotAnObject(PathBuf),

    #[error("{} has no 'loot' section", .0.display())]
    MissingLoot(PathBuf),
}

/// Why an `amount` value was rejected. The item still loads with amount 1.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount range '{0}'")]
    InvalidRange(String),

    #[error("amount must be positive")]
    NotPositive,

    #[error("invalid amount value '{0}'")]
    InvalidValue(String),
}
