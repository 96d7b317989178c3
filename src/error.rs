use std::path::PathBuf;

use imgrocery_shopping::{ClassificationError, ShoppingListError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No classifier API key configured (set OPENAI_API_KEY or use --flat)")]
    MissingApiKey,

    #[error(transparent)]
    ShoppingList(#[from] ShoppingListError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
