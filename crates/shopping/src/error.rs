use thiserror::Error;

/// Error types for shopping list input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShoppingListError {
    #[error("Invalid amount '{value}' for ingredient '{ingredient}' in meal '{meal}'")]
    InvalidAmount {
        meal: String,
        ingredient: String,
        value: String,
    },
}

/// Error types for a single classification call
///
/// None of these are retried by the categorizer: the retry budget only covers
/// ingredients the classifier did not return.
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Classification request failed: {0}")]
    Request(String),

    #[error("Classification service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Classification service returned no choices")]
    EmptyResponse,

    #[error("Failed to parse classification response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClassificationError {
    fn from(err: reqwest::Error) -> Self {
        ClassificationError::Request(err.to_string())
    }
}
