use std::sync::LazyLock;

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;

use crate::error::ClassificationError;

/// Category name to the ingredient names a classifier put in it for one round
pub type CategorizationAttempt = IndexMap<String, Vec<String>>;

static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[\s\S]*\}").expect("JSON object pattern is a valid regex")
});

/// External service that sorts ingredient names into categories
///
/// Implementations may block on a network round trip. Any error they return
/// aborts categorization; timeouts belong to the implementation.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        ingredients: &[String],
    ) -> Result<CategorizationAttempt, ClassificationError>;
}

/// Extract and decode the JSON object from a model's free-text reply
///
/// Models often wrap the object in prose or code fences, so the outermost
/// `{ ... }` span is taken before decoding.
pub fn parse_classification_response(text: &str) -> Result<CategorizationAttempt, ClassificationError> {
    let json = JSON_OBJECT
        .find(text)
        .ok_or_else(|| ClassificationError::Parse("no JSON object in response".to_string()))?;

    serde_json::from_str(json.as_str()).map_err(|e| ClassificationError::Parse(e.to_string()))
}
