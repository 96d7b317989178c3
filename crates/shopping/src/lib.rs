pub mod aggregation;
pub mod categorization;
pub mod classifier;
pub mod error;
pub mod openai;

// Re-export commonly used types
pub use aggregation::{
    IngredientAggregationService, IngredientQuantities, MealCounts, MealPlanEntry, RecipeRow,
};
pub use categorization::{
    CategorizedQuantities, CategorySet, Categorizer, MAX_ATTEMPTS, categorize,
};
pub use classifier::{CategorizationAttempt, Classifier, parse_classification_response};
pub use error::{ClassificationError, ShoppingListError};
pub use openai::{OpenAiClassifier, OpenAiSettings};
