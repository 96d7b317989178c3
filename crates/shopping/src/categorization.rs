use indexmap::{IndexMap, IndexSet};

use crate::aggregation::IngredientQuantities;
use crate::classifier::Classifier;
use crate::error::ClassificationError;

/// Number of classifier rounds before leftovers go to the fallback category
pub const MAX_ATTEMPTS: u32 = 3;

/// Category name to the ingredients (and amounts) placed in it
pub type CategorizedQuantities = IndexMap<String, IngredientQuantities>;

/// Grocery store sections used to seed and display a categorized list
///
/// `fallback` receives whatever the classifier never places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    pub sections: Vec<String>,
    pub fallback: String,
}

impl Default for CategorySet {
    fn default() -> Self {
        Self {
            sections: ["Meat", "Veg", "Dairy", "Aisles", "Frozen"]
                .into_iter()
                .map(String::from)
                .collect(),
            fallback: "Uncategorized".to_string(),
        }
    }
}

impl CategorySet {
    /// An empty categorized list with every section followed by the fallback
    pub fn seed(&self) -> CategorizedQuantities {
        self.sections
            .iter()
            .chain(std::iter::once(&self.fallback))
            .map(|name| (name.clone(), IngredientQuantities::new()))
            .collect()
    }
}

/// Categorization Service
///
/// Places every aggregated ingredient into a store section by asking an
/// external classifier. Each round only sends the ingredients still
/// unplaced; after `max_attempts` rounds the rest land in the fallback
/// category with their original amounts.
pub struct Categorizer<'a, C: Classifier> {
    classifier: &'a C,
    categories: &'a CategorySet,
    max_attempts: u32,
}

impl<'a, C: Classifier> Categorizer<'a, C> {
    pub fn new(classifier: &'a C, categories: &'a CategorySet) -> Self {
        Self {
            classifier,
            categories,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Categorize ingredient quantities
    ///
    /// # Returns
    /// * Ok(CategorizedQuantities) - every input ingredient in exactly one category
    /// * Err(ClassificationError) - the first failed classifier call, unretried
    #[tracing::instrument(skip_all, fields(ingredients = quantities.len()))]
    pub async fn categorize(
        &self,
        quantities: &IngredientQuantities,
    ) -> Result<CategorizedQuantities, ClassificationError> {
        let mut result = self.categories.seed();
        let mut remaining: IndexSet<String> = quantities.keys().cloned().collect();
        let mut attempt = 0;

        while attempt < self.max_attempts && !remaining.is_empty() {
            attempt += 1;
            tracing::debug!(attempt, remaining = remaining.len(), "Requesting classification");

            let pending: Vec<String> = remaining.iter().cloned().collect();
            let response = self.classifier.classify(&pending).await?;

            for (category, names) in response {
                for name in names {
                    let Some(quantity) = quantities.get(&name) else {
                        tracing::debug!(%category, ingredient = %name, "Ignoring unknown ingredient");
                        continue;
                    };

                    if !remaining.shift_remove(&name) {
                        continue;
                    }

                    result
                        .entry(category.clone())
                        .or_default()
                        .insert(name, *quantity);
                }
            }
        }

        if !remaining.is_empty() {
            tracing::info!(
                attempts = attempt,
                count = remaining.len(),
                fallback = %self.categories.fallback,
                "Classifier left ingredients unplaced"
            );
        }

        let fallback = result.entry(self.categories.fallback.clone()).or_default();
        for name in remaining {
            let quantity = quantities[&name];
            fallback.insert(name, quantity);
        }

        Ok(result)
    }
}

/// Categorize with the default retry budget
pub async fn categorize<C: Classifier>(
    quantities: &IngredientQuantities,
    categories: &CategorySet,
    classifier: &C,
) -> Result<CategorizedQuantities, ClassificationError> {
    Categorizer::new(classifier, categories)
        .categorize(quantities)
        .await
}
