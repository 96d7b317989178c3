use indexmap::IndexMap;

use crate::error::ShoppingListError;

/// Ingredient name to total amount, in first-seen order
pub type IngredientQuantities = IndexMap<String, f64>;

/// Meal name to number of planned occurrences, in first-seen order
pub type MealCounts = IndexMap<String, u32>;

/// One planned meal occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealPlanEntry {
    pub meal: String,
}

impl MealPlanEntry {
    pub fn new(meal: impl Into<String>) -> Self {
        Self { meal: meal.into() }
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeRow {
    pub meal: String,
    pub ingredient: String,
    pub amount_per_serve: f64,
}

impl RecipeRow {
    pub fn new(meal: impl Into<String>, ingredient: impl Into<String>, amount_per_serve: f64) -> Self {
        Self {
            meal: meal.into(),
            ingredient: ingredient.into(),
            amount_per_serve,
        }
    }

    /// Build a row from raw text fields
    ///
    /// The amount must parse as a finite, non-negative decimal once trimmed.
    /// Anything else is rejected here so that a bad cell never reaches the
    /// totals as `NaN`.
    pub fn parse(
        meal: impl Into<String>,
        ingredient: impl Into<String>,
        amount: &str,
    ) -> Result<Self, ShoppingListError> {
        let meal = meal.into();
        let ingredient = ingredient.into();

        let amount_per_serve = match amount.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                return Err(ShoppingListError::InvalidAmount {
                    meal,
                    ingredient,
                    value: amount.to_string(),
                });
            }
        };

        Ok(Self {
            meal,
            ingredient,
            amount_per_serve,
        })
    }
}

/// Ingredient Aggregation Service
///
/// Stateless domain service that turns a weekly meal plan and a recipe
/// database into the total amount of every ingredient needed.
///
/// - "PB toast" planned twice with "Bread 2" = "Bread 4"
/// - "Bread" used by two different meals = one summed line item
/// - Recipes for meals that are not planned contribute nothing
pub struct IngredientAggregationService;

impl IngredientAggregationService {
    /// Count how many times each meal appears in the plan
    pub fn count_meals(meal_plan: &[MealPlanEntry]) -> MealCounts {
        let mut counts = MealCounts::new();

        for entry in meal_plan {
            *counts.entry(entry.meal.clone()).or_insert(0) += 1;
        }

        counts
    }

    /// Aggregate ingredient quantities for a meal plan
    ///
    /// # Arguments
    /// * `meal_plan` - One entry per planned meal occurrence
    /// * `recipes` - Recipe database rows
    ///
    /// # Returns
    /// * IngredientQuantities - total amount per ingredient name (exact, case-sensitive)
    pub fn aggregate(meal_plan: &[MealPlanEntry], recipes: &[RecipeRow]) -> IngredientQuantities {
        let meal_counts = Self::count_meals(meal_plan);
        let mut quantities = IngredientQuantities::new();

        for (meal, count) in &meal_counts {
            for row in recipes.iter().filter(|row| &row.meal == meal) {
                *quantities.entry(row.ingredient.clone()).or_insert(0.0) +=
                    row.amount_per_serve * f64::from(*count);
            }
        }

        tracing::debug!(
            meals = meal_counts.len(),
            ingredients = quantities.len(),
            "Aggregated ingredient quantities"
        );

        quantities
    }
}
