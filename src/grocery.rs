use std::path::PathBuf;

use imgrocery_shopping::{Categorizer, Classifier, IngredientAggregationService, IngredientQuantities};

use crate::config::Config;
use crate::error::AppError;
use crate::render::{render_categorized, render_flat, save};
use crate::table::{read_meal_plan, read_recipes};

/// Command to generate the grocery list for one week
#[derive(Debug, Clone)]
pub struct GenerateGroceryListCommand {
    pub week: u32,
    /// Where to save the rendered list; `None` uses the configured pattern
    pub output: Option<PathBuf>,
    pub save: bool,
}

/// Rendered grocery list and where it was saved, if anywhere
#[derive(Debug, Clone)]
pub struct GroceryListOutput {
    pub text: String,
    pub saved_to: Option<PathBuf>,
}

/// Read the week's meal plan and the recipe database and total the ingredients
pub fn load_ingredient_quantities(config: &Config, week: u32) -> Result<IngredientQuantities, AppError> {
    let meal_plan = read_meal_plan(&config.files.meal_plan_path(week))?;
    let planned = IngredientAggregationService::count_meals(&meal_plan);
    let recipes = read_recipes(&config.files.recipe_database_path(week), &planned)?;

    tracing::info!(
        week,
        planned_meals = meal_plan.len(),
        recipe_rows = recipes.len(),
        "Loaded meal plan"
    );

    Ok(IngredientAggregationService::aggregate(&meal_plan, &recipes))
}

/// Generate a categorized grocery list
///
/// This command:
/// 1. Aggregates ingredient quantities from the meal plan and recipe database
/// 2. Categorizes them by store section with the classifier
/// 3. Renders the list and optionally saves it
#[tracing::instrument(skip(config, classifier), fields(week = cmd.week))]
pub async fn generate_grocery_list<C: Classifier>(
    cmd: &GenerateGroceryListCommand,
    config: &Config,
    classifier: &C,
) -> Result<GroceryListOutput, AppError> {
    let quantities = load_ingredient_quantities(config, cmd.week)?;

    let categories = config.categories.category_set();
    let categorized = Categorizer::new(classifier, &categories)
        .with_max_attempts(config.categories.max_attempts)
        .categorize(&quantities)
        .await?;

    finish(cmd, config, render_categorized(&categorized))
}

/// Generate a single uncategorized grocery list without a classifier
#[tracing::instrument(skip(config), fields(week = cmd.week))]
pub fn generate_flat_list(
    cmd: &GenerateGroceryListCommand,
    config: &Config,
) -> Result<GroceryListOutput, AppError> {
    let quantities = load_ingredient_quantities(config, cmd.week)?;

    finish(cmd, config, render_flat(&quantities))
}

fn finish(
    cmd: &GenerateGroceryListCommand,
    config: &Config,
    text: String,
) -> Result<GroceryListOutput, AppError> {
    let saved_to = if cmd.save {
        let path = cmd
            .output
            .clone()
            .unwrap_or_else(|| config.files.output_path(cmd.week));
        save(&text, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(GroceryListOutput { text, saved_to })
}
