//! CSV tables keyed by header name

use std::fs::File;
use std::path::Path;

use imgrocery_shopping::{MealCounts, MealPlanEntry, RecipeRow};
use indexmap::IndexMap;

use crate::error::AppError;

/// One CSV record as header -> value, in column order
pub type Row = IndexMap<String, String>;

pub const MEAL_COLUMN: &str = "Meal";
pub const INGREDIENT_COLUMN: &str = "Ingredients";
pub const AMOUNT_COLUMN: &str = "AmountPerServe";

/// Read a headed CSV file into rows
///
/// Blank lines are skipped; a file with only a header yields no rows.
pub fn read_table(path: &Path) -> Result<Vec<Row>, AppError> {
    let file = File::open(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let csv_error = |source| AppError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "Read table");

    Ok(rows)
}

fn field<'a>(row: &'a Row, column: &str, path: &Path) -> Result<&'a str, AppError> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| AppError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

/// Read a weekly meal plan (`Meal` column)
pub fn read_meal_plan(path: &Path) -> Result<Vec<MealPlanEntry>, AppError> {
    read_table(path)?
        .iter()
        .map(|row| -> Result<MealPlanEntry, AppError> {
            Ok(MealPlanEntry::new(field(row, MEAL_COLUMN, path)?))
        })
        .collect()
}

/// Read the recipe rows of the planned meals
///
/// Reads the `Meal`, `Ingredients` and `AmountPerServe` columns. Rows for
/// meals missing from `planned` are skipped before their amount is parsed,
/// so a bad cell in an unplanned recipe never fails the week.
pub fn read_recipes(path: &Path, planned: &MealCounts) -> Result<Vec<RecipeRow>, AppError> {
    let rows = read_table(path)?;
    let mut recipes = Vec::new();

    for row in &rows {
        let meal = field(row, MEAL_COLUMN, path)?;
        let ingredient = field(row, INGREDIENT_COLUMN, path)?;
        let amount = field(row, AMOUNT_COLUMN, path)?;

        if !planned.contains_key(meal) {
            continue;
        }

        recipes.push(RecipeRow::parse(meal, ingredient, amount)?);
    }

    tracing::debug!(
        path = %path.display(),
        kept = recipes.len(),
        skipped = rows.len() - recipes.len(),
        "Read recipes for planned meals"
    );

    Ok(recipes)
}
