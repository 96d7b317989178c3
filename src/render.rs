use std::path::Path;

use imgrocery_shopping::{CategorizedQuantities, IngredientQuantities};

use crate::error::AppError;

pub const CATEGORIZED_TITLE: &str = "Grocery List (Categorized by Store Section):";
pub const FLAT_TITLE: &str = "Grocery List:";

/// A heading line followed by a dashed line of the same length
fn heading(text: &str) -> String {
    format!("{}\n{}\n", text, "-".repeat(text.chars().count()))
}

fn push_items(out: &mut String, items: &IngredientQuantities) {
    if items.is_empty() {
        out.push_str("None\n");
        return;
    }

    for (ingredient, quantity) in items {
        out.push_str(&format!("{}: {:.2}\n", ingredient, quantity));
    }
}

/// Render a categorized grocery list, one underlined section per category
pub fn render_categorized(categorized: &CategorizedQuantities) -> String {
    let mut out = heading(CATEGORIZED_TITLE);

    for (category, items) in categorized {
        out.push('\n');
        out.push_str(&heading(&format!("{}:", category)));
        push_items(&mut out, items);
    }

    out
}

/// Render an uncategorized grocery list
pub fn render_flat(quantities: &IngredientQuantities) -> String {
    let mut out = heading(FLAT_TITLE);
    push_items(&mut out, quantities);
    out
}

/// Persist a rendered list verbatim
pub fn save(text: &str, path: &Path) -> Result<(), AppError> {
    std::fs::write(path, text).map_err(|source| AppError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Grocery list saved");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(entries: &[(&str, f64)]) -> IngredientQuantities {
        entries
            .iter()
            .map(|(name, amount)| (name.to_string(), *amount))
            .collect()
    }

    #[test]
    fn test_render_categorized() {
        let mut categorized = CategorizedQuantities::new();
        categorized.insert("Meat".to_string(), items(&[("Salmon", 120.0)]));
        categorized.insert(
            "Aisles".to_string(),
            items(&[("Bread", 4.0), ("Peanut butter", 30.0)]),
        );
        categorized.insert("Veg".to_string(), items(&[]));

        let output = render_categorized(&categorized);

        assert_eq!(
            output,
            "Grocery List (Categorized by Store Section):\n\
             --------------------------------------------\n\
             \n\
             Meat:\n\
             -----\n\
             Salmon: 120.00\n\
             \n\
             Aisles:\n\
             -------\n\
             Bread: 4.00\n\
             Peanut butter: 30.00\n\
             \n\
             Veg:\n\
             ----\n\
             None\n"
        );
    }

    #[test]
    fn test_heading_underline_matches_length() {
        assert_eq!(heading("Dairy:"), "Dairy:\n------\n");
        assert_eq!(heading(CATEGORIZED_TITLE).lines().nth(1).unwrap().len(), 44);
    }

    #[test]
    fn test_render_categorized_empty() {
        let output = render_categorized(&CategorizedQuantities::new());
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn test_render_flat_rounds_to_two_decimals() {
        let output = render_flat(&items(&[("Cooked rice", 120.0), ("Egg", 1.0 / 3.0)]));

        assert_eq!(
            output,
            "Grocery List:\n-------------\nCooked rice: 120.00\nEgg: 0.33\n"
        );
    }

    #[test]
    fn test_render_flat_empty() {
        assert_eq!(
            render_flat(&IngredientQuantities::new()),
            "Grocery List:\n-------------\nNone\n"
        );
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.child("missing").join("list.txt");

        let err = save("text", &path).unwrap_err();

        assert!(matches!(err, AppError::Write { .. }));
    }
}
