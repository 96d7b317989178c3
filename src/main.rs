use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use imgrocery::{
    AppError, Config, GenerateGroceryListCommand, generate_flat_list, generate_grocery_list,
};
use imgrocery_shopping::OpenAiClassifier;

/// imgrocery - Weekly grocery lists from a meal plan
#[derive(Parser)]
#[command(name = "imgrocery")]
#[command(about = "Build a grocery list from a weekly meal plan and a recipe database", long_about = None)]
struct Cli {
    /// Week number of the meal plan (reads MPInputW<WEEK>.csv by default)
    week: u32,

    /// Path to configuration file
    #[arg(long)]
    config: Option<String>,

    /// Print a single uncategorized list instead of asking the classifier
    #[arg(long)]
    flat: bool,

    /// Output file (overrides config file)
    #[arg(long, conflicts_with = "no_save")]
    output: Option<PathBuf>,

    /// Print the list without saving it
    #[arg(long)]
    no_save: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    imgrocery::observability::init_observability(
        "imgrocery",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    let cmd = GenerateGroceryListCommand {
        week: cli.week,
        output: cli.output,
        save: !cli.no_save,
    };

    let output = if cli.flat {
        generate_flat_list(&cmd, &config)?
    } else {
        if config.classifier.api_key.is_empty() {
            return Err(AppError::MissingApiKey.into());
        }
        let classifier =
            OpenAiClassifier::new(config.classifier.settings(), config.categories.sections.clone())
                .map_err(AppError::from)?;
        generate_grocery_list(&cmd, &config, &classifier).await?
    };

    print!("{}", output.text);
    if let Some(path) = output.saved_to {
        println!("\nSaved to {}", path.display());
    }

    Ok(())
}
