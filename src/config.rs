use std::env;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use imgrocery_shopping::{CategorySet, MAX_ATTEMPTS, OpenAiSettings};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Input and output file locations
///
/// `{week}` in a file name is replaced by the requested week number.
#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_meal_plan")]
    pub meal_plan: String,
    #[serde(default = "default_recipe_database")]
    pub recipe_database: String,
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            meal_plan: default_meal_plan(),
            recipe_database: default_recipe_database(),
            output: default_output(),
        }
    }
}

impl FilesConfig {
    pub fn meal_plan_path(&self, week: u32) -> PathBuf {
        self.resolve(&self.meal_plan, week)
    }

    pub fn recipe_database_path(&self, week: u32) -> PathBuf {
        self.resolve(&self.recipe_database, week)
    }

    pub fn output_path(&self, week: u32) -> PathBuf {
        self.resolve(&self.output, week)
    }

    fn resolve(&self, pattern: &str, week: u32) -> PathBuf {
        self.data_dir
            .join(pattern.replace("{week}", &week.to_string()))
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_meal_plan() -> String {
    "MPInputW{week}.csv".to_string()
}

fn default_recipe_database() -> String {
    "RecipeDatabase.csv".to_string()
}

fn default_output() -> String {
    "GroceryListW{week}.txt".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClassifierConfig {
    pub fn settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            api_key: self.api_key.to_owned(),
            base_url: self.base_url.to_owned(),
            model: self.model.to_owned(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

/// Store sections offered to the classifier, in display order
#[derive(Debug, Deserialize, Clone)]
pub struct CategoriesConfig {
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
            fallback: default_fallback(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl CategoriesConfig {
    pub fn category_set(&self) -> CategorySet {
        CategorySet {
            sections: self.sections.to_owned(),
            fallback: self.fallback.to_owned(),
        }
    }
}

fn default_sections() -> Vec<String> {
    CategorySet::default().sections
}

fn default_fallback() -> String {
    CategorySet::default().fallback
}

fn default_max_attempts() -> u32 {
    MAX_ATTEMPTS
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Legacy variables (OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_MODEL)
    /// 2. Environment variables (IMGROCERY__CLASSIFIER__MODEL, etc.)
    /// 3. Config file specified by path
    /// 4. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Config file is optional
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("IMGROCERY")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            builder = builder.set_override("classifier.api_key", api_key)?;
        }
        if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
            builder = builder.set_override("classifier.base_url", base_url)?;
        }
        if let Ok(model) = env::var("OPENAI_MODEL") {
            builder = builder.set_override("classifier.model", model)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.categories.max_attempts < 1 {
            return Err("categories.max_attempts must be at least 1".to_string());
        }
        if self.categories.sections.is_empty() {
            return Err("categories.sections must not be empty".to_string());
        }
        if self.categories.sections.contains(&self.categories.fallback) {
            return Err(format!(
                "categories.fallback '{}' must not also be a section",
                self.categories.fallback
            ));
        }
        if !(0.0..=2.0).contains(&self.classifier.temperature) {
            return Err("classifier.temperature must be between 0 and 2".to_string());
        }
        if self.classifier.timeout_secs == 0 {
            return Err("classifier.timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}
