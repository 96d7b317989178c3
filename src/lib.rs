pub mod config;
pub mod error;
pub mod grocery;
pub mod observability;
pub mod render;
pub mod table;

pub use config::Config;
pub use error::AppError;
pub use grocery::{
    GenerateGroceryListCommand, GroceryListOutput, generate_flat_list, generate_grocery_list,
};
