pub mod api;
pub mod commands;
pub mod config;
pub mod nutrition;
pub mod providers;
pub mod reply;

// Re-export commonly used items
pub use config::BotConfig;
pub use nutrition::{NutritionRecord, Resolver};
pub use providers::traits::AdviceProvider;
