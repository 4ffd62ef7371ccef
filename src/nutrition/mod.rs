pub mod cache;
pub mod estimator;
pub mod normalize;
pub mod resolver;

// Re-export common types
pub use cache::{CacheError, CacheStore};
pub use estimator::{EstimateError, SpoonacularClient};
pub use resolver::{FoodLabel, ImageLabeler, NutritionEstimator, Query, Resolver};

use serde::{Deserialize, Serialize};

/// Resolved nutrition facts for one food item, per 100 g.
///
/// A record is only ever constructed fully populated; a source that cannot
/// supply all four numeric fields reports "not found" instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}
