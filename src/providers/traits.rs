use anyhow::Result;
use async_trait::async_trait;

use crate::nutrition::NutritionRecord;

/// Conversational collaborator. Callers treat every error as soft and fall
/// back to canned reply text.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// One short dietary-advice sentence for a resolved record.
    async fn advise(&self, record: &NutritionRecord) -> Result<String>;

    /// Plain conversational reply for input that turned out not to be food.
    async fn chat(&self, message: &str) -> Result<String>;
}
