use log::warn;

use crate::nutrition::NutritionRecord;
use crate::providers::traits::AdviceProvider;

/// Messaging platforms cap reply length; everything outbound is clipped.
pub const MAX_REPLY_LEN: usize = 1000;

pub const UNRESOLVED_REPLY: &str =
    "Sorry, I couldn't find nutrition data for that. Try another food name?";
const FALLBACK_CHAT: &str = "Sorry, I can't reply right now. Please try again later.";
const FALLBACK_ADVICE: &str = "Enjoy it as part of a balanced diet.";

pub fn format_nutrition(record: &NutritionRecord) -> String {
    format!(
        "{} (estimated, per 100 g)\nCalories: {} kcal\nProtein {} g | Fat {} g | Carbs {} g",
        record.name, record.calories, record.protein, record.fat, record.carbs
    )
}

/// Nutrition summary plus an advice line when an advisor is configured.
/// Advice failures never surface; the canned line stands in.
pub async fn nutrition_reply(
    record: &NutritionRecord,
    advisor: Option<&dyn AdviceProvider>,
) -> String {
    let mut reply = format_nutrition(record);
    if let Some(advisor) = advisor {
        let advice = match advisor.advise(record).await {
            Ok(text) => text,
            Err(e) => {
                warn!("advice generation failed: {}", e);
                FALLBACK_ADVICE.to_string()
            }
        };
        reply.push('\n');
        reply.push_str(&advice);
    }
    truncate_reply(reply)
}

/// Conversational reply for text that did not resolve to a food.
pub async fn chat_reply(message: &str, advisor: Option<&dyn AdviceProvider>) -> String {
    let Some(advisor) = advisor else {
        return UNRESOLVED_REPLY.to_string();
    };
    match advisor.chat(message).await {
        Ok(text) => truncate_reply(text),
        Err(e) => {
            warn!("chat reply failed: {}", e);
            FALLBACK_CHAT.to_string()
        }
    }
}

pub fn truncate_reply(text: String) -> String {
    if text.chars().count() <= MAX_REPLY_LEN {
        text
    } else {
        text.chars().take(MAX_REPLY_LEN).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct FailingAdvisor;

    #[async_trait]
    impl AdviceProvider for FailingAdvisor {
        async fn advise(&self, _record: &NutritionRecord) -> anyhow::Result<String> {
            Err(anyhow!("quota exhausted"))
        }

        async fn chat(&self, _message: &str) -> anyhow::Result<String> {
            Err(anyhow!("quota exhausted"))
        }
    }

    fn banana() -> NutritionRecord {
        NutritionRecord {
            name: "banana".to_string(),
            calories: 105.0,
            protein: 1.3,
            fat: 0.3,
            carbs: 27.0,
        }
    }

    #[test]
    fn summary_carries_every_field() {
        let text = format_nutrition(&banana());
        assert!(text.starts_with("banana"));
        assert!(text.contains("105 kcal"));
        assert!(text.contains("Protein 1.3 g"));
        assert!(text.contains("Fat 0.3 g"));
        assert!(text.contains("Carbs 27 g"));
    }

    #[tokio::test]
    async fn advice_failure_falls_back_to_canned_line() {
        let reply = nutrition_reply(&banana(), Some(&FailingAdvisor)).await;
        assert!(reply.contains("105 kcal"));
        assert!(reply.ends_with(FALLBACK_ADVICE));
    }

    #[tokio::test]
    async fn chat_failure_falls_back_to_canned_line() {
        let reply = chat_reply("hello there", Some(&FailingAdvisor)).await;
        assert_eq!(reply, FALLBACK_CHAT);
    }

    #[test]
    fn long_replies_are_clipped() {
        let text = "g".repeat(MAX_REPLY_LEN + 50);
        assert_eq!(truncate_reply(text).chars().count(), MAX_REPLY_LEN);
    }
}
