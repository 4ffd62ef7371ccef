use std::env;

use anyhow::{anyhow, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs, Role,
    },
    Client,
};
use async_trait::async_trait;

use crate::nutrition::NutritionRecord;
use crate::providers::traits::AdviceProvider;

/// Advice and fallback-chat generation over the OpenAI chat API.
#[derive(Clone)]
pub struct OpenAIAdvisor {
    client: Client<OpenAIConfig>,
    chat_model: String,
}

impl OpenAIAdvisor {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let chat_model =
            env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        Self {
            client: Client::with_config(config),
            chat_model,
        }
    }

    async fn complete(&self, system_message: &str, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.chat_model)
            .temperature(0.7)
            .messages(vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    role: Role::System,
                    content: system_message.to_string(),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    role: Role::User,
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                }),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .ok_or_else(|| anyhow!("No response content"))
    }
}

#[async_trait]
impl AdviceProvider for OpenAIAdvisor {
    async fn advise(&self, record: &NutritionRecord) -> Result<String> {
        let prompt = format!(
            "Nutrition facts for {} per 100 g: {} kcal, {} g protein, {} g fat, {} g carbs.\n\
             Give one dietary-advice sentence of at most 40 words. Do not repeat the numbers.",
            record.name, record.calories, record.protein, record.fat, record.carbs
        );
        self.complete("You are a professional nutritionist. Keep answers short.", &prompt)
            .await
    }

    async fn chat(&self, message: &str) -> Result<String> {
        self.complete("You are a friendly nutrition chat bot. Answer briefly.", message)
            .await
    }
}
