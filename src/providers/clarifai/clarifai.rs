use std::env;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::{json, Value};

use crate::nutrition::{FoodLabel, ImageLabeler};

/// Clarifai food-recognition client: image bytes in, the top concept's name
/// and confidence out.
#[derive(Debug, Clone)]
pub struct ClarifaiClient {
    api_key: String,
    base_url: String,
    model_id: String,
    client: Client,
}

impl ClarifaiClient {
    pub fn new(api_key: String) -> Self {
        let model_id =
            env::var("CLARIFAI_MODEL_ID").unwrap_or_else(|_| "food-item-recognition".to_string());

        Self {
            api_key,
            base_url: "https://api.clarifai.com".to_string(),
            model_id,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageLabeler for ClarifaiClient {
    async fn classify(&self, image: &[u8]) -> Result<FoodLabel> {
        let url = format!("{}/v2/models/{}/outputs", self.base_url, self.model_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", self.api_key))
            .json(&json!({
                "inputs": [{
                    "data": {
                        "image": { "base64": BASE64.encode(image) }
                    }
                }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("labeling request failed with status {}", status));
        }

        let data: Value = response.json().await?;
        top_concept(&data).ok_or_else(|| anyhow!("labeling response carried no concepts"))
    }
}

fn top_concept(data: &Value) -> Option<FoodLabel> {
    let concept = data
        .get("outputs")
        .and_then(Value::as_array)
        .and_then(|outputs| outputs.first())
        .and_then(|output| output.get("data"))
        .and_then(|data| data.get("concepts"))
        .and_then(Value::as_array)
        .and_then(|concepts| concepts.first())?;

    let label = concept.get("name").and_then(Value::as_str)?.to_string();
    let confidence = concept.get("value").and_then(Value::as_f64)? as f32;
    Some(FoodLabel { label, confidence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_the_top_concept() {
        let data = json!({
            "outputs": [{
                "data": {
                    "concepts": [
                        { "id": "ai_1", "name": "fried rice", "value": 0.97 },
                        { "id": "ai_2", "name": "rice", "value": 0.82 }
                    ]
                }
            }]
        });

        let label = top_concept(&data).unwrap();
        assert_eq!(label.label, "fried rice");
        assert!((label.confidence - 0.97).abs() < 1e-6);
    }

    #[test]
    fn missing_concepts_yield_none() {
        assert!(top_concept(&json!({ "outputs": [] })).is_none());
        assert!(top_concept(&json!({ "status": { "code": 10020 } })).is_none());
    }
}
