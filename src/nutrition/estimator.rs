use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::resolver::NutritionEstimator;
use super::NutritionRecord;

/// Failure while talking to the nutrition service. Every variant is
/// transient: the resolver answers "nothing found" and the next identical
/// query takes the same path again.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("nutrition request timed out")]
    Timeout,
    #[error("nutrition request failed: {0}")]
    Transport(String),
    #[error("nutrition service returned status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for EstimateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Client for the Spoonacular ingredient API: one search call to find the
/// ingredient id, one details call for its per-100 g nutrient breakdown.
#[derive(Debug, Clone)]
pub struct SpoonacularClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl SpoonacularClient {
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: "https://api.spoonacular.com".to_string(),
            timeout,
            client: Client::new(),
        }
    }

    async fn get_json(&self, url: &str, params: &[(&str, &str)]) -> Result<Value, EstimateError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EstimateError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl NutritionEstimator for SpoonacularClient {
    async fn estimate(&self, name: &str) -> Result<Option<NutritionRecord>, EstimateError> {
        let search_url = format!("{}/food/ingredients/search", self.base_url);
        let search = self
            .get_json(
                &search_url,
                &[("query", name), ("number", "1"), ("apiKey", self.api_key.as_str())],
            )
            .await?;

        let id = search
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(|item| item.get("id"))
            .and_then(Value::as_i64);
        let Some(id) = id else {
            debug!("no ingredient match for '{}'", name);
            return Ok(None);
        };

        let details_url = format!("{}/food/ingredients/{}/information", self.base_url, id);
        let details = self
            .get_json(
                &details_url,
                &[("amount", "100"), ("unit", "g"), ("apiKey", self.api_key.as_str())],
            )
            .await?;

        Ok(record_from_details(name, &details))
    }
}

/// Converts the loose nutrient list of a details response into a strict
/// record. Any missing or negative required field means the ingredient has no
/// usable data, never a partial record.
fn record_from_details(query: &str, details: &Value) -> Option<NutritionRecord> {
    let nutrients = details
        .get("nutrition")
        .and_then(|n| n.get("nutrients"))
        .and_then(Value::as_array)?;

    let amount_of = |wanted: &str| {
        nutrients
            .iter()
            .find(|n| n.get("name").and_then(Value::as_str) == Some(wanted))
            .and_then(|n| n.get("amount"))
            .and_then(Value::as_f64)
            .filter(|amount| *amount >= 0.0)
    };

    let calories = amount_of("Calories")?;
    let protein = amount_of("Protein")?;
    let fat = amount_of("Fat")?;
    let carbs = amount_of("Carbohydrates")?;

    let name = details
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(query);

    Some(NutritionRecord {
        name: name.to_string(),
        calories: round1(calories),
        protein: round1(protein),
        fat: round1(fat),
        carbs: round1(carbs),
    })
}

// One decimal place, so cached values and displayed values always agree.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
