use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::cache::CacheStore;
use super::estimator::EstimateError;
use super::normalize::normalize;
use super::NutritionRecord;

/// A single inbound request: raw text, or image bytes still to be labeled.
#[derive(Debug, Clone)]
pub enum Query {
    Text(String),
    Image(Vec<u8>),
}

/// Candidate food name produced by an image labeler.
#[derive(Debug, Clone)]
pub struct FoodLabel {
    pub label: String,
    pub confidence: f32,
}

/// Remote nutrition estimation seam. `Ok(None)` means the service has no
/// data for the name; errors are transient and never escalate.
#[async_trait]
pub trait NutritionEstimator: Send + Sync {
    async fn estimate(&self, name: &str) -> Result<Option<NutritionRecord>, EstimateError>;
}

/// Image-to-food-name seam.
#[async_trait]
pub trait ImageLabeler: Send + Sync {
    async fn classify(&self, image: &[u8]) -> anyhow::Result<FoodLabel>;
}

/// Turns an ambiguous query into a nutrition record: label images, consult
/// the cache first, fall back to the remote estimator on miss, and write
/// successful estimates back. Every failure mode degrades to `None`.
pub struct Resolver {
    cache: Arc<CacheStore>,
    estimator: Arc<dyn NutritionEstimator>,
    labeler: Option<Arc<dyn ImageLabeler>>,
    min_confidence: f32,
}

impl Resolver {
    pub fn new(
        cache: Arc<CacheStore>,
        estimator: Arc<dyn NutritionEstimator>,
        labeler: Option<Arc<dyn ImageLabeler>>,
        min_confidence: f32,
    ) -> Self {
        Self {
            cache,
            estimator,
            labeler,
            min_confidence,
        }
    }

    pub async fn resolve(&self, query: Query) -> Option<NutritionRecord> {
        let name = match query {
            Query::Text(text) => text,
            Query::Image(bytes) => self.label_image(&bytes).await?,
        };

        if normalize(&name).is_empty() {
            debug!("query '{}' normalizes to nothing, skipping", name);
            return None;
        }

        if let Some(record) = self.cache.lookup(&name).await {
            debug!("cache hit for '{}'", name);
            return Some(record);
        }

        match self.estimator.estimate(&name).await {
            Ok(Some(record)) => {
                // Best effort: a full cache never blocks answering the user.
                if let Err(e) = self.cache.append(&record).await {
                    warn!("could not cache '{}': {}", record.name, e);
                }
                Some(record)
            }
            Ok(None) => {
                info!("no nutrition data found for '{}'", name);
                None
            }
            Err(e) => {
                warn!("nutrition estimation failed for '{}': {}", name, e);
                None
            }
        }
    }

    async fn label_image(&self, bytes: &[u8]) -> Option<String> {
        let Some(labeler) = &self.labeler else {
            warn!("image query received but no image labeler is configured");
            return None;
        };

        match labeler.classify(bytes).await {
            Ok(label) if label.confidence >= self.min_confidence => {
                debug!("image labeled '{}' ({:.2})", label.label, label.confidence);
                Some(label.label)
            }
            Ok(label) => {
                info!(
                    "discarding low-confidence label '{}' ({:.2} < {:.2})",
                    label.label, label.confidence, self.min_confidence
                );
                None
            }
            Err(e) => {
                warn!("image labeling failed: {}", e);
                None
            }
        }
    }
}
