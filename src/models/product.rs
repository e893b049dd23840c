use serde::{Deserialize, Serialize};

/// A catalog entry, also the unit carried over the ingestion wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique identifier within the catalog
    pub id: String,
    /// Category used to match alternatives
    pub category: String,
    /// Non-negative rating
    pub stars: f64,
}

impl Product {
    pub fn new(id: impl Into<String>, category: impl Into<String>, stars: f64) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            stars,
        }
    }
}

/// Body of `POST /api/recommendations`
#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Comma-separated product identifiers, e.g. `"A1, B1"`
    pub product_ids: String,
}

impl RecommendationRequest {
    /// Splits `product_ids` on commas without trimming or filtering
    pub fn ids(&self) -> Vec<&str> {
        self.product_ids.split(',').collect()
    }
}
