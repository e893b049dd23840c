mod product;

pub use product::{Product, RecommendationRequest};
