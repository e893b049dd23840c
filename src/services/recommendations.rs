use std::collections::HashSet;

use crate::{db::Catalog, models::Product};

/// Outcome of one recommendation computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    /// At most one winner per requested category, in first-appearance order
    pub products: Vec<Product>,
    /// Trimmed ids that were not in the catalog
    pub unknown_ids: Vec<String>,
}

/// Finds the best-rated alternative in every category the request touches
///
/// Each id is trimmed; empty tokens are ignored and unknown ids are logged and
/// excluded. For every category of a valid id, the winner is the highest-rated
/// catalog product of that category that was not itself requested, with ties
/// going to the smallest id. Categories with no such product are left out.
pub fn compute<S: AsRef<str>>(ids: &[S], catalog: &Catalog) -> Recommendations {
    let mut categories: Vec<&str> = Vec::new();
    let mut excluded: HashSet<&str> = HashSet::new();
    let mut unknown_ids = Vec::new();

    for raw in ids {
        let id = raw.as_ref().trim();
        if id.is_empty() {
            continue;
        }
        match catalog.get(id) {
            Some(product) => {
                excluded.insert(product.id.as_str());
                if !categories.contains(&product.category.as_str()) {
                    categories.push(product.category.as_str());
                }
            }
            None => {
                tracing::warn!(id, "Product ID not found in catalog");
                unknown_ids.push(id.to_string());
            }
        }
    }

    let products = categories
        .into_iter()
        .filter_map(|category| {
            catalog
                .candidates(category)
                .find(|candidate| !excluded.contains(candidate.id.as_str()))
                .cloned()
        })
        .collect();

    Recommendations {
        products,
        unknown_ids,
    }
}
