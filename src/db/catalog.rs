use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::CatalogError;
use crate::models::Product;

/// In-memory product catalog
///
/// Built once at startup and never mutated afterwards, so it is shared
/// between request tasks as a plain `Arc<Catalog>` with no lock.
#[derive(Debug, Default)]
pub struct Catalog {
    products: HashMap<String, Product>,
    /// category -> ids ordered by rating descending, then id ascending
    by_category: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Builds a catalog from products; a repeated id replaces the earlier entry
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut by_id = HashMap::new();
        for product in products {
            if let Some(previous) = by_id.insert(product.id.clone(), product) {
                tracing::debug!(id = %previous.id, "Duplicate catalog id, keeping last row");
            }
        }

        let mut by_category: HashMap<String, Vec<String>> = HashMap::new();
        for product in by_id.values() {
            by_category
                .entry(product.category.clone())
                .or_default()
                .push(product.id.clone());
        }
        for ids in by_category.values_mut() {
            ids.sort_by(|a, b| {
                let (pa, pb) = (&by_id[a], &by_id[b]);
                pb.stars.total_cmp(&pa.stars).then_with(|| a.cmp(b))
            });
        }

        Self {
            products: by_id,
            by_category,
        }
    }

    /// Loads the catalog from a CSV file with a header row
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            products = catalog.len(),
            categories = catalog.by_category.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Parses `id,category,rating` rows, skipping the header
    ///
    /// Rows that are short, unreadable, or carry a rating that is not a
    /// finite non-negative number are skipped with a warning.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut products = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // header is line 1
            let line = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(line, error = %e, "Skipping unreadable catalog row");
                    continue;
                }
            };

            match parse_row(&record) {
                Some(product) => products.push(product),
                None => tracing::warn!(line, row = ?record, "Skipping malformed catalog row"),
            }
        }

        Ok(Self::from_products(products))
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Products of `category`, best rated first, ties by smallest id
    pub fn candidates<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a Product> + 'a {
        self.by_category
            .get(category)
            .into_iter()
            .flatten()
            .filter_map(|id| self.products.get(id))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn parse_row(record: &StringRecord) -> Option<Product> {
    let id = record.get(0).filter(|s| !s.is_empty())?;
    let category = record.get(1)?;
    let stars: f64 = record.get(2)?.parse().ok()?;
    if !stars.is_finite() || stars < 0.0 {
        return None;
    }
    Some(Product::new(id, category, stars))
}
