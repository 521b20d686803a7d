//! Catalog products.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as served by the products endpoint.
///
/// Fields beyond `name`, `price` and `rating` (image, description, ...) are
/// kept in `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Display name; also the cart's uniqueness key.
    pub name: String,
    /// Unit price in CLP.
    pub price: Decimal,
    /// Star rating, 0 to 5.
    #[serde(default)]
    pub rating: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// A product with no extra fields.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Decimal, rating: f64) -> Self {
        Self {
            name: name.into(),
            price,
            rating,
            extra: serde_json::Map::new(),
        }
    }
}

/// The products endpoint payload: category name to ordered product list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog(BTreeMap<String, Vec<Product>>);

impl ProductCatalog {
    /// Products in `category`, in catalog order.
    #[must_use]
    pub fn category(&self, category: &str) -> Option<&[Product]> {
        self.0.get(category).map(Vec::as_slice)
    }

    /// Category names in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Total number of products across categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, Vec<Product>)> for ProductCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Product>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"{
        "outstanding": [
            {"name": "Notebook Pro 14", "price": 1299990, "rating": 5, "image": "img/pro14.png"},
            {"name": "Split 12000 BTU", "price": 349990, "rating": 4}
        ],
        "notebooks": [
            {"name": "Notebook Pro 14", "price": 1299990, "rating": 5}
        ],
        "air-conditioning": []
    }"#;

    #[test]
    fn test_parse_catalog() {
        let catalog: ProductCatalog = serde_json::from_str(CATALOG_JSON).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.categories().collect::<Vec<_>>(),
            ["air-conditioning", "notebooks", "outstanding"]
        );

        let featured = catalog.category("outstanding").unwrap();
        assert_eq!(featured[0].price, Decimal::new(1_299_990, 0));
        assert_eq!(featured[0].extra["image"], "img/pro14.png");
        assert!(catalog.category("air-conditioning").unwrap().is_empty());
        assert!(catalog.category("phones").is_none());
    }

    #[test]
    fn test_missing_rating_defaults_to_zero() {
        let product: Product =
            serde_json::from_str(r#"{"name": "Cable HDMI", "price": "4990"}"#).unwrap();
        assert!(product.rating.abs() < f64::EPSILON);
        assert_eq!(product.price, Decimal::new(4990, 0));
    }
}
