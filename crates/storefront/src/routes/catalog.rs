//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tienda_core::Price;

use crate::error::Result;
use crate::models::Product;
use crate::services::catalog::{STAR_COUNT, stars};
use crate::state::AppState;

/// Products per row when the client does not say.
pub const DEFAULT_COLUMNS: usize = 3;

/// Query parameters for a category listing.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub columns: Option<usize>,
}

/// A product with its display fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub formatted_price: String,
    pub stars: [bool; STAR_COUNT],
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            formatted_price: Price::clp(product.price).to_string(),
            stars: stars(product.rating),
            product,
        }
    }
}

/// A category laid out in rows.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category: String,
    pub rows: Vec<Vec<ProductView>>,
}

/// The whole catalog, keyed by category.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response> {
    let catalog = state.catalog().catalog().await?;
    Ok(Json(&*catalog).into_response())
}

/// One category in rows of `columns` products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<CategoryView>> {
    let columns = query.columns.unwrap_or(DEFAULT_COLUMNS);
    let rows = state
        .catalog()
        .category_rows(&category, columns)
        .await?
        .into_iter()
        .map(|row| row.into_iter().map(ProductView::from).collect())
        .collect();

    Ok(Json(CategoryView { category, rows }))
}
