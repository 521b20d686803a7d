//! Cart route handlers.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{Path, State},
    response::{
        Sse,
        sse::{Event, KeepAlive},
    },
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tienda_core::Price;

use crate::error::{AppError, AppJson, Result, add_breadcrumb};
use crate::models::{CartLineItem, Product};
use crate::state::AppState;

/// Largest quantity a line can hold.
pub const MAX_QUANTITY: i64 = u32::MAX as i64;

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

/// Cart contents as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_quantity: u64,
    pub subtotal: String,
}

impl From<Vec<CartLineItem>> for CartView {
    fn from(items: Vec<CartLineItem>) -> Self {
        let total_quantity = items.iter().map(|l| u64::from(l.quantity)).sum();
        let subtotal = Price::clp(items.iter().map(CartLineItem::line_total).sum());
        Self {
            items,
            total_quantity,
            subtotal: subtotal.to_string(),
        }
    }
}

/// Current cart.
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(state.cart().items()))
}

/// Add one unit of a product.
#[instrument(skip(state, product), fields(product = %product.name))]
pub async fn add(
    State(state): State<AppState>,
    AppJson(product): AppJson<Product>,
) -> Json<CartView> {
    add_breadcrumb("cart", "Added to cart", &[("product", product.name.as_str())]);
    state.cart().add_item(product);
    Json(CartView::from(state.cart().items()))
}

/// Set a line's quantity.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(name): Path<String>,
    AppJson(request): AppJson<QuantityRequest>,
) -> Result<Json<CartView>> {
    if request.quantity > MAX_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be at most {MAX_QUANTITY}"
        )));
    }
    if !state.cart().update_quantity(&name, request.quantity) {
        return Err(AppError::NotFound(format!("{name} is not in the cart")));
    }
    Ok(Json(CartView::from(state.cart().items())))
}

/// Remove a product. Removing an absent product is not an error.
#[instrument(skip(state))]
pub async fn remove(State(state): State<AppState>, Path(name): Path<String>) -> Json<CartView> {
    state.cart().remove_item(&name);
    Json(CartView::from(state.cart().items()))
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(state.cart().clear_cart()))
}

/// Stream of the total quantity, starting with the current total.
#[instrument(skip(state))]
pub async fn count_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let events = state
        .cart()
        .total_quantity_changes()
        .into_stream()
        .map(|total| Ok(Event::default().event("count").data(total.to_string())));
    Sse::new(events).keep_alive(KeepAlive::default())
}
