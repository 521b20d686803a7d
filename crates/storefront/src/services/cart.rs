//! Cart service.
//!
//! Line items live in insertion order and are unique by product name. Every
//! mutation republishes the total quantity while the item lock is held.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tracing::instrument;

use tienda_core::Price;

use crate::models::{CartLineItem, Product};
use crate::observable::{ReplayCell, Subscription};

/// The shopping cart.
pub struct CartStore {
    items: Mutex<Vec<CartLineItem>>,
    total_quantity: ReplayCell<u64>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            total_quantity: ReplayCell::new(0),
        }
    }

    /// Add one unit of `product`. A product already in the cart (same name)
    /// has its quantity incremented; otherwise a new line is appended.
    #[instrument(skip(self, product), fields(product = %product.name))]
    pub fn add_item(&self, product: Product) {
        let mut items = self.lock();
        if let Some(line) = items.iter_mut().find(|l| l.product.name == product.name) {
            line.quantity = line.quantity.saturating_add(1);
        } else {
            items.push(CartLineItem::new(product));
        }
        self.publish(&items);
    }

    /// Remove every line for `name`. Returns whether anything was removed.
    ///
    /// The total is republished either way.
    #[instrument(skip(self))]
    pub fn remove_item(&self, name: &str) -> bool {
        let mut items = self.lock();
        let before = items.len();
        items.retain(|l| l.product.name != name);
        let removed = items.len() != before;
        self.publish(&items);
        removed
    }

    /// Set the quantity for `name`, clamping negatives to zero and values
    /// above `u32::MAX` to `u32::MAX`. A zero quantity keeps the line.
    /// Returns false, without publishing, if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn update_quantity(&self, name: &str, quantity: i64) -> bool {
        let mut items = self.lock();
        let Some(line) = items.iter_mut().find(|l| l.product.name == name) else {
            return false;
        };
        line.quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);
        self.publish(&items);
        true
    }

    /// Empty the cart and return the (empty) contents.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Vec<CartLineItem> {
        let mut items = self.lock();
        items.clear();
        self.publish(&items);
        items.clone()
    }

    /// Snapshot of the line items.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.lock().clone()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        total(&self.lock())
    }

    /// Sum of all line totals, in CLP.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        Price::clp(self.lock().iter().map(CartLineItem::line_total).sum::<Decimal>())
    }

    /// Total quantity changes, starting with the current total.
    pub fn total_quantity_changes(&self) -> Subscription<u64> {
        self.total_quantity.subscribe()
    }

    /// Return to the empty cart.
    pub fn reset(&self) {
        self.clear_cart();
    }

    fn publish(&self, items: &[CartLineItem]) {
        self.total_quantity.publish(total(items));
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartLineItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn total(items: &[CartLineItem]) -> u64 {
    items.iter().map(|l| u64::from(l.quantity)).sum()
}
