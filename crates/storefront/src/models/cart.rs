//! Cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;

/// One product-and-quantity pairing in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Copy of the product as it was when first added.
    pub product: Product,
    /// Units of the product; may be zero after an explicit update.
    pub quantity: u32,
}

impl CartLineItem {
    /// A new line with quantity 1.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}
