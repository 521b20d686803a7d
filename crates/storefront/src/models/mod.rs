//! Domain models for the storefront.
//!
//! - [`user`] - directory users and their wire records
//! - [`product`] - catalog products grouped by category
//! - [`cart`] - cart line items
//! - [`session`] - authentication state snapshots

pub mod cart;
pub mod product;
pub mod session;
pub mod user;

pub use cart::CartLineItem;
pub use product::{Product, ProductCatalog};
pub use session::{Navigation, Session};
pub use user::{User, UserProfile, UserRecord};
