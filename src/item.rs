//! Cart line items
//!
//! The serialized field names are the wire contract with the storage slot
//! (`{id, title, image_url, price, quantity}`); other clients of the same
//! slot read and write the identical JSON shape.

use serde::{Deserialize, Serialize};

/// One product entry in the cart with an aggregated quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique product id (the cart key)
    pub id: String,
    /// Display title
    pub title: String,
    /// Product image URL
    pub image_url: String,
    /// Unit price, non-negative
    pub price: f64,
    /// Aggregated quantity, >= 1 while the item is in the cart
    pub quantity: u32,
}

impl LineItem {
    /// Line subtotal (price × quantity)
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Check the cart invariants on a restored item list: ids unique, every
/// quantity >= 1, every price finite and non-negative. Data that fails is
/// discarded on load, same as unparseable JSON.
pub(crate) fn state_is_valid(items: &[LineItem]) -> bool {
    let mut seen = std::collections::HashSet::new();
    items.iter().all(|item| {
        item.quantity >= 1
            && item.price.is_finite()
            && item.price >= 0.0
            && seen.insert(item.id.as_str())
    })
}
