//! Cart state container
//!
//! Owns the line items, applies the three mutations, recomputes derived
//! totals behind an explicit dirty flag, and pushes a full snapshot to the
//! persistence queue after every change.

use crate::consts::STORAGE_KEY;
use crate::item::{self, LineItem};
use crate::money::format_currency;
use crate::persist::PersistQueue;
use crate::storage::BoxedBackend;

/// Derived totals, cached until the next mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    /// Formatted currency sum of price × quantity
    pub cart_total: String,
    /// Sum of all quantities
    pub total_items_in_cart: u32,
}

/// The cart state and its persistence queue
pub struct CartStore {
    products: Vec<LineItem>,
    /// `None` means dirty; recomputed on the next read
    totals: Option<Totals>,
    queue: PersistQueue,
}

impl CartStore {
    /// Restore the cart from storage. An absent key, unparseable JSON, or
    /// data violating the cart invariants all start an empty cart; nothing
    /// is surfaced and nothing is retried.
    pub fn load(backend: BoxedBackend) -> Self {
        let products = match backend.get(STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Vec<LineItem>>(&json) {
                Ok(items) if item::state_is_valid(&items) => {
                    log::info!("restored {} cart items", items.len());
                    items
                }
                Ok(_) => {
                    log::warn!("stored cart violates invariants, starting empty");
                    Vec::new()
                }
                Err(err) => {
                    log::warn!("stored cart unreadable ({err}), starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                log::info!("no stored cart, starting empty");
                Vec::new()
            }
            Err(err) => {
                log::warn!("cart storage read failed ({err}), starting empty");
                Vec::new()
            }
        };

        Self {
            products,
            totals: None,
            queue: PersistQueue::new(backend, STORAGE_KEY),
        }
    }

    /// Read-only view of the current line items
    pub fn products(&self) -> &[LineItem] {
        &self.products
    }

    /// Add a product. An existing entry wins: its quantity is bumped by one
    /// and its stored fields are kept, whatever the input carries. A new id
    /// is inserted as given, including its quantity.
    pub fn add_to_cart(&mut self, item: LineItem) {
        match self.products.iter_mut().find(|p| p.id == item.id) {
            Some(existing) => existing.quantity += 1,
            None => self.products.push(item),
        }
        self.after_mutation();
    }

    /// Bump the quantity of `id` by one; silent no-op when absent
    pub fn increment(&mut self, id: &str) {
        if let Some(item) = self.products.iter_mut().find(|p| p.id == id) {
            item.quantity += 1;
        }
        self.after_mutation();
    }

    /// Drop the quantity of `id` by one, removing the entry when it would
    /// reach zero; silent no-op when absent
    pub fn decrement(&mut self, id: &str) {
        if let Some(pos) = self.products.iter().position(|p| p.id == id) {
            if self.products[pos].quantity <= 1 {
                self.products.remove(pos);
            } else {
                self.products[pos].quantity -= 1;
            }
        }
        self.after_mutation();
    }

    /// Formatted cart total
    pub fn cart_total(&mut self) -> String {
        self.totals().cart_total.clone()
    }

    /// Total quantity across all line items
    pub fn total_items_in_cart(&mut self) -> u32 {
        self.totals().total_items_in_cart
    }

    /// Cached derived totals, recomputed when a mutation ran since the last
    /// read
    pub fn totals(&mut self) -> &Totals {
        let products = &self.products;
        self.totals.get_or_insert_with(|| {
            let total: f64 = products.iter().map(LineItem::subtotal).sum();
            Totals {
                cart_total: format_currency(total),
                total_items_in_cart: products.iter().map(|p| p.quantity).sum(),
            }
        })
    }

    /// Block until every queued snapshot is written (orderly shutdown)
    pub fn flush(&self) {
        self.queue.flush();
    }

    fn after_mutation(&mut self) {
        self.totals = None;
        match serde_json::to_string(&self.products) {
            Ok(json) => self.queue.enqueue(json),
            Err(err) => log::warn!("cart serialize failed: {err}"),
        }
    }
}
