//! Provider scope for cart consumers
//!
//! The store is constructed once at application start and owned by a
//! `CartProvider` for the lifetime of that scope. Consumers hold cheap
//! cloneable `CartHandle`s; a handle used after its provider is gone is a
//! usage error and fails fast, instead of silently operating on dead state.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;

use crate::cart::{CartStore, Totals};
use crate::item::LineItem;

/// Usage errors on the consumer surface. Invalid mutation targets are not
/// errors (silent no-op); only misuse of the scope is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Handle used outside an active `CartProvider` scope
    #[error("cart accessed outside an active CartProvider scope")]
    OutsideProvider,
}

/// Owns the store for the application scope
pub struct CartProvider {
    store: Rc<RefCell<CartStore>>,
}

impl CartProvider {
    /// Wrap an initialized store
    pub fn new(store: CartStore) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
        }
    }

    /// Hand out a consumer handle
    pub fn handle(&self) -> CartHandle {
        CartHandle {
            store: Rc::downgrade(&self.store),
        }
    }

    /// Drain pending writes before tearing the scope down
    pub fn flush(&self) {
        self.store.borrow().flush();
    }
}

/// Consumer-side access to the cart
#[derive(Clone)]
pub struct CartHandle {
    store: Weak<RefCell<CartStore>>,
}

impl CartHandle {
    fn store(&self) -> Result<Rc<RefCell<CartStore>>, CartError> {
        self.store.upgrade().ok_or(CartError::OutsideProvider)
    }

    /// Snapshot of the current line items
    pub fn products(&self) -> Result<Vec<LineItem>, CartError> {
        Ok(self.store()?.borrow().products().to_vec())
    }

    pub fn add_to_cart(&self, item: LineItem) -> Result<(), CartError> {
        self.store()?.borrow_mut().add_to_cart(item);
        Ok(())
    }

    pub fn increment(&self, id: &str) -> Result<(), CartError> {
        self.store()?.borrow_mut().increment(id);
        Ok(())
    }

    pub fn decrement(&self, id: &str) -> Result<(), CartError> {
        self.store()?.borrow_mut().decrement(id);
        Ok(())
    }

    /// Formatted cart total
    pub fn cart_total(&self) -> Result<String, CartError> {
        Ok(self.store()?.borrow_mut().cart_total())
    }

    /// Total quantity across all line items
    pub fn total_items_in_cart(&self) -> Result<u32, CartError> {
        Ok(self.store()?.borrow_mut().total_items_in_cart())
    }

    /// Both derived values in one borrow
    pub fn totals(&self) -> Result<Totals, CartError> {
        Ok(self.store()?.borrow_mut().totals().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn item(id: &str, price: f64) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: format!("Product {id}"),
            image_url: String::new(),
            price,
            quantity: 1,
        }
    }

    fn provider() -> CartProvider {
        CartProvider::new(CartStore::load(Box::new(MemoryStorage::new())))
    }

    #[test]
    fn test_handle_within_scope() {
        let provider = provider();
        let cart = provider.handle();

        cart.add_to_cart(item("2", 5.0)).unwrap();
        cart.add_to_cart(item("3", 7.0)).unwrap();

        assert_eq!(cart.total_items_in_cart().unwrap(), 2);
        assert_eq!(cart.cart_total().unwrap(), "R$ 12,00");
        assert_eq!(cart.products().unwrap().len(), 2);
    }

    #[test]
    fn test_handles_share_one_store() {
        let provider = provider();
        let a = provider.handle();
        let b = a.clone();

        a.add_to_cart(item("1", 10.0)).unwrap();
        b.increment("1").unwrap();

        assert_eq!(a.products().unwrap()[0].quantity, 2);
    }

    #[test]
    fn test_handle_outside_scope_fails_fast() {
        let provider = provider();
        let cart = provider.handle();
        drop(provider);

        assert_eq!(cart.products().unwrap_err(), CartError::OutsideProvider);
        assert_eq!(
            cart.add_to_cart(item("1", 10.0)).unwrap_err(),
            CartError::OutsideProvider
        );
        assert_eq!(cart.cart_total().unwrap_err(), CartError::OutsideProvider);
    }

    #[test]
    fn test_error_message_is_descriptive() {
        let message = CartError::OutsideProvider.to_string();
        assert!(message.contains("CartProvider"));
    }
}
