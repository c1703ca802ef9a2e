//! Cart Store - persistent shopping cart state
//!
//! Core modules:
//! - `item`: Line-item data model and cart invariants
//! - `cart`: State container with mutations and derived totals
//! - `storage`: Key-value backends (LocalStorage on web, files on native)
//! - `persist`: Coalescing background persistence queue
//! - `provider`: Explicit provider scope for consumers
//! - `money`: Currency formatting for totals

pub mod cart;
pub mod item;
pub mod money;
pub mod persist;
pub mod provider;
pub mod storage;

pub use cart::{CartStore, Totals};
pub use item::LineItem;
pub use provider::{CartError, CartHandle, CartProvider};
pub use storage::{BoxedBackend, MemoryStorage, StorageBackend, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Storage constants
pub mod consts {
    /// Fixed key the serialized cart lives under
    pub const STORAGE_KEY: &str = "products";
}
