//! The shopping cart store.
//!
//! [`CartStore`] owns an ordered list of [`CartItem`]s, unique by product id,
//! and writes the whole list to its [`KeyValueStore`] after every change. It
//! is an ordinary value owned by whoever drives it; there is no global cart.
//!
//! ```
//! use emporium_core::{CartStore, MemoryStorage};
//!
//! let cart = CartStore::load(MemoryStorage::new());
//! assert!(cart.is_empty());
//! assert!(cart.cart_total().is_zero());
//! ```

use crate::storage::{KeyValueStore, keys, load_json, save_json};
use crate::types::{CartItem, Price, Product, ProductId};

/// A persisted shopping cart.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStore> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Rehydrate the cart from `storage`.
    ///
    /// Missing or malformed data yields an empty cart. Stored lines are
    /// cleaned up on the way in: quantities below one become one, and lines
    /// repeating an earlier product id are folded into it.
    pub fn load(storage: S) -> Self {
        let stored: Vec<CartItem> = load_json(&storage, keys::CART).unwrap_or_default();

        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for mut item in stored {
            item.quantity = item.quantity.max(1);
            match items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }

        Self { items, storage }
    }

    /// Current cart lines, in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity goes up by one;
    /// otherwise a new line with quantity one is appended.
    pub fn add_to_cart(&mut self, product: Product) {
        self.add_quantity(product, 1);
    }

    /// Add `quantity` units of `product`, the same as calling
    /// [`add_to_cart`](Self::add_to_cart) that many times. Zero is a no-op.
    pub fn add_quantity(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.items.iter_mut().find(|item| item.id() == &product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { product, quantity }),
        }
        self.persist();
    }

    /// Remove the line for `id`. Removing a product that is not in the cart
    /// does nothing.
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Set the quantity for `id`.
    ///
    /// A quantity of zero or less removes the line. There is no upper bound.
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.iter_mut().find(|item| item.id() == id) {
            item.quantity = quantity;
            self.persist();
        }
    }

    /// Empty the cart and erase its persisted state.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        if let Err(e) = self.storage.remove(keys::CART) {
            tracing::error!(error = %e, "Failed to erase cart from local storage");
        }
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn cart_total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units (not distinct lines).
    #[must_use]
    pub fn cart_items_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Borrow the backing storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the backing storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        if let Err(e) = save_json(&mut self.storage, keys::CART, &self.items) {
            tracing::error!(error = %e, "Failed to save cart to local storage");
        }
    }
}
