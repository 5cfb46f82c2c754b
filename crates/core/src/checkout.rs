//! Checkout order summary.

use serde::Serialize;

use crate::cart::CartStore;
use crate::storage::KeyValueStore;
use crate::types::Price;

/// Per-order fees added on top of the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fees {
    pub shipping: Price,
    pub service: Price,
}

impl Default for Fees {
    fn default() -> Self {
        Self {
            shipping: Price::ZERO,
            service: Price::from_cents(50),
        }
    }
}

/// What the checkout page shows before an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Price,
    pub item_count: u64,
    pub shipping_fee: Price,
    pub service_fee: Price,
    pub total: Price,
    pub can_place_order: bool,
}

impl OrderSummary {
    /// Summarize `cart` for checkout.
    ///
    /// An order can only be placed once a shipping address is saved and the
    /// cart holds at least one item.
    pub fn new<S: KeyValueStore>(cart: &CartStore<S>, has_address: bool, fees: Fees) -> Self {
        let subtotal = cart.cart_total();
        Self {
            subtotal,
            item_count: cart.cart_items_count(),
            shipping_fee: fees.shipping,
            service_fee: fees.service,
            total: subtotal + fees.shipping + fees.service,
            can_place_order: has_address && !cart.is_empty(),
        }
    }

    /// Shipping fee as shown to the shopper.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.shipping_fee.is_zero() {
            "FREE".to_owned()
        } else {
            self.shipping_fee.display()
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::product::fixtures::product;

    #[test]
    fn test_summary_with_default_fees() {
        let mut cart = CartStore::load(MemoryStorage::new());
        cart.add_quantity(product("a", 1000), 2);
        cart.add_to_cart(product("b", 550));

        let summary = OrderSummary::new(&cart, true, Fees::default());
        assert_eq!(summary.subtotal.amount(), Decimal::new(255, 1));
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total.amount(), Decimal::new(26, 0));
        assert_eq!(summary.shipping_label(), "FREE");
        assert!(summary.can_place_order);
    }

    #[test]
    fn test_cannot_place_order_without_address_or_items() {
        let mut cart = CartStore::load(MemoryStorage::new());
        assert!(!OrderSummary::new(&cart, true, Fees::default()).can_place_order);

        cart.add_to_cart(product("a", 100));
        assert!(!OrderSummary::new(&cart, false, Fees::default()).can_place_order);
    }

    #[test]
    fn test_paid_shipping_label() {
        let cart = CartStore::load(MemoryStorage::new());
        let fees = Fees {
            shipping: Price::from_cents(499),
            service: Price::ZERO,
        };
        let summary = OrderSummary::new(&cart, false, fees);
        assert_eq!(summary.shipping_label(), "$4.99");
        assert_eq!(summary.total, Price::from_cents(499));
    }
}
