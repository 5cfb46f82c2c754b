//! Cart line type.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A product in the cart with its quantity.
///
/// Serialized flat, as the product's own fields plus `quantity`, which is the
/// shape kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default = "min_quantity")]
    pub quantity: u32,
}

const fn min_quantity() -> u32 {
    1
}

impl CartItem {
    /// A new line holding one unit of `product`.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// The product id this line is keyed by.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::fixtures::product;

    #[test]
    fn test_serializes_flat() {
        let item = CartItem::new(product("p1", 999));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["quantity"], 1);
        assert!(json.get("product").is_none());
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let mut json = serde_json::to_value(CartItem::new(product("p1", 999))).unwrap();
        json.as_object_mut().unwrap().remove("quantity");
        let item: CartItem = serde_json::from_value(json).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_line_total() {
        let mut item = CartItem::new(product("p1", 550));
        item.quantity = 3;
        assert_eq!(item.line_total(), Price::from_cents(1650));
    }
}
