//! Core types for Emporium.
//!
//! This module provides type-safe wrappers and the strict domain shapes that
//! every other layer works with.

pub mod address;
pub mod cart_item;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use address::{Address, AddressError};
pub use cart_item::CartItem;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{
    MetaData, PLACEHOLDER_IMAGE_URL, Product, ProductCategory, ProductImage, Specification,
    Weight,
};
