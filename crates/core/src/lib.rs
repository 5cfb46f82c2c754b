//! Emporium Core - Storefront domain library.
//!
//! This crate holds everything the storefront needs that does not touch the
//! network:
//! - `storefront` - HTTP API backed by Firestore and Firebase Auth
//! - `cli` - Catalog management from the command line
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no HTTP clients and no
//! async runtime. Persistence goes through the [`storage::KeyValueStore`]
//! trait so callers decide where "local storage" actually lives.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, emails, products, cart items, addresses
//! - [`normalize`] - Total conversion of loose remote records into [`Product`]
//! - [`cart`] - The persisted shopping cart store
//! - [`storage`] - Key-value persistence abstraction
//! - [`lookup`] - Tagged outcomes for remote fetches and product lookups
//! - [`form`] - Product submission form validation
//! - [`checkout`] - Order summary arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod form;
pub mod lookup;
pub mod normalize;
pub mod storage;
pub mod types;

pub use cart::CartStore;
pub use lookup::{Fetched, LookupState};
pub use normalize::{RawProduct, normalize_product, normalize_product_at};
pub use storage::{KeyValueStore, MemoryStorage};
pub use types::*;
