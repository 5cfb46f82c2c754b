//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email/password accounts via Firebase Auth
//! - `address` - Saved shipping addresses (remote with local fallback)

pub mod address;
pub mod auth;
