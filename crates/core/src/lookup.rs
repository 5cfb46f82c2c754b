//! Tagged outcomes for remote reads.

use serde::Serialize;

use crate::types::Product;

/// Result of a read that may fall back across storage tiers.
///
/// Failures are values, not errors: callers decide whether `Error` means
/// "show a retry button" or "try the next tier".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The value was found.
    Ok(T),
    /// The read succeeded but nothing is stored.
    Empty,
    /// The read failed; the message is for logs.
    Error(String),
}

impl<T> Fetched<T> {
    /// The found value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            Self::Empty | Self::Error(_) => None,
        }
    }

    /// Whether a value was found.
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Use `fallback` unless this read found a value.
    pub fn or_else(self, fallback: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Ok(value) => Self::Ok(value),
            Self::Empty | Self::Error(_) => fallback(),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<Option<T>, E>> for Fetched<T> {
    fn from(result: Result<Option<T>, E>) -> Self {
        match result {
            Ok(Some(value)) => Self::Ok(value),
            Ok(None) => Self::Empty,
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// State of a product page lookup.
///
/// `NotFound` is a finished lookup that matched nothing, never to be confused
/// with `Loading`, which has not finished.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "product", rename_all = "snake_case")]
pub enum LookupState {
    /// The lookup has not completed.
    #[default]
    Loading,
    /// A product matched.
    Found(Box<Product>),
    /// Neither the id nor any slug matched.
    NotFound,
    /// The remote store could not be queried.
    Failed,
}

impl LookupState {
    /// Whether the lookup has completed, successfully or not.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Loading)
    }

    /// The matched product, if any.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Found(product) => Some(product),
            _ => None,
        }
    }
}
