//! Product domain types.
//!
//! A [`Product`] is always fully defaulted: every field holds a concrete value
//! or an explicit `None`. Loose remote records are turned into this shape by
//! [`crate::normalize`]; nothing else constructs products from raw JSON.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Image shown when a product has no images of its own.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.png";

/// Weight unit used when a record gives a weight without one.
pub const DEFAULT_WEIGHT_UNIT: &str = "kg";

/// Store department a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Clothing,
    Jewellery,
    Electronics,
    HomeAppliances,
    Beauty,
    Sports,
    Books,
    Furniture,
    Toys,
    Automotive,
}

impl ProductCategory {
    /// All categories, in menu order.
    pub const ALL: [Self; 10] = [
        Self::Clothing,
        Self::Jewellery,
        Self::Electronics,
        Self::HomeAppliances,
        Self::Beauty,
        Self::Sports,
        Self::Books,
        Self::Furniture,
        Self::Toys,
        Self::Automotive,
    ];

    /// The stored identifier (e.g. `home_appliances`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clothing => "clothing",
            Self::Jewellery => "jewellery",
            Self::Electronics => "electronics",
            Self::HomeAppliances => "home_appliances",
            Self::Beauty => "beauty",
            Self::Sports => "sports",
            Self::Books => "books",
            Self::Furniture => "furniture",
            Self::Toys => "toys",
            Self::Automotive => "automotive",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("invalid product category: {s}"))
    }
}

/// One product image. Lower `priority` sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    pub priority: i64,
}

impl ProductImage {
    /// The image used when a product has none.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            url: PLACEHOLDER_IMAGE_URL.to_owned(),
            priority: 0,
        }
    }
}

/// A key/value line in the specification table. Keys may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub key: String,
    pub value: String,
}

/// Shipping weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: String,
}

/// SEO metadata. `url` is the optional slug that can stand in for the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub url: Option<String>,
}

/// A sellable item, fully defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Price before the current discount; `None` when not on sale.
    pub previous_price: Option<Price>,
    /// Advertised discount percentage; `None` when not on sale.
    pub discount_percent: Option<f64>,
    pub weight: Option<Weight>,
    pub category: Option<ProductCategory>,
    pub images: Vec<ProductImage>,
    pub specifications: Vec<Specification>,
    pub meta: MetaData,
    pub introduction_html: String,
    pub description_html: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Images in display order: ascending priority, ties keep their original
    /// relative order. An empty list yields the placeholder image.
    #[must_use]
    pub fn gallery(&self) -> Vec<ProductImage> {
        if self.images.is_empty() {
            return vec![ProductImage::placeholder()];
        }
        let mut images = self.images.clone();
        images.sort_by_key(|image| image.priority);
        images
    }

    /// URL of the first image in display order.
    #[must_use]
    pub fn primary_image_url(&self) -> String {
        self.images
            .iter()
            .enumerate()
            .min_by_key(|(index, image)| (image.priority, *index))
            .map_or_else(|| PLACEHOLDER_IMAGE_URL.to_owned(), |(_, image)| image.url.clone())
    }

    /// Whether a positive discount is advertised.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.discount_percent.is_some_and(|percent| percent > 0.0)
    }

    /// Whether the product is eligible for the featured shelf: it has at least
    /// one image of its own and a non-zero price.
    #[must_use]
    pub fn is_featurable(&self) -> bool {
        !self.images.is_empty() && !self.price.is_zero()
    }

    /// Amount saved against the previous price, zero when not on sale.
    #[must_use]
    pub fn savings(&self) -> Price {
        self.previous_price
            .map_or(Price::ZERO, |previous| self.price.savings_from(previous))
    }

    /// Whether `candidate` names this product, by id or by slug.
    #[must_use]
    pub fn matches_slug(&self, candidate: &str) -> bool {
        self.id.as_str() == candidate || self.meta.url.as_deref() == Some(candidate)
    }
}
