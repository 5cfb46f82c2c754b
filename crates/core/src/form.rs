//! Product submission form.
//!
//! [`ProductForm`] holds what an admin typed, as strings. [`ProductForm::validate`]
//! checks it and produces a [`NewProduct`] ready to be written to the remote
//! store. Validation happens before any remote call, so a rejected form never
//! mutates remote state.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::types::price;
use crate::types::product::DEFAULT_WEIGHT_UNIT;
use crate::types::{MetaData, Price, ProductCategory, ProductImage, Specification, Weight};

/// Reasons a product form is rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Introduction required")]
    MissingIntroduction,

    #[error("Description required")]
    MissingDescription,

    #[error("Invalid price")]
    InvalidPrice,

    #[error("Invalid image URL \"{0}\"")]
    InvalidImageUrl(String),
}

/// Form fields exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductForm {
    pub name: String,
    pub introduction_html: String,
    pub description_html: String,
    pub price: String,
    pub previous_price: String,
    pub discount_percent: String,
    pub category: String,
    pub images: Vec<ProductImage>,
    pub specifications: Vec<Specification>,
    pub weight: String,
    pub meta: FormMeta,
}

/// SEO fields as entered; any may be left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub url: String,
}

/// A validated product, not yet assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub introduction_html: String,
    pub description_html: String,
    #[serde(serialize_with = "price::number::serialize")]
    pub price: Price,
    #[serde(serialize_with = "price::number::serialize_option")]
    pub previous_price: Option<Price>,
    pub discount_percent: Option<f64>,
    pub category: Option<ProductCategory>,
    pub images: Vec<ProductImage>,
    pub specifications: Vec<Specification>,
    pub weight: Option<Weight>,
    pub meta: MetaData,
}

impl ProductForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned: introduction
    /// and description must not be blank, price must parse and be greater
    /// than zero, and every non-empty image URL must be an absolute URL.
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        if self.introduction_html.trim().is_empty() {
            return Err(ValidationError::MissingIntroduction);
        }
        if self.description_html.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }

        let price = parse_decimal(&self.price)
            .filter(|price| *price > Decimal::ZERO)
            .ok_or(ValidationError::InvalidPrice)?;

        if let Some(bad) = self
            .images
            .iter()
            .find(|image| !image.url.is_empty() && Url::parse(&image.url).is_err())
        {
            return Err(ValidationError::InvalidImageUrl(bad.url.clone()));
        }

        Ok(NewProduct {
            name: self.name.clone(),
            introduction_html: self.introduction_html.clone(),
            description_html: self.description_html.clone(),
            price: Price::new(price),
            previous_price: parse_decimal(&self.previous_price).map(Price::new),
            discount_percent: parse_f64(&self.discount_percent),
            category: ProductCategory::from_str(self.category.trim()).ok(),
            images: self.images.clone(),
            specifications: self.specifications.clone(),
            weight: parse_f64(&self.weight).map(|value| Weight {
                value,
                unit: DEFAULT_WEIGHT_UNIT.to_owned(),
            }),
            meta: MetaData {
                title: self.meta.title.clone(),
                description: self.meta.description.clone(),
                keywords: self.meta.keywords.clone(),
                url: Some(self.meta.url.trim())
                    .filter(|slug| !slug.is_empty())
                    .map(str::to_owned),
            },
        })
    }
}

/// The document written for a new product: the validated fields plus the
/// counter-assigned number and the creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    pub id: u64,
    #[serde(flatten)]
    pub product: NewProduct,
    pub created_at: DateTime<Utc>,
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s).ok()
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
