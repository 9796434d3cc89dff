//! Raw product shapes handed from vendor adapters to the normalizer, and the
//! Shopify `/products/{handle}.js` payload they are most often built from.
//!
//! ## Observed `.js` shape (worldspice.com, thespicehouse.com)
//!
//! - `price` is an integer number of **cents** (`549` for $5.49). Some themes
//!   proxy the endpoint and return a decimal string instead; both are accepted.
//! - `grams` is usually present but often `0` when the merchant never entered
//!   a shipping weight. Zero is treated as absent downstream.
//! - `weight` / `weight_unit` appear only on some stores.
//! - `available` may be missing on older themes; the normalizer defaults to
//!   in stock.
//!
//! Every field except the product title is optional here so a malformed
//! variant degrades to absent values instead of failing the product.

use serde::{Deserialize, Deserializer};

use crate::resolve::PageWeightSet;

/// One purchasable option as reported by a vendor, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVariant {
    /// Display title, e.g. `"Small / Ground"` or `"4 oz"`.
    pub title: String,
    pub grams: Option<f64>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    /// Price in the vendor's unit (see [`spicedb_core::PriceUnit`]).
    pub price: Option<f64>,
    /// `None` when the vendor does not report stock.
    pub available: Option<bool>,
}

impl RawVariant {
    /// A variant that only has a title; handy for HTML-only vendors.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A product and its variants as fetched by a vendor adapter.
#[derive(Debug, Clone, Default)]
pub struct RawProduct {
    pub name: String,
    pub url: String,
    pub variants: Vec<RawVariant>,
    /// Gram annotations scraped from the product page, if it was fetched.
    pub page_weights: Option<PageWeightSet>,
}

/// Response body of `GET /products/{handle}.js`.
#[derive(Debug, Deserialize)]
pub struct ShopifyProductJs {
    pub title: String,
    #[serde(default)]
    pub variants: Vec<ShopifyVariantJs>,
}

#[derive(Debug, Deserialize)]
pub struct ShopifyVariantJs {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub grams: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl From<ShopifyVariantJs> for RawVariant {
    fn from(v: ShopifyVariantJs) -> Self {
        Self {
            title: v.title,
            grams: v.grams,
            weight: v.weight,
            weight_unit: v.weight_unit.filter(|u| !u.is_empty()),
            price: v.price,
            available: v.available,
        }
    }
}

/// Accepts a finite JSON number, a numeric string, or null. Anything else,
/// including `"NaN"` and `"inf"`, is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}
