pub mod classify;
pub mod client;
pub mod error;
pub mod html;
pub mod pagination;
mod rate_limit;
pub mod record;
pub mod resolve;
pub mod types;
pub mod vendors;
pub mod weight;

pub use classify::{ClassifiedVariant, FormVocabulary, TokenClassifier};
pub use client::PoliteClient;
pub use error::ScraperError;
pub use record::VariantNormalizer;
pub use resolve::{resolve_weight, LabelWeightMap, PageWeightSet, ResolvedWeight};
pub use types::{RawProduct, RawVariant};
pub use vendors::scrape_vendor;
pub use weight::{UnitTable, WeightParser};
