use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rows::ExclusionFilter;
use crate::ConfigError;

/// Storefront layout a vendor adapter knows how to walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorKind {
    /// Shopify collection pages plus the `{product}.js` variant JSON.
    Shopify,
    /// Alphabetical `?letter=X` index pages with HTML option lists.
    Penzeys,
}

impl std::fmt::Display for VendorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VendorKind::Shopify => write!(f, "shopify"),
            VendorKind::Penzeys => write!(f, "penzeys"),
        }
    }
}

/// Unit of the raw price a vendor reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceUnit {
    Cents,
    Dollars,
}

impl PriceUnit {
    /// Converts a raw vendor price to US dollars.
    #[must_use]
    pub fn to_usd(self, raw: f64) -> f64 {
        match self {
            PriceUnit::Cents => raw / 100.0,
            PriceUnit::Dollars => raw,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    pub name: String,
    pub kind: VendorKind,
    /// Storefront root, e.g. `"https://worldspice.com"`.
    pub base_url: String,
    /// Collection listing path for Shopify vendors; `/collections/all` when unset.
    #[serde(default)]
    pub collection_path: Option<String>,
    pub price_unit: PriceUnit,
    /// Fetch each product page to harvest `(NNg)` weight annotations.
    #[serde(default)]
    pub page_weights: bool,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl VendorConfig {
    /// Generate a URL-safe slug from the vendor name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    #[must_use]
    pub fn collection_path(&self) -> &str {
        self.collection_path.as_deref().unwrap_or("/collections/all")
    }

    /// `base_url` without a trailing slash.
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorsFile {
    pub vendors: Vec<VendorConfig>,
    /// Overrides [`crate::DEFAULT_EXCLUDE_TERMS`] when present.
    #[serde(default)]
    pub exclude_terms: Option<Vec<String>>,
}

impl VendorsFile {
    #[must_use]
    pub fn exclusion_filter(&self) -> ExclusionFilter {
        match &self.exclude_terms {
            Some(terms) => ExclusionFilter::new(terms),
            None => ExclusionFilter::default(),
        }
    }

    /// Enabled vendors in file order.
    pub fn enabled(&self) -> impl Iterator<Item = &VendorConfig> {
        self.vendors.iter().filter(|v| v.enabled)
    }
}

/// Load and validate the vendor registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VendorsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_vendors(&content)
}

fn parse_vendors(content: &str) -> Result<VendorsFile, ConfigError> {
    let vendors_file: VendorsFile =
        serde_yaml::from_str(content).map_err(ConfigError::VendorsFileParse)?;

    validate_vendors(&vendors_file)?;

    Ok(vendors_file)
}

fn validate_vendors(vendors_file: &VendorsFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for vendor in &vendors_file.vendors {
        if vendor.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "vendor name must be non-empty".to_string(),
            ));
        }

        if !(vendor.base_url.starts_with("https://") || vendor.base_url.starts_with("http://")) {
            return Err(ConfigError::Validation(format!(
                "vendor '{}' has base_url '{}'; expected an http(s) URL",
                vendor.name, vendor.base_url
            )));
        }

        if let Some(path) = &vendor.collection_path {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "vendor '{}' collection_path must start with '/'",
                    vendor.name
                )));
            }
        }

        let slug = vendor.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor slug: '{}' (from vendor '{}')",
                slug, vendor.name
            )));
        }
    }

    Ok(())
}
