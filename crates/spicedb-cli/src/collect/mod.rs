//! `spicedb collect` and `spicedb vendors`.
//!
//! A collect run loads the vendor registry, scrapes each selected vendor in
//! turn, drops excluded products, writes one CSV, and optionally pushes it to
//! an S3-compatible bucket. Per-vendor failures are logged and skipped so one
//! broken storefront does not abort the run.

mod runner;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, ValueEnum};
use spicedb_core::{AppConfig, UploadConfig, VendorConfig, VendorsFile};
use spicedb_scraper::{PoliteClient, VariantNormalizer};

use crate::{export, upload};

use runner::collect_all;

/// Where the exported CSV ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutType {
    /// Local file only
    Local,
    /// Local file, then uploaded to S3
    S3,
}

#[derive(Debug, Args)]
pub struct CollectArgs {
    /// Minimum seconds to wait before each request (random jitter is added)
    #[arg(long, env = "DELAY", default_value_t = 2.0)]
    pub delay: f64,

    /// Products to visit per vendor; 0 visits every product
    #[arg(long, env = "LIMIT", default_value_t = 3)]
    pub limit: usize,

    /// CSV output path
    #[arg(long, env = "OUT", default_value = "all_vendors_spices.csv")]
    pub out: PathBuf,

    /// Keep the CSV locally or also upload it
    #[arg(long, env = "OUT_TYPE", value_enum, default_value_t = OutType::Local)]
    pub out_type: OutType,

    /// Restrict collection to one vendor (by slug)
    #[arg(long)]
    pub vendor: Option<String>,
}

impl CollectArgs {
    /// Per-vendor product cap; `None` when `--limit 0`.
    pub(crate) fn product_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }

    /// Minimum per-request delay.
    ///
    /// # Errors
    ///
    /// Fails on a negative or non-finite `--delay`.
    pub(crate) fn min_delay(&self) -> anyhow::Result<Duration> {
        Duration::try_from_secs_f64(self.delay)
            .map_err(|e| anyhow::anyhow!("invalid --delay {}: {e}", self.delay))
    }
}

/// Picks the vendors for a run.
///
/// With `filter`, exactly the vendor with that slug is returned (even when
/// disabled); an unknown slug is an error. Without it, every enabled vendor.
pub(crate) fn select_vendors<'a>(
    file: &'a VendorsFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'a VendorConfig>> {
    let Some(slug) = filter else {
        return Ok(file.enabled().collect());
    };

    let vendor = file
        .vendors
        .iter()
        .find(|v| v.slug() == slug)
        .ok_or_else(|| anyhow::anyhow!("vendor '{slug}' not found in registry"))?;
    if !vendor.enabled {
        tracing::warn!(vendor = %slug, "vendor is disabled in the registry; running it anyway");
    }
    Ok(vec![vendor])
}

/// Object name used when `S3_OBJECT_NAME` is unset: the output file's name.
fn default_object_name(out: &Path) -> String {
    out.file_name().map_or_else(
        || out.to_string_lossy().into_owned(),
        |n| n.to_string_lossy().into_owned(),
    )
}

/// Runs a full collection and export.
///
/// # Errors
///
/// Returns an error for invalid arguments, missing upload credentials
/// (checked before any request is made), an unreadable vendor registry, a
/// failed CSV write, or a failed upload. Vendor scrape failures are not
/// errors.
pub(crate) async fn run_collect(config: &AppConfig, args: &CollectArgs) -> anyhow::Result<()> {
    let min_delay = args.min_delay()?;

    let upload_config: Option<UploadConfig> = match args.out_type {
        OutType::Local => None,
        OutType::S3 => Some(spicedb_core::load_upload_config(&default_object_name(
            &args.out,
        ))?),
    };

    let registry = spicedb_core::load_vendors(&config.vendors_path)?;
    let vendors = select_vendors(&registry, args.vendor.as_deref())?;
    if vendors.is_empty() {
        println!("no enabled vendors in {}; nothing to collect", config.vendors_path.display());
        return Ok(());
    }

    let client = PoliteClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?
        .with_pacing(
            min_delay,
            Duration::from_millis(config.scraper_max_jitter_ms),
        );
    let normalizer = VariantNormalizer::default();

    let summary = collect_all(&client, &normalizer, &vendors, args.product_limit()).await;
    for (vendor, count) in &summary.per_vendor {
        println!("{vendor}: collected {count} variant rows");
    }

    let filter = registry.exclusion_filter();
    let before = summary.rows.len();
    let rows = filter.apply(summary.rows);
    tracing::info!(
        kept = rows.len(),
        excluded = before - rows.len(),
        "applied exclusion filter"
    );

    export::write_csv(&args.out, &rows)?;
    println!("saved {} rows to {}", rows.len(), args.out.display());

    if !summary.failed.is_empty() {
        tracing::warn!(failed = ?summary.failed, "some vendors contributed no rows");
    }

    if let Some(upload_config) = upload_config {
        let uploader = upload::S3Uploader::new(upload_config)?;
        uploader.upload_file(&args.out).await?;
        println!(
            "uploaded {} to {}",
            args.out.display(),
            uploader.object_location()
        );
    }

    Ok(())
}

/// Prints the vendor registry, one vendor per line.
///
/// # Errors
///
/// Returns an error when the registry cannot be read or fails validation.
pub(crate) fn list_vendors(config: &AppConfig) -> anyhow::Result<()> {
    let registry = spicedb_core::load_vendors(&config.vendors_path)?;
    for vendor in &registry.vendors {
        let status = if vendor.enabled { "" } else { " (disabled)" };
        println!(
            "{:<20} {:<8} {}{status}",
            vendor.slug(),
            vendor.kind.to_string(),
            vendor.base_url
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
