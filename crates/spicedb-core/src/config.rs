use crate::app_config::{AppConfig, UploadConfig};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load the object-storage upload settings.
///
/// `default_object_name` is used when `S3_OBJECT_NAME` is unset or empty,
/// normally the file name of the local CSV.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] naming the first required `S3_*`
/// variable that is absent or empty.
pub fn load_upload_config(default_object_name: &str) -> Result<UploadConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_upload_config_from_env(default_object_name)
}

/// Same as [`load_upload_config`] without touching `.env` files.
///
/// # Errors
///
/// Returns [`ConfigError::MissingEnvVar`] when a required variable is missing.
pub fn load_upload_config_from_env(
    default_object_name: &str,
) -> Result<UploadConfig, ConfigError> {
    build_upload_config(|key| std::env::var(key), default_object_name)
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("SPICEDB_LOG_LEVEL", "info");
    let vendors_path = PathBuf::from(or_default(
        "SPICEDB_VENDORS_PATH",
        "./config/vendors.yaml",
    ));

    let scraper_request_timeout_secs = parse_u64("SPICEDB_SCRAPER_REQUEST_TIMEOUT_SECS", "20")?;
    let scraper_user_agent = or_default("SPICEDB_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_max_retries = parse_u32("SPICEDB_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("SPICEDB_SCRAPER_RETRY_BACKOFF_BASE_SECS", "5")?;
    let scraper_max_jitter_ms = parse_u64("SPICEDB_SCRAPER_MAX_JITTER_MS", "1000")?;

    Ok(AppConfig {
        log_level,
        vendors_path,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_max_jitter_ms,
    })
}

fn build_upload_config<F>(lookup: F, default_object_name: &str) -> Result<UploadConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    // An empty value counts as missing: an upload with a blank bucket or
    // credential can only fail halfway through.
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let endpoint_raw = require("S3_ENDPOINT")?;
    let access_key = require("S3_ACCESS_KEY")?;
    let secret_key = require("S3_SECRET_KEY")?;
    let bucket = require("S3_BUCKET")?;

    let object_name = lookup("S3_OBJECT_NAME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default_object_name.to_string());
    let secure = lookup("S3_SECURE").map_or(true, |v| !v.eq_ignore_ascii_case("false"));
    let region = lookup("S3_REGION")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "us-east-1".to_string());

    Ok(UploadConfig {
        endpoint: strip_scheme(&endpoint_raw),
        access_key,
        secret_key,
        bucket,
        object_name,
        secure,
        region,
    })
}

/// Removes an `http://` / `https://` prefix and any trailing slash; the
/// scheme is decided by `S3_SECURE` instead.
fn strip_scheme(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    let without = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    /// Returns a map with every required `S3_*` variable populated.
    fn full_s3_env<'a>() -> HashMap<&'a str, &'a str> {
        let mut m = HashMap::new();
        m.insert("S3_ENDPOINT", "https://minio.example.local:9000");
        m.insert("S3_ACCESS_KEY", "minioadmin");
        m.insert("S3_SECRET_KEY", "miniosecret");
        m.insert("S3_BUCKET", "spice-data");
        m
    }

    #[test]
    fn build_app_config_uses_defaults_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.vendors_path.to_str(), Some("./config/vendors.yaml"));
        assert_eq!(cfg.scraper_request_timeout_secs, 20);
        assert!(cfg.scraper_user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(cfg.scraper_max_retries, 2);
        assert_eq!(cfg.scraper_retry_backoff_base_secs, 5);
        assert_eq!(cfg.scraper_max_jitter_ms, 1000);
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("SPICEDB_LOG_LEVEL", "debug");
        map.insert("SPICEDB_VENDORS_PATH", "/etc/spicedb/vendors.yaml");
        map.insert("SPICEDB_SCRAPER_REQUEST_TIMEOUT_SECS", "45");
        map.insert("SPICEDB_SCRAPER_USER_AGENT", "custom-agent/2.0");
        map.insert("SPICEDB_SCRAPER_MAX_RETRIES", "0");
        map.insert("SPICEDB_SCRAPER_MAX_JITTER_MS", "0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(
            cfg.vendors_path.to_str(),
            Some("/etc/spicedb/vendors.yaml")
        );
        assert_eq!(cfg.scraper_request_timeout_secs, 45);
        assert_eq!(cfg.scraper_user_agent, "custom-agent/2.0");
        assert_eq!(cfg.scraper_max_retries, 0);
        assert_eq!(cfg.scraper_max_jitter_ms, 0);
    }

    #[test]
    fn build_app_config_rejects_invalid_timeout() {
        let mut map = HashMap::new();
        map.insert("SPICEDB_SCRAPER_REQUEST_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SPICEDB_SCRAPER_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(SPICEDB_SCRAPER_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_negative_retries() {
        let mut map = HashMap::new();
        map.insert("SPICEDB_SCRAPER_MAX_RETRIES", "-1");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SPICEDB_SCRAPER_MAX_RETRIES")
        );
    }

    #[test]
    fn build_upload_config_succeeds_with_required_vars() {
        let map = full_s3_env();
        let cfg = build_upload_config(lookup_from_map(&map), "spices.csv").unwrap();
        assert_eq!(cfg.endpoint, "minio.example.local:9000");
        assert_eq!(cfg.bucket, "spice-data");
        assert_eq!(cfg.object_name, "spices.csv");
        assert!(cfg.secure);
        assert_eq!(cfg.region, "us-east-1");
        assert_eq!(cfg.base_url(), "https://minio.example.local:9000");
    }

    #[test]
    fn build_upload_config_reports_each_missing_var() {
        for missing in ["S3_ENDPOINT", "S3_ACCESS_KEY", "S3_SECRET_KEY", "S3_BUCKET"] {
            let mut map = full_s3_env();
            map.remove(missing);
            let result = build_upload_config(lookup_from_map(&map), "out.csv");
            assert!(
                matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == missing),
                "expected MissingEnvVar({missing}), got: {result:?}"
            );
        }
    }

    #[test]
    fn build_upload_config_treats_empty_value_as_missing() {
        let mut map = full_s3_env();
        map.insert("S3_BUCKET", "");
        let result = build_upload_config(lookup_from_map(&map), "out.csv");
        assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "S3_BUCKET"));
    }

    #[test]
    fn build_upload_config_secure_false_switches_to_http() {
        let mut map = full_s3_env();
        map.insert("S3_SECURE", "FALSE");
        map.insert("S3_ENDPOINT", "http://localhost:9000/");
        let cfg = build_upload_config(lookup_from_map(&map), "out.csv").unwrap();
        assert!(!cfg.secure);
        assert_eq!(cfg.base_url(), "http://localhost:9000");
    }

    #[test]
    fn build_upload_config_any_other_secure_value_keeps_tls() {
        let mut map = full_s3_env();
        map.insert("S3_SECURE", "no");
        let cfg = build_upload_config(lookup_from_map(&map), "out.csv").unwrap();
        assert!(cfg.secure);
    }

    #[test]
    fn build_upload_config_object_name_override() {
        let mut map = full_s3_env();
        map.insert("S3_OBJECT_NAME", "exports/2026/spices.csv");
        map.insert("S3_REGION", "eu-west-1");
        let cfg = build_upload_config(lookup_from_map(&map), "out.csv").unwrap();
        assert_eq!(cfg.object_name, "exports/2026/spices.csv");
        assert_eq!(cfg.region, "eu-west-1");
    }

    #[test]
    fn upload_config_debug_redacts_credentials() {
        let map = full_s3_env();
        let cfg = build_upload_config(lookup_from_map(&map), "out.csv").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("minioadmin"));
        assert!(!rendered.contains("miniosecret"));
        assert!(rendered.contains("[redacted]"));
    }
}
