use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub vendors_path: PathBuf,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    /// Upper bound of the random delay added on top of the per-request
    /// minimum delay.
    pub scraper_max_jitter_ms: u64,
}

/// Settings for pushing the exported CSV to an S3-compatible bucket.
#[derive(Clone)]
pub struct UploadConfig {
    /// Host (and optional port) of the storage service, scheme stripped.
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub object_name: String,
    /// `false` only when `S3_SECURE` is literally `"false"` (any case).
    pub secure: bool,
    pub region: String,
}

impl UploadConfig {
    /// Base URL of the storage service, e.g. `"https://minio.local:9000"`.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}", self.endpoint)
    }
}

impl std::fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadConfig")
            .field("endpoint", &self.endpoint)
            .field("access_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("object_name", &self.object_name)
            .field("secure", &self.secure)
            .field("region", &self.region)
            .finish()
    }
}
