mod app_config;
mod config;
mod rows;
mod vendors;

pub use app_config::{AppConfig, UploadConfig};
pub use config::{
    load_app_config, load_app_config_from_env, load_upload_config, load_upload_config_from_env,
};
pub use rows::{ExclusionFilter, NormalizedRow, WeightSource, DEFAULT_EXCLUDE_TERMS};
pub use vendors::{load_vendors, PriceUnit, VendorConfig, VendorKind, VendorsFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vendors file {path}: {source}")]
    VendorsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vendors file: {0}")]
    VendorsFileParse(#[source] serde_yaml::Error),

    #[error("vendor config validation failed: {0}")]
    Validation(String),
}
