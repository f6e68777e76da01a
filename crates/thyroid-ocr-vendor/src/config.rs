//! Vendor credentials and endpoint settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OcrError, VendorResult};

pub const SECRET_ID_VAR: &str = "TENCENT_SECRET_ID";
pub const SECRET_KEY_VAR: &str = "TENCENT_SECRET_KEY";
pub const REGION_VAR: &str = "TENCENT_OCR_REGION";

pub const DEFAULT_HOST: &str = "ocr.tencentcloudapi.com";
pub const DEFAULT_ACTION: &str = "GeneralAccurateOCR";
pub const DEFAULT_VERSION: &str = "2018-11-19";
pub const DEFAULT_REGION: &str = "ap-guangzhou";

/// Credentials and endpoint for the general-accurate OCR action.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorConfig {
    pub secret_id: String,
    pub secret_key: String,
    pub host: String,
    pub action: String,
    pub version: String,
    pub region: String,
}

impl VendorConfig {
    /// Build a config from explicit credentials with the default endpoint.
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            host: DEFAULT_HOST.to_string(),
            action: DEFAULT_ACTION.to_string(),
            version: DEFAULT_VERSION.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> VendorResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`. Missing or blank credentials are a
    /// configuration error.
    pub fn from_lookup<F>(lookup: F) -> VendorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> VendorResult<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| OcrError::Configuration(format!("{} is not set", name)))
        };

        let mut config = Self::new(required(SECRET_ID_VAR)?, required(SECRET_KEY_VAR)?);
        if let Some(region) = lookup(REGION_VAR).filter(|r| !r.trim().is_empty()) {
            config.region = region.trim().to_string();
        }
        Ok(config)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

// The secret key never reaches logs
impl fmt::Debug for VendorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VendorConfig")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("action", &self.action)
            .field("version", &self.version)
            .field("region", &self.region)
            .finish()
    }
}
