//! Configuration schema, defaults, and layered loading.
//!
//! Precedence: defaults < config file < environment.

use anyhow::{ensure, Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const MAX_BATCH_CEILING: usize = 100;

pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "droplink")
        .map(|p| p.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("droplink.toml"))
}

/// Fully resolved application configuration after all layers merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Base URL of the storage service.
    pub service_url: String,
    /// Origin used for the links shown to end users. Defaults to the
    /// service URL when unset.
    pub public_origin: Option<String>,
    /// Batch-size policy cap, enforced at the CLI layer.
    pub max_files: usize,
    pub request_timeout_secs: u64,
    /// Where fetched files land.
    pub save_dir: PathBuf,
    pub show_qr: bool,
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:8080".to_string(),
            public_origin: None,
            max_files: 10,
            request_timeout_secs: 300,
            save_dir: PathBuf::from("."),
            show_qr: true,
        }
    }
}

impl DropConfig {
    /// Service base URL without a trailing slash.
    pub fn service_base(&self) -> &str {
        self.service_url.trim_end_matches('/')
    }

    /// Origin for public links, without a trailing slash.
    pub fn origin(&self) -> &str {
        self.public_origin
            .as_deref()
            .unwrap_or(&self.service_url)
            .trim_end_matches('/')
    }

    /// Validates merged values and rejects unusable ones.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.service_url)
            .with_context(|| format!("Invalid config: service_url '{}'", self.service_url))?;
        if let Some(origin) = &self.public_origin {
            url::Url::parse(origin)
                .with_context(|| format!("Invalid config: public_origin '{origin}'"))?;
        }
        ensure!(self.max_files >= 1, "Invalid config: max_files must be >= 1");
        ensure!(
            self.max_files <= MAX_BATCH_CEILING,
            "Invalid config: max_files must be <= {MAX_BATCH_CEILING}"
        );
        ensure!(
            self.request_timeout_secs >= 1,
            "Invalid config: request_timeout_secs must be >= 1"
        );
        Ok(())
    }

    /// HTTP client honoring the configured request timeout.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Loads config from defaults/file/env.
pub fn load_config() -> Result<DropConfig> {
    let path = config_path();

    let config: DropConfig = Figment::new()
        .merge(Serialized::defaults(DropConfig::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DROPLINK_"))
        .extract()
        .context("Failed to load configuration")?;

    config.validate()?;

    Ok(config)
}
