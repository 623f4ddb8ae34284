//! Layered settings: serde defaults, then an optional TOML file, then
//! environment variables with the `INVOICER_` prefix.

use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub business: BusinessSettings,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Business identity shown in the invoice header.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessSettings {
    #[serde(default = "default_business_name")]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    /// Logo rendered in the invoice header. A missing file leaves an
    /// equivalent blank space instead of failing.
    #[serde(default = "default_logo_path")]
    pub logo_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BillingSettings {
    /// Hourly rate applied to labor lines when none is given.
    #[serde(default = "default_hourly_rate")]
    pub default_hourly_rate: f64,
    /// Fractional tax rate applied when none is given, e.g. 0.1025.
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Directory rendered PDFs are written into, created on demand.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_business_name() -> String {
    "My Business".to_string()
}

fn default_logo_path() -> PathBuf {
    PathBuf::from("assets/logo.png")
}

fn default_hourly_rate() -> f64 {
    85.0
}

fn default_tax_rate() -> f64 {
    0.1025
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/invoicer.db")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("invoices")
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            log_level: default_log_level(),
            business: BusinessSettings::default(),
            billing: BillingSettings::default(),
            storage: StorageSettings::default(),
        }
    }
}

impl Default for BusinessSettings {
    fn default() -> Self {
        BusinessSettings {
            name: default_business_name(),
            phone: String::new(),
            email: String::new(),
            address_lines: Vec::new(),
            logo_path: default_logo_path(),
        }
    }
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            default_hourly_rate: default_hourly_rate(),
            default_tax_rate: default_tax_rate(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            db_path: default_db_path(),
            output_dir: default_output_dir(),
        }
    }
}

/// Load settings from `config_path` (if it exists) and the environment.
///
/// Environment variables use the `INVOICER_` prefix with `__` between
/// section and key, e.g. `INVOICER_BUSINESS__NAME` or
/// `INVOICER_STORAGE__DB_PATH`. `INVOICER_BUSINESS__ADDRESS_LINES` is
/// comma separated; commas in every other value pass through verbatim.
pub fn get_configuration(config_path: &Path) -> Result<Settings, AppError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(config_path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix("INVOICER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("business.address_lines"),
        )
        .build()?;

    let settings: Settings = settings.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

impl Settings {
    fn validate(&self) -> Result<(), AppError> {
        if self.billing.default_hourly_rate < 0.0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "billing.default_hourly_rate must not be negative"
            )));
        }

        if !(0.0..1.0).contains(&self.billing.default_tax_rate) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "billing.default_tax_rate must be a fraction in [0, 1), e.g. 0.1025"
            )));
        }

        if self.storage.db_path.as_os_str().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "storage.db_path must not be empty"
            )));
        }

        if self.storage.output_dir.as_os_str().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "storage.output_dir must not be empty"
            )));
        }

        Ok(())
    }
}
