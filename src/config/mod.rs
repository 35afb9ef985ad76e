use crate::core::{AppError, BusinessCalendar, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub billing: BillingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: String,
}

/// Pricing constants shared by the draft builder and the invoice engine
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BillingConfig {
    /// Value-added tax rate applied to subtotals
    pub iva_rate: Decimal,
    /// Fixed UTC offset of the business, used to decide what "today" is
    pub utc_offset_hours: i32,
    /// Number given to the first invoice of an empty store
    pub first_invoice_number: i64,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            iva_rate: Decimal::new(19, 2),
            utc_offset_hours: -5,
            first_invoice_number: 1001,
        }
    }
}

impl BillingConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            iva_rate: match env::var("IVA_RATE") {
                Ok(raw) => Decimal::from_str(&raw)
                    .map_err(|_| AppError::Configuration("Invalid IVA_RATE".to_string()))?,
                Err(_) => defaults.iva_rate,
            },
            utc_offset_hours: match env::var("BUSINESS_UTC_OFFSET_HOURS") {
                Ok(raw) => raw.parse().map_err(|_| {
                    AppError::Configuration("Invalid BUSINESS_UTC_OFFSET_HOURS".to_string())
                })?,
                Err(_) => defaults.utc_offset_hours,
            },
            first_invoice_number: match env::var("FIRST_INVOICE_NUMBER") {
                Ok(raw) => raw.parse().map_err(|_| {
                    AppError::Configuration("Invalid FIRST_INVOICE_NUMBER".to_string())
                })?,
                Err(_) => defaults.first_invoice_number,
            },
        })
    }

    pub fn calendar(&self) -> Result<BusinessCalendar> {
        BusinessCalendar::new(self.utc_offset_hours)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iva_rate < Decimal::ZERO || self.iva_rate > Decimal::ONE {
            return Err(AppError::Configuration(
                "IVA rate must be between 0 and 1".to_string(),
            ));
        }

        if !(-14..=14).contains(&self.utc_offset_hours) {
            return Err(AppError::Configuration(
                "Business UTC offset must be within +/-14 hours".to_string(),
            ));
        }

        if self.first_invoice_number < 1 {
            return Err(AppError::Configuration(
                "First invoice number must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            billing: BillingConfig::from_env()?,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 || self.database.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database pool sizes must be greater than 0".to_string(),
            ));
        }

        if self.database.pool_size > self.database.max_connections {
            return Err(AppError::Configuration(
                "DATABASE_POOL_SIZE cannot exceed DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        self.billing.validate()
    }
}
