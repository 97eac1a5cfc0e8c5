//! Regulatory configuration: versioned tiers, rates and limits
//!
//! A [`RegulatoryConfig`] can only be obtained through validation, so every
//! engine can trust its structure without re-checking.

mod tables;
mod validate;
pub mod loader;

pub use tables::{
    AbsdRate, BsdTier, CpfRates, LoanLimits, LtvRule, MaintenanceFees, MiscFees, MsrConfig,
    PropertyTaxConfig, PropertyTaxTier, SsdSchedule, SsdTier, TdsrConfig, ValueTier,
};
pub use validate::{validate_partition, ConfigError};
pub use loader::LoadError;

use std::ops::Deref;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unvalidated configuration as read from a file or assembled in code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulatoryConfigData {
    pub version: String,
    pub effective_date: NaiveDate,
    pub last_updated: NaiveDate,
    pub bsd_tiers: Vec<BsdTier>,
    pub absd_rates: Vec<AbsdRate>,
    /// Flat ABSD rate for entity and trust purchases
    pub absd_entity_rate: f64,
    pub ssd: SsdSchedule,
    pub ltv_rules: Vec<LtvRule>,
    pub tdsr: TdsrConfig,
    pub msr: MsrConfig,
    pub cpf: CpfRates,
    pub property_tax: PropertyTaxConfig,
    pub maintenance_fees: MaintenanceFees,
    pub fees: MiscFees,
    pub loan_limits: LoanLimits,
}

impl RegulatoryConfigData {
    /// Singapore tables in force from the April 2023 ABSD revision
    pub fn singapore_2024() -> Self {
        Self {
            version: "2024.1".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2023, 4, 27).unwrap_or_default(),
            last_updated: NaiveDate::from_ymd_opt(2024, 8, 20).unwrap_or_default(),
            bsd_tiers: tables::default_bsd_tiers(),
            absd_rates: tables::default_absd_rates(),
            absd_entity_rate: 0.65,
            ssd: tables::default_ssd_schedule(),
            ltv_rules: tables::default_ltv_rules(),
            tdsr: TdsrConfig::default(),
            msr: MsrConfig::default(),
            cpf: CpfRates::default(),
            property_tax: PropertyTaxConfig::default(),
            maintenance_fees: MaintenanceFees::default(),
            fees: MiscFees::default(),
            loan_limits: LoanLimits::default(),
        }
    }

    /// Validate and freeze
    pub fn build(self) -> Result<RegulatoryConfig, ConfigError> {
        RegulatoryConfig::new(self)
    }
}

/// Validated, immutable configuration snapshot
///
/// Dereferences to [`RegulatoryConfigData`] for read access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegulatoryConfigData", into = "RegulatoryConfigData")]
pub struct RegulatoryConfig(RegulatoryConfigData);

impl RegulatoryConfig {
    pub fn new(data: RegulatoryConfigData) -> Result<Self, ConfigError> {
        validate::validate(&data)?;
        log::debug!(
            "validated regulatory config {} (effective {})",
            data.version,
            data.effective_date
        );
        Ok(Self(data))
    }

    /// Built-in 2024 Singapore configuration
    pub fn singapore_2024() -> Self {
        // Covered by test_builtin_tables_pass_validation
        Self(RegulatoryConfigData::singapore_2024())
    }

    /// Load from the default on-disk tables (data/regulatory/)
    pub fn from_csv() -> Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_REGULATORY_PATH))
    }

    /// Load from CSV tables and parameters.json in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        loader::load_from(path)
    }

    /// Load a complete JSON snapshot
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        loader::from_json_str(json)
    }

    pub fn data(&self) -> &RegulatoryConfigData {
        &self.0
    }

    /// Unfreeze for editing; the result must be rebuilt to be used again
    pub fn into_data(self) -> RegulatoryConfigData {
        self.0
    }
}

impl Deref for RegulatoryConfig {
    type Target = RegulatoryConfigData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<RegulatoryConfigData> for RegulatoryConfig {
    type Error = ConfigError;

    fn try_from(data: RegulatoryConfigData) -> Result<Self, Self::Error> {
        Self::new(data)
    }
}

impl From<RegulatoryConfig> for RegulatoryConfigData {
    fn from(config: RegulatoryConfig) -> Self {
        config.0
    }
}

impl Default for RegulatoryConfig {
    fn default() -> Self {
        Self::singapore_2024()
    }
}
