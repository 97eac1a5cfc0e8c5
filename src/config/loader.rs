//! File-based configuration loader
//!
//! Loads regulatory tables from CSV files and scalar parameters from
//! parameters.json in data/regulatory/, or a complete JSON snapshot.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use super::tables::{
    AbsdRate, BsdTier, CpfRates, LoanLimits, LtvRule, MaintenanceFees, MiscFees, MsrConfig,
    PropertyTaxConfig, PropertyTaxTier, SsdSchedule, SsdTier, TdsrConfig,
};
use super::{ConfigError, RegulatoryConfig, RegulatoryConfigData};

/// Default path to the regulatory tables directory
pub const DEFAULT_REGULATORY_PATH: &str = "data/regulatory";

pub const BSD_TIERS_FILE: &str = "bsd_tiers.csv";
pub const ABSD_RATES_FILE: &str = "absd_rates.csv";
pub const SSD_TIERS_FILE: &str = "ssd_tiers.csv";
pub const LTV_RULES_FILE: &str = "ltv_rules.csv";
pub const OWNER_OCCUPIED_TAX_FILE: &str = "property_tax_owner_occupied.csv";
pub const NON_OWNER_OCCUPIED_TAX_FILE: &str = "property_tax_non_owner_occupied.csv";
pub const PARAMETERS_FILE: &str = "parameters.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid regulatory config: {0}")]
    Invalid(#[from] ConfigError),
}

/// Scalar sections stored alongside the CSV tables
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub version: String,
    pub effective_date: NaiveDate,
    pub last_updated: NaiveDate,
    pub absd_entity_rate: f64,
    pub ssd_exemption_threshold_months: u32,
    pub tdsr: TdsrConfig,
    pub msr: MsrConfig,
    pub cpf: CpfRates,
    pub annual_value_rate: f64,
    pub maintenance_fees: MaintenanceFees,
    pub fees: MiscFees,
    pub loan_limits: LoanLimits,
}

/// Deserialize every row of a CSV table
pub fn load_table<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<Vec<T>, LoadError> {
    let path = dir.join(file_name);
    let file = File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })?;
        rows.push(row);
    }

    log::debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_parameters(dir: &Path) -> Result<Parameters, LoadError> {
    let path = dir.join(PARAMETERS_FILE);
    let file = File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(serde_json::from_reader(file)?)
}

/// Read all tables without validating them
pub fn load_data(dir: &Path) -> Result<RegulatoryConfigData, LoadError> {
    let parameters = load_parameters(dir)?;
    let bsd_tiers: Vec<BsdTier> = load_table(dir, BSD_TIERS_FILE)?;
    let absd_rates: Vec<AbsdRate> = load_table(dir, ABSD_RATES_FILE)?;
    let ssd_tiers: Vec<SsdTier> = load_table(dir, SSD_TIERS_FILE)?;
    let ltv_rules: Vec<LtvRule> = load_table(dir, LTV_RULES_FILE)?;
    let owner_occupied: Vec<PropertyTaxTier> = load_table(dir, OWNER_OCCUPIED_TAX_FILE)?;
    let non_owner_occupied: Vec<PropertyTaxTier> = load_table(dir, NON_OWNER_OCCUPIED_TAX_FILE)?;

    Ok(RegulatoryConfigData {
        version: parameters.version,
        effective_date: parameters.effective_date,
        last_updated: parameters.last_updated,
        bsd_tiers,
        absd_rates,
        absd_entity_rate: parameters.absd_entity_rate,
        ssd: SsdSchedule {
            tiers: ssd_tiers,
            exemption_threshold_months: parameters.ssd_exemption_threshold_months,
        },
        ltv_rules,
        tdsr: parameters.tdsr,
        msr: parameters.msr,
        cpf: parameters.cpf,
        property_tax: PropertyTaxConfig {
            owner_occupied,
            non_owner_occupied,
            annual_value_rate: parameters.annual_value_rate,
        },
        maintenance_fees: parameters.maintenance_fees,
        fees: parameters.fees,
        loan_limits: parameters.loan_limits,
    })
}

/// Load and validate a configuration directory
pub fn load_from(dir: &Path) -> Result<RegulatoryConfig, LoadError> {
    let config = RegulatoryConfig::new(load_data(dir)?)?;
    log::info!(
        "loaded regulatory config {} from {} (effective {}, updated {})",
        config.version,
        dir.display(),
        config.effective_date,
        config.last_updated
    );
    Ok(config)
}

/// Load and validate a complete JSON snapshot
pub fn from_json_str(json: &str) -> Result<RegulatoryConfig, LoadError> {
    let data: RegulatoryConfigData = serde_json::from_str(json)?;
    Ok(RegulatoryConfig::new(data)?)
}

/// Load and validate a JSON snapshot file
pub fn from_json_file(path: &Path) -> Result<RegulatoryConfig, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json_str(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_dir() -> &'static Path {
        Path::new(DEFAULT_REGULATORY_PATH)
    }

    #[test]
    fn test_load_default_tables() {
        let result = load_from(default_dir());
        assert!(result.is_ok(), "Failed to load regulatory tables: {:?}", result.err());

        let config = result.unwrap();
        assert_eq!(config.version, "2024.1");
        assert_eq!(config.bsd_tiers.len(), 6);
        assert!(config.bsd_tiers.last().unwrap().max_value.is_none());
        assert_eq!(config.absd_rates.len(), 28);
        assert_eq!(config.ssd.exemption_threshold_months, 36);
        assert!(!config.ltv_rules.is_empty());
    }

    #[test]
    fn test_on_disk_tables_match_builtin_snapshot() {
        let loaded = load_from(default_dir()).unwrap();
        let builtin = RegulatoryConfig::singapore_2024();

        assert_eq!(loaded.bsd_tiers, builtin.bsd_tiers);
        assert_eq!(loaded.absd_rates, builtin.absd_rates);
        assert_eq!(loaded.ssd, builtin.ssd);
        assert_eq!(loaded.ltv_rules, builtin.ltv_rules);
        assert_eq!(loaded.property_tax, builtin.property_tax);
        assert_eq!(loaded.tdsr, builtin.tdsr);
        assert_eq!(loaded.msr, builtin.msr);
        assert_eq!(loaded.loan_limits, builtin.loan_limits);
    }

    #[test]
    fn test_missing_directory_reports_path() {
        let err = load_from(Path::new("does/not/exist")).unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert!(path.ends_with(PARAMETERS_FILE)),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_snapshot_round_trip() {
        let json = serde_json::to_string(&RegulatoryConfig::singapore_2024()).unwrap();
        let config = from_json_str(&json).unwrap();
        assert_eq!(config, RegulatoryConfig::singapore_2024());
    }

    #[test]
    fn test_json_snapshot_is_validated() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.ssd.tiers.remove(1);
        let json = serde_json::to_string(&data).unwrap();

        // The snapshot deserializes as plain data, then fails validation
        let err = from_json_str(&json).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::TierDiscontinuity { .. })));
    }
}
