//! Regulatory tables: stamp duty tiers, ABSD and LTV matrices, servicing limits and fees

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::transaction::{LoanType, PropertyType, ResidencyStatus};

/// A band of a progressive schedule over a dollar amount
///
/// Used for Buyer's Stamp Duty (over purchase price) and property tax
/// (over annual value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueTier {
    pub min_value: f64,
    /// `None` for the open-ended top band
    pub max_value: Option<f64>,
    pub rate: f64,
    pub label: String,
}

impl ValueTier {
    pub fn new(min_value: f64, max_value: Option<f64>, rate: f64, label: &str) -> Self {
        Self {
            min_value,
            max_value,
            rate,
            label: label.to_string(),
        }
    }

    /// Width of the band, infinite for the open band
    pub fn width(&self) -> f64 {
        match self.max_value {
            Some(max) => max - self.min_value,
            None => f64::INFINITY,
        }
    }
}

pub type BsdTier = ValueTier;
pub type PropertyTaxTier = ValueTier;

/// One cell of the sparse ABSD matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsdRate {
    pub residency_status: ResidencyStatus,
    pub property_type: PropertyType,
    /// Residential properties already owned before this purchase
    pub existing_properties: u32,
    pub rate: f64,
    pub rationale: String,
}

/// Seller's Stamp Duty band over holding period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsdTier {
    pub min_months: u32,
    /// `None` for the open band
    pub max_months: Option<u32>,
    pub rate: f64,
    pub label: String,
}

impl SsdTier {
    pub fn contains(&self, months: u32) -> bool {
        months >= self.min_months && self.max_months.map_or(true, |max| months < max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsdSchedule {
    pub tiers: Vec<SsdTier>,
    pub exemption_threshold_months: u32,
}

/// One cell of the sparse LTV matrix
///
/// `loan_tenure_years` is the lower bound of the tenure band the rule covers:
/// a rule at 31 applies to tenures of 31 years and longer until a rule with a
/// higher bound takes over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LtvRule {
    pub loan_type: LoanType,
    pub property_type: PropertyType,
    pub loan_tenure_years: u32,
    pub existing_loans: u32,
    #[serde(rename = "maxLTVPct")]
    pub max_ltv_pct: f64,
    pub min_cash_down_payment_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdsrConfig {
    /// Maximum share of effective income for all debt obligations
    pub limit: f64,
    /// Haircut applied to variable income, in percent
    pub variable_income_haircut_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsrConfig {
    /// Maximum share of gross income for property loan repayments
    pub limit: f64,
    pub applicable_property_types: BTreeSet<PropertyType>,
}

impl MsrConfig {
    pub fn applies_to(&self, property_type: PropertyType) -> bool {
        self.applicable_property_types.contains(&property_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpfRates {
    pub oa_interest_rate: f64,
    pub sa_interest_rate: f64,
}

impl CpfRates {
    /// Monthly rate that compounds to the annual OA rate over 12 months
    pub fn oa_monthly_rate(&self) -> f64 {
        (1.0 + self.oa_interest_rate).powf(1.0 / 12.0) - 1.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTaxConfig {
    pub owner_occupied: Vec<PropertyTaxTier>,
    pub non_owner_occupied: Vec<PropertyTaxTier>,
    /// Annual value estimate as a fraction of price
    pub annual_value_rate: f64,
}

impl PropertyTaxConfig {
    pub fn schedule(&self, owner_occupied: bool) -> &[PropertyTaxTier] {
        if owner_occupied {
            &self.owner_occupied
        } else {
            &self.non_owner_occupied
        }
    }
}

/// Default monthly maintenance by property type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceFees {
    pub hdb: f64,
    pub executive_condo: f64,
    pub condo: f64,
    pub landed: f64,
}

impl MaintenanceFees {
    pub fn monthly_for(&self, property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::Hdb => self.hdb,
            PropertyType::ExecutiveCondo => self.executive_condo,
            PropertyType::Condo => self.condo,
            PropertyType::Landed => self.landed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscFees {
    /// Legal and conveyancing fee as a fraction of price
    pub legal_fee_rate: f64,
    /// Flat valuation fee
    pub valuation_fee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanLimits {
    pub hdb_loan_max_tenure_years: u32,
    pub bank_loan_max_tenure_years: u32,
    /// Medium-term interest rate used as a floor when sizing the maximum loan
    pub assessment_rate_floor: f64,
}

impl LoanLimits {
    pub fn max_tenure_years(&self, loan_type: LoanType) -> u32 {
        match loan_type {
            LoanType::Hdb => self.hdb_loan_max_tenure_years,
            LoanType::Bank => self.bank_loan_max_tenure_years,
        }
    }
}

// ============================================================================
// 2024 Singapore tables
// ============================================================================

pub fn default_bsd_tiers() -> Vec<BsdTier> {
    vec![
        ValueTier::new(0.0, Some(180_000.0), 0.01, "First $180,000"),
        ValueTier::new(180_000.0, Some(360_000.0), 0.02, "Next $180,000"),
        ValueTier::new(360_000.0, Some(1_000_000.0), 0.03, "Next $640,000"),
        ValueTier::new(1_000_000.0, Some(1_500_000.0), 0.04, "Next $500,000"),
        ValueTier::new(1_500_000.0, Some(3_000_000.0), 0.05, "Next $1,500,000"),
        ValueTier::new(3_000_000.0, None, 0.06, "Remaining amount"),
    ]
}

pub fn default_absd_rates() -> Vec<AbsdRate> {
    use ResidencyStatus::*;

    let schedule: [(ResidencyStatus, u32, f64, &str); 7] = [
        (SingaporeCitizen, 0, 0.00, "Singapore Citizen buying first residential property"),
        (SingaporeCitizen, 1, 0.20, "Singapore Citizen buying second residential property"),
        (SingaporeCitizen, 2, 0.30, "Singapore Citizen buying third and subsequent property"),
        (PermanentResident, 0, 0.05, "Permanent Resident buying first residential property"),
        (PermanentResident, 1, 0.30, "Permanent Resident buying second residential property"),
        (PermanentResident, 2, 0.35, "Permanent Resident buying third and subsequent property"),
        (Foreigner, 0, 0.60, "Foreigner buying any residential property"),
    ];

    PropertyType::ALL
        .iter()
        .flat_map(|&property_type| {
            schedule.iter().map(move |&(residency_status, existing_properties, rate, rationale)| AbsdRate {
                residency_status,
                property_type,
                existing_properties,
                rate,
                rationale: rationale.to_string(),
            })
        })
        .collect()
}

pub fn default_ssd_schedule() -> SsdSchedule {
    SsdSchedule {
        tiers: vec![
            SsdTier { min_months: 0, max_months: Some(12), rate: 0.12, label: "Held up to 1 year".into() },
            SsdTier { min_months: 12, max_months: Some(24), rate: 0.08, label: "Held more than 1 and up to 2 years".into() },
            SsdTier { min_months: 24, max_months: Some(36), rate: 0.04, label: "Held more than 2 and up to 3 years".into() },
        ],
        exemption_threshold_months: 36,
    }
}

pub fn default_ltv_rules() -> Vec<LtvRule> {
    // (existing loans, standard LTV, standard min cash, long-tenure LTV, long-tenure min cash)
    let bank_bands: [(u32, f64, f64, f64, f64); 3] = [
        (0, 75.0, 5.0, 55.0, 10.0),
        (1, 45.0, 25.0, 25.0, 25.0),
        (2, 35.0, 25.0, 15.0, 25.0),
    ];

    let mut rules = Vec::new();
    for property_type in PropertyType::ALL {
        let long_tenure_from = if property_type == PropertyType::Hdb { 26 } else { 31 };
        for &(existing_loans, ltv, cash, long_ltv, long_cash) in &bank_bands {
            rules.push(LtvRule {
                loan_type: LoanType::Bank,
                property_type,
                loan_tenure_years: 1,
                existing_loans,
                max_ltv_pct: ltv,
                min_cash_down_payment_pct: cash,
            });
            rules.push(LtvRule {
                loan_type: LoanType::Bank,
                property_type,
                loan_tenure_years: long_tenure_from,
                existing_loans,
                max_ltv_pct: long_ltv,
                min_cash_down_payment_pct: long_cash,
            });
        }
    }

    rules.push(LtvRule {
        loan_type: LoanType::Hdb,
        property_type: PropertyType::Hdb,
        loan_tenure_years: 1,
        existing_loans: 0,
        max_ltv_pct: 75.0,
        min_cash_down_payment_pct: 0.0,
    });

    rules
}

pub fn default_owner_occupied_tax_tiers() -> Vec<PropertyTaxTier> {
    vec![
        ValueTier::new(0.0, Some(8_000.0), 0.00, "First $8,000"),
        ValueTier::new(8_000.0, Some(30_000.0), 0.04, "Next $22,000"),
        ValueTier::new(30_000.0, Some(40_000.0), 0.05, "Next $10,000"),
        ValueTier::new(40_000.0, Some(55_000.0), 0.07, "Next $15,000"),
        ValueTier::new(55_000.0, Some(70_000.0), 0.10, "Next $15,000"),
        ValueTier::new(70_000.0, Some(85_000.0), 0.14, "Next $15,000"),
        ValueTier::new(85_000.0, Some(100_000.0), 0.18, "Next $15,000"),
        ValueTier::new(100_000.0, None, 0.23, "Above $100,000"),
    ]
}

pub fn default_non_owner_occupied_tax_tiers() -> Vec<PropertyTaxTier> {
    vec![
        ValueTier::new(0.0, Some(30_000.0), 0.12, "First $30,000"),
        ValueTier::new(30_000.0, Some(45_000.0), 0.20, "Next $15,000"),
        ValueTier::new(45_000.0, Some(60_000.0), 0.28, "Next $15,000"),
        ValueTier::new(60_000.0, None, 0.36, "Above $60,000"),
    ]
}

impl Default for TdsrConfig {
    fn default() -> Self {
        Self {
            limit: 0.55,
            variable_income_haircut_pct: 30.0,
        }
    }
}

impl Default for MsrConfig {
    fn default() -> Self {
        Self {
            limit: 0.30,
            applicable_property_types: [PropertyType::Hdb, PropertyType::ExecutiveCondo].into_iter().collect(),
        }
    }
}

impl Default for CpfRates {
    fn default() -> Self {
        Self {
            oa_interest_rate: 0.025,
            sa_interest_rate: 0.04,
        }
    }
}

impl Default for PropertyTaxConfig {
    fn default() -> Self {
        Self {
            owner_occupied: default_owner_occupied_tax_tiers(),
            non_owner_occupied: default_non_owner_occupied_tax_tiers(),
            annual_value_rate: 0.035,
        }
    }
}

impl Default for MaintenanceFees {
    fn default() -> Self {
        Self {
            hdb: 80.0,
            executive_condo: 300.0,
            condo: 400.0,
            landed: 0.0,
        }
    }
}

impl Default for MiscFees {
    fn default() -> Self {
        Self {
            legal_fee_rate: 0.003,
            valuation_fee: 500.0,
        }
    }
}

impl Default for LoanLimits {
    fn default() -> Self {
        Self {
            hdb_loan_max_tenure_years: 25,
            bank_loan_max_tenure_years: 35,
            assessment_rate_floor: 0.04,
        }
    }
}
