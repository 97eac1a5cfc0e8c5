//! Structural validation of regulatory tables
//!
//! Run once when a configuration is constructed. Calculations assume a
//! validated configuration and never re-check structure.

use std::collections::HashSet;

use thiserror::Error;

use super::tables::{AbsdRate, LtvRule, SsdSchedule, ValueTier};
use super::RegulatoryConfigData;
use crate::transaction::ResidencyStatus;

/// Tolerance when comparing tier boundaries
const BOUNDARY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config version must not be empty")]
    MissingVersion,

    #[error("{section}: table is empty")]
    EmptyTable { section: &'static str },

    #[error("{section}: first tier must start at 0, found {found}")]
    FirstTierNotZero { section: &'static str, found: f64 },

    #[error("{section}: tier {index} ('{label}') has upper bound {max} not above lower bound {min}")]
    InvertedTier {
        section: &'static str,
        index: usize,
        label: String,
        min: f64,
        max: f64,
    },

    #[error("{section}: gap or overlap between tier {index} ending at {end} and the next tier starting at {next_start}")]
    TierDiscontinuity {
        section: &'static str,
        index: usize,
        end: f64,
        next_start: f64,
    },

    #[error("{section}: only the last tier may be open-ended (tier {index} has no upper bound)")]
    OpenTierNotLast { section: &'static str, index: usize },

    #[error("{section}: last tier must be open-ended")]
    LastTierBounded { section: &'static str },

    #[error("{section}: {field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        section: &'static str,
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("absdRates: duplicate entry for {residency:?} / {property_type} / {existing_properties} existing")]
    DuplicateAbsdEntry {
        residency: ResidencyStatus,
        property_type: &'static str,
        existing_properties: u32,
    },

    #[error("absdRates: no entry for residency {0:?}")]
    MissingResidency(ResidencyStatus),

    #[error("absdRates: entity purchases use absdEntityRate and must not appear in the table")]
    EntityInTable,

    #[error("ssd: tiers cover holding periods only up to {covered} months but exemption starts at {threshold}")]
    SsdCoverageGap { covered: u32, threshold: u32 },

    #[error("ltvRules: minimum cash {min_cash_pct}% exceeds the down payment {down_payment_pct}% for {property_type} rule")]
    CashExceedsDownPayment {
        property_type: &'static str,
        min_cash_pct: f64,
        down_payment_pct: f64,
    },
}

pub fn validate(data: &RegulatoryConfigData) -> Result<(), ConfigError> {
    if data.version.trim().is_empty() {
        return Err(ConfigError::MissingVersion);
    }

    validate_partition("bsdTiers", &data.bsd_tiers)?;
    validate_absd(&data.absd_rates)?;
    check_range("absdEntityRate", "rate", data.absd_entity_rate, 0.0, 1.0)?;
    validate_ssd(&data.ssd)?;
    validate_ltv(&data.ltv_rules)?;

    check_range("tdsr", "limit", data.tdsr.limit, BOUNDARY_EPSILON, 1.0)?;
    check_range("tdsr", "variableIncomeHaircutPct", data.tdsr.variable_income_haircut_pct, 0.0, 100.0)?;
    check_range("msr", "limit", data.msr.limit, BOUNDARY_EPSILON, 1.0)?;

    check_range("cpf", "oaInterestRate", data.cpf.oa_interest_rate, 0.0, 1.0)?;
    check_range("cpf", "saInterestRate", data.cpf.sa_interest_rate, 0.0, 1.0)?;

    validate_partition("propertyTax.ownerOccupied", &data.property_tax.owner_occupied)?;
    validate_partition("propertyTax.nonOwnerOccupied", &data.property_tax.non_owner_occupied)?;
    check_range("propertyTax", "annualValueRate", data.property_tax.annual_value_rate, 0.0, 1.0)?;

    let fees = &data.maintenance_fees;
    for (field, value) in [
        ("hdb", fees.hdb),
        ("executiveCondo", fees.executive_condo),
        ("condo", fees.condo),
        ("landed", fees.landed),
    ] {
        check_range("maintenanceFees", field, value, 0.0, f64::MAX)?;
    }

    check_range("fees", "legalFeeRate", data.fees.legal_fee_rate, 0.0, 1.0)?;
    check_range("fees", "valuationFee", data.fees.valuation_fee, 0.0, f64::MAX)?;

    let limits = &data.loan_limits;
    check_range("loanLimits", "hdbLoanMaxTenureYears", limits.hdb_loan_max_tenure_years as f64, 1.0, 100.0)?;
    check_range("loanLimits", "bankLoanMaxTenureYears", limits.bank_loan_max_tenure_years as f64, 1.0, 100.0)?;
    check_range("loanLimits", "assessmentRateFloor", limits.assessment_rate_floor, 0.0, 1.0)?;

    Ok(())
}

/// Tiers must partition `[0, ∞)`: start at zero, be contiguous, and end open.
pub fn validate_partition(section: &'static str, tiers: &[ValueTier]) -> Result<(), ConfigError> {
    let first = tiers.first().ok_or(ConfigError::EmptyTable { section })?;
    if first.min_value.abs() > BOUNDARY_EPSILON {
        return Err(ConfigError::FirstTierNotZero {
            section,
            found: first.min_value,
        });
    }

    let last_index = tiers.len() - 1;
    for (index, tier) in tiers.iter().enumerate() {
        check_range(section, format!("tiers[{}].rate", index), tier.rate, 0.0, 1.0)?;

        match tier.max_value {
            None if index != last_index => {
                return Err(ConfigError::OpenTierNotLast { section, index });
            }
            None => {}
            Some(_) if index == last_index => {
                return Err(ConfigError::LastTierBounded { section });
            }
            Some(max) => {
                if max <= tier.min_value {
                    return Err(ConfigError::InvertedTier {
                        section,
                        index,
                        label: tier.label.clone(),
                        min: tier.min_value,
                        max,
                    });
                }
                let next_start = tiers[index + 1].min_value;
                if (next_start - max).abs() > BOUNDARY_EPSILON {
                    return Err(ConfigError::TierDiscontinuity {
                        section,
                        index,
                        end: max,
                        next_start,
                    });
                }
            }
        }
    }

    Ok(())
}

fn validate_absd(rates: &[AbsdRate]) -> Result<(), ConfigError> {
    if rates.is_empty() {
        return Err(ConfigError::EmptyTable { section: "absdRates" });
    }

    let mut seen = HashSet::new();
    for (index, entry) in rates.iter().enumerate() {
        if entry.residency_status == ResidencyStatus::Entity {
            return Err(ConfigError::EntityInTable);
        }
        check_range("absdRates", format!("[{}].rate", index), entry.rate, 0.0, 1.0)?;
        let key = (entry.residency_status, entry.property_type, entry.existing_properties);
        if !seen.insert(key) {
            return Err(ConfigError::DuplicateAbsdEntry {
                residency: entry.residency_status,
                property_type: entry.property_type.as_str(),
                existing_properties: entry.existing_properties,
            });
        }
    }

    for residency in [
        ResidencyStatus::SingaporeCitizen,
        ResidencyStatus::PermanentResident,
        ResidencyStatus::Foreigner,
    ] {
        if !rates.iter().any(|r| r.residency_status == residency) {
            return Err(ConfigError::MissingResidency(residency));
        }
    }

    Ok(())
}

/// SSD bands must start at zero, be contiguous, and reach the exemption threshold.
fn validate_ssd(ssd: &SsdSchedule) -> Result<(), ConfigError> {
    let section = "ssd";
    check_range(section, "exemptionThresholdMonths", ssd.exemption_threshold_months as f64, 1.0, f64::MAX)?;

    let first = ssd.tiers.first().ok_or(ConfigError::EmptyTable { section })?;
    if first.min_months != 0 {
        return Err(ConfigError::FirstTierNotZero {
            section,
            found: first.min_months as f64,
        });
    }

    let last_index = ssd.tiers.len() - 1;
    for (index, tier) in ssd.tiers.iter().enumerate() {
        check_range(section, format!("tiers[{}].rate", index), tier.rate, 0.0, 1.0)?;
        match tier.max_months {
            None if index != last_index => return Err(ConfigError::OpenTierNotLast { section, index }),
            None => {}
            Some(max) => {
                if max <= tier.min_months {
                    return Err(ConfigError::InvertedTier {
                        section,
                        index,
                        label: tier.label.clone(),
                        min: tier.min_months as f64,
                        max: max as f64,
                    });
                }
                if index < last_index && ssd.tiers[index + 1].min_months != max {
                    return Err(ConfigError::TierDiscontinuity {
                        section,
                        index,
                        end: max as f64,
                        next_start: ssd.tiers[index + 1].min_months as f64,
                    });
                }
            }
        }
    }

    if let Some(covered) = ssd.tiers[last_index].max_months {
        if covered < ssd.exemption_threshold_months {
            return Err(ConfigError::SsdCoverageGap {
                covered,
                threshold: ssd.exemption_threshold_months,
            });
        }
    }

    Ok(())
}

fn validate_ltv(rules: &[LtvRule]) -> Result<(), ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::EmptyTable { section: "ltvRules" });
    }

    for (index, rule) in rules.iter().enumerate() {
        check_range("ltvRules", format!("[{}].maxLTVPct", index), rule.max_ltv_pct, 0.0, 100.0)?;
        check_range(
            "ltvRules",
            format!("[{}].minCashDownPaymentPct", index),
            rule.min_cash_down_payment_pct,
            0.0,
            100.0,
        )?;
        let down_payment_pct = 100.0 - rule.max_ltv_pct;
        if rule.min_cash_down_payment_pct > down_payment_pct + BOUNDARY_EPSILON {
            return Err(ConfigError::CashExceedsDownPayment {
                property_type: rule.property_type.as_str(),
                min_cash_pct: rule.min_cash_down_payment_pct,
                down_payment_pct,
            });
        }
    }

    Ok(())
}

fn check_range(
    section: &'static str,
    field: impl Into<String>,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            section,
            field: field.into(),
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tables::{default_bsd_tiers, SsdTier};
    use crate::config::RegulatoryConfigData;

    #[test]
    fn test_builtin_tables_pass_validation() {
        assert_eq!(validate(&RegulatoryConfigData::singapore_2024()), Ok(()));
    }

    #[test]
    fn test_partition_rejects_gap() {
        let mut tiers = default_bsd_tiers();
        tiers[1].min_value = 200_000.0;

        let err = validate_partition("bsdTiers", &tiers).unwrap_err();
        assert!(matches!(err, ConfigError::TierDiscontinuity { index: 0, .. }));
    }

    #[test]
    fn test_partition_rejects_bounded_last_tier() {
        let mut tiers = default_bsd_tiers();
        tiers.last_mut().unwrap().max_value = Some(10_000_000.0);

        assert_eq!(
            validate_partition("bsdTiers", &tiers),
            Err(ConfigError::LastTierBounded { section: "bsdTiers" })
        );
    }

    #[test]
    fn test_partition_rejects_open_tier_in_middle() {
        let mut tiers = default_bsd_tiers();
        tiers[2].max_value = None;

        assert!(matches!(
            validate_partition("bsdTiers", &tiers),
            Err(ConfigError::OpenTierNotLast { index: 2, .. })
        ));
    }

    #[test]
    fn test_partition_rejects_nonzero_start_and_empty() {
        let mut tiers = default_bsd_tiers();
        tiers[0].min_value = 1.0;
        assert!(matches!(
            validate_partition("bsdTiers", &tiers),
            Err(ConfigError::FirstTierNotZero { .. })
        ));

        assert_eq!(
            validate_partition("bsdTiers", &[]),
            Err(ConfigError::EmptyTable { section: "bsdTiers" })
        );
    }

    #[test]
    fn test_rejects_rate_out_of_range() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.bsd_tiers[0].rate = 1.5;

        assert!(matches!(validate(&data), Err(ConfigError::OutOfRange { section: "bsdTiers", .. })));
    }

    #[test]
    fn test_rejects_duplicate_absd_key() {
        let mut data = RegulatoryConfigData::singapore_2024();
        let duplicate = data.absd_rates[0].clone();
        data.absd_rates.push(duplicate);

        assert!(matches!(validate(&data), Err(ConfigError::DuplicateAbsdEntry { .. })));
    }

    #[test]
    fn test_rejects_missing_residency() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.absd_rates.retain(|r| r.residency_status != ResidencyStatus::Foreigner);

        assert_eq!(validate(&data), Err(ConfigError::MissingResidency(ResidencyStatus::Foreigner)));
    }

    #[test]
    fn test_rejects_ssd_coverage_gap() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.ssd.exemption_threshold_months = 48;

        assert_eq!(
            validate(&data),
            Err(ConfigError::SsdCoverageGap { covered: 36, threshold: 48 })
        );
    }

    #[test]
    fn test_accepts_open_final_ssd_band() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.ssd.tiers.push(SsdTier {
            min_months: 36,
            max_months: None,
            rate: 0.0,
            label: "Held more than 3 years".into(),
        });
        data.ssd.exemption_threshold_months = 48;

        assert_eq!(validate(&data), Ok(()));
    }

    #[test]
    fn test_rejects_cash_exceeding_down_payment() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.ltv_rules[0].min_cash_down_payment_pct = 30.0;

        assert!(matches!(validate(&data), Err(ConfigError::CashExceedsDownPayment { .. })));
    }

    #[test]
    fn test_error_messages_name_the_section() {
        let err = ConfigError::EmptyTable { section: "ltvRules" };
        assert_eq!(err.to_string(), "ltvRules: table is empty");
    }
}
