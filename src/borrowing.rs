//! Debt servicing limits: TDSR, MSR and the maximum serviceable loan

use serde::{Deserialize, Serialize};

use crate::config::{MsrConfig, RegulatoryConfig, TdsrConfig};
use crate::mortgage;
use crate::transaction::{IncomeProfile, PropertyType};

/// Inputs for a Total Debt Servicing Ratio check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TdsrInput {
    pub fixed_monthly_income: f64,
    pub variable_monthly_income: f64,
    /// Car loans, card minimums, other property loans
    pub existing_monthly_debts: f64,
    pub proposed_monthly_repayment: f64,
}

/// Inputs for a Mortgage Servicing Ratio check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MsrInput {
    /// Gross monthly income, no haircut
    pub gross_monthly_income: f64,
    /// Repayments on other property loans only
    pub existing_mortgage_repayments: f64,
    pub proposed_monthly_repayment: f64,
}

/// Outcome of a servicing ratio check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicingRatio {
    pub ratio: f64,
    pub limit: f64,
    pub within_limit: bool,
    /// Income the ratio is measured against (after haircut for TDSR)
    pub assessed_income: f64,
    pub total_obligations: f64,
    /// Monthly obligations still available under the limit
    pub remaining_capacity: f64,
}

fn servicing_ratio(assessed_income: f64, total_obligations: f64, limit: f64) -> ServicingRatio {
    let assessed_income = assessed_income.max(0.0);
    let total_obligations = total_obligations.max(0.0);

    let ratio = if assessed_income > 0.0 {
        total_obligations / assessed_income
    } else if total_obligations > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    ServicingRatio {
        ratio,
        limit,
        within_limit: ratio <= limit,
        assessed_income,
        total_obligations,
        remaining_capacity: (assessed_income * limit - total_obligations).max(0.0),
    }
}

/// Income after the variable-income haircut
pub fn effective_income(fixed: f64, variable: f64, tdsr: &TdsrConfig) -> f64 {
    fixed.max(0.0) + variable.max(0.0) * (1.0 - tdsr.variable_income_haircut_pct / 100.0)
}

pub fn calculate_tdsr(input: &TdsrInput, tdsr: &TdsrConfig) -> ServicingRatio {
    let income = effective_income(input.fixed_monthly_income, input.variable_monthly_income, tdsr);
    servicing_ratio(
        income,
        input.existing_monthly_debts + input.proposed_monthly_repayment,
        tdsr.limit,
    )
}

pub fn calculate_msr(input: &MsrInput, msr: &MsrConfig) -> ServicingRatio {
    servicing_ratio(
        input.gross_monthly_income,
        input.existing_mortgage_repayments + input.proposed_monthly_repayment,
        msr.limit,
    )
}

/// Largest new monthly repayment TDSR allows
pub fn max_monthly_by_tdsr(income: &IncomeProfile, existing_monthly_debts: f64, tdsr: &TdsrConfig) -> f64 {
    let check = calculate_tdsr(
        &TdsrInput {
            fixed_monthly_income: income.fixed_monthly,
            variable_monthly_income: income.variable_monthly,
            existing_monthly_debts,
            proposed_monthly_repayment: 0.0,
        },
        tdsr,
    );
    check.remaining_capacity
}

/// Largest new monthly repayment MSR allows; infinite when MSR does not apply
pub fn max_monthly_by_msr(
    income: &IncomeProfile,
    existing_mortgage_repayments: f64,
    property_type: PropertyType,
    msr: &MsrConfig,
) -> f64 {
    if !msr.applies_to(property_type) {
        return f64::INFINITY;
    }
    let check = calculate_msr(
        &MsrInput {
            gross_monthly_income: income.gross_monthly(),
            existing_mortgage_repayments,
            proposed_monthly_repayment: 0.0,
        },
        msr,
    );
    check.remaining_capacity
}

/// Which servicing limit caps the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingConstraint {
    #[serde(rename = "TDSR")]
    Tdsr,
    #[serde(rename = "MSR")]
    Msr,
}

impl BindingConstraint {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingConstraint::Tdsr => "TDSR",
            BindingConstraint::Msr => "MSR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxLoanInput {
    pub income: IncomeProfile,
    #[serde(default)]
    pub existing_monthly_debts: f64,
    /// Subset of existing debts that are property loans (for MSR)
    #[serde(default)]
    pub existing_mortgage_repayments: f64,
    pub property_type: PropertyType,
    pub annual_interest_rate: f64,
    pub tenure_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxLoanResult {
    pub max_loan_amount: f64,
    /// Binding monthly repayment ceiling
    pub max_monthly_repayment: f64,
    pub binding_constraint: BindingConstraint,
    pub max_monthly_by_tdsr: f64,
    /// `None` when MSR does not apply to the property type
    pub max_monthly_by_msr: Option<f64>,
    /// Rate used to size the loan (actual rate or the floor, whichever is higher)
    pub assessment_rate: f64,
}

/// Largest loan whose repayment fits under every applicable servicing limit
pub fn calculate_max_loan(input: &MaxLoanInput, config: &RegulatoryConfig) -> MaxLoanResult {
    let by_tdsr = max_monthly_by_tdsr(&input.income, input.existing_monthly_debts, &config.tdsr);
    let by_msr = max_monthly_by_msr(
        &input.income,
        input.existing_mortgage_repayments,
        input.property_type,
        &config.msr,
    );

    let (max_monthly_repayment, binding_constraint) = if by_msr < by_tdsr {
        (by_msr, BindingConstraint::Msr)
    } else {
        (by_tdsr, BindingConstraint::Tdsr)
    };

    let assessment_rate = input.annual_interest_rate.max(config.loan_limits.assessment_rate_floor);
    let max_loan_amount = mortgage::principal_for_payment(max_monthly_repayment, assessment_rate, input.tenure_years);

    log::debug!(
        "max loan {:.2} over {} years at {:.3}% ({} binding at {:.2}/month)",
        max_loan_amount,
        input.tenure_years,
        assessment_rate * 100.0,
        binding_constraint.as_str(),
        max_monthly_repayment
    );

    MaxLoanResult {
        max_loan_amount,
        max_monthly_repayment,
        binding_constraint,
        max_monthly_by_tdsr: by_tdsr,
        max_monthly_by_msr: by_msr.is_finite().then_some(by_msr),
        assessment_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tdsr() -> TdsrConfig {
        TdsrConfig::default()
    }

    #[test]
    fn test_tdsr_worked_example() {
        let input = TdsrInput {
            fixed_monthly_income: 8_000.0,
            variable_monthly_income: 2_000.0,
            existing_monthly_debts: 500.0,
            proposed_monthly_repayment: 3_000.0,
        };
        let result = calculate_tdsr(&input, &tdsr());

        assert_relative_eq!(result.assessed_income, 9_400.0, max_relative = 1e-12);
        assert_relative_eq!(result.ratio, 3_500.0 / 9_400.0, max_relative = 1e-12);
        assert!((result.ratio - 0.3723).abs() < 1e-4);
        assert!(result.within_limit);
        assert_relative_eq!(result.remaining_capacity, 9_400.0 * 0.55 - 3_500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_tdsr_is_pure() {
        let input = TdsrInput {
            fixed_monthly_income: 7_321.5,
            variable_monthly_income: 1_234.25,
            existing_monthly_debts: 812.0,
            proposed_monthly_repayment: 2_999.99,
        };
        let first = calculate_tdsr(&input, &tdsr());
        let second = calculate_tdsr(&input, &tdsr());

        assert_eq!(first.ratio.to_bits(), second.ratio.to_bits());
        assert_eq!(first.remaining_capacity.to_bits(), second.remaining_capacity.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_tdsr_over_limit_floors_capacity() {
        let input = TdsrInput {
            fixed_monthly_income: 5_000.0,
            variable_monthly_income: 0.0,
            existing_monthly_debts: 1_000.0,
            proposed_monthly_repayment: 2_000.0,
        };
        let result = calculate_tdsr(&input, &tdsr());

        assert!(!result.within_limit);
        assert_eq!(result.remaining_capacity, 0.0);
    }

    #[test]
    fn test_zero_income() {
        let no_debt = calculate_tdsr(
            &TdsrInput {
                fixed_monthly_income: 0.0,
                variable_monthly_income: 0.0,
                existing_monthly_debts: 0.0,
                proposed_monthly_repayment: 0.0,
            },
            &tdsr(),
        );
        assert_eq!(no_debt.ratio, 0.0);
        assert!(no_debt.within_limit);

        let with_debt = calculate_tdsr(
            &TdsrInput {
                fixed_monthly_income: 0.0,
                variable_monthly_income: 0.0,
                existing_monthly_debts: 100.0,
                proposed_monthly_repayment: 0.0,
            },
            &tdsr(),
        );
        assert!(with_debt.ratio.is_infinite());
        assert!(!with_debt.within_limit);
    }

    #[test]
    fn test_msr_has_no_haircut() {
        let msr = MsrConfig::default();
        let result = calculate_msr(
            &MsrInput {
                gross_monthly_income: 10_000.0,
                existing_mortgage_repayments: 0.0,
                proposed_monthly_repayment: 2_500.0,
            },
            &msr,
        );

        assert_relative_eq!(result.ratio, 0.25, max_relative = 1e-12);
        assert!(result.within_limit);
        assert_relative_eq!(result.remaining_capacity, 500.0, max_relative = 1e-12);
    }

    #[test]
    fn test_msr_not_binding_for_private_property() {
        let income = IncomeProfile { fixed_monthly: 10_000.0, variable_monthly: 0.0 };
        let by_msr = max_monthly_by_msr(&income, 0.0, PropertyType::Condo, &MsrConfig::default());
        assert!(by_msr.is_infinite());
    }

    #[test]
    fn test_max_loan_hdb_bound_by_msr() {
        let config = RegulatoryConfig::singapore_2024();
        let input = MaxLoanInput {
            income: IncomeProfile { fixed_monthly: 10_000.0, variable_monthly: 0.0 },
            existing_monthly_debts: 0.0,
            existing_mortgage_repayments: 0.0,
            property_type: PropertyType::Hdb,
            annual_interest_rate: 0.026,
            tenure_years: 25,
        };
        let result = calculate_max_loan(&input, &config);

        assert_eq!(result.binding_constraint, BindingConstraint::Msr);
        assert_relative_eq!(result.max_monthly_repayment, 3_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.max_monthly_by_tdsr, 5_500.0, max_relative = 1e-12);
        assert_eq!(result.assessment_rate, 0.04);
        assert_relative_eq!(
            result.max_loan_amount,
            mortgage::principal_for_payment(3_000.0, 0.04, 25),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_max_loan_condo_bound_by_tdsr() {
        let config = RegulatoryConfig::singapore_2024();
        let input = MaxLoanInput {
            income: IncomeProfile { fixed_monthly: 12_000.0, variable_monthly: 3_000.0 },
            existing_monthly_debts: 800.0,
            existing_mortgage_repayments: 0.0,
            property_type: PropertyType::Condo,
            annual_interest_rate: 0.045,
            tenure_years: 30,
        };
        let result = calculate_max_loan(&input, &config);

        // (12,000 + 3,000 x 0.7) x 0.55 - 800
        assert_eq!(result.binding_constraint, BindingConstraint::Tdsr);
        assert_relative_eq!(result.max_monthly_repayment, 14_100.0 * 0.55 - 800.0, max_relative = 1e-12);
        assert!(result.max_monthly_by_msr.is_none());
        assert_eq!(result.assessment_rate, 0.045);

        let payment = mortgage::monthly_repayment(result.max_loan_amount, 0.045, 30);
        assert_relative_eq!(payment, result.max_monthly_repayment, max_relative = 1e-9);
    }

    #[test]
    fn test_max_loan_zero_when_debts_exhaust_capacity() {
        let config = RegulatoryConfig::singapore_2024();
        let input = MaxLoanInput {
            income: IncomeProfile { fixed_monthly: 3_000.0, variable_monthly: 0.0 },
            existing_monthly_debts: 2_000.0,
            existing_mortgage_repayments: 0.0,
            property_type: PropertyType::Condo,
            annual_interest_rate: 0.03,
            tenure_years: 30,
        };
        let result = calculate_max_loan(&input, &config);
        assert_eq!(result.max_loan_amount, 0.0);
    }
}
