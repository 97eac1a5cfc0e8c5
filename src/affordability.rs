//! Maximum affordable purchase for a set of buyers
//!
//! Chains the borrowing limits, the LTV rules and stamp duty: the servicing
//! ratios size the loan, LTV turns the loan into a price, and the price
//! determines the down payment split and the duties payable up front.

use crate::borrowing::{self, BindingConstraint, MaxLoanInput, TdsrInput};
use crate::config::{LtvRule, RegulatoryConfig};
use crate::mortgage;
use crate::resolver::{rank_of, TableResolver};
use crate::stamp_duty::{calculate_stamp_duty, StampDutyInput, StampDutyResult};
use crate::transaction::{effective_residency, Buyer, IncomeProfile, LoanType, PropertyType, ResidencyStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInput {
    pub buyers: Vec<Buyer>,
    /// All existing monthly debt obligations, including property loans
    #[serde(default)]
    pub existing_monthly_debts: f64,
    /// Subset of existing debts that are property loans (for MSR)
    #[serde(default)]
    pub existing_mortgage_repayments: f64,
    pub property_type: PropertyType,
    pub loan_type: LoanType,
    /// Residential properties already owned (ABSD)
    #[serde(default)]
    pub existing_properties: u32,
    /// Outstanding housing loans (LTV)
    #[serde(default)]
    pub existing_loans: u32,
    pub annual_interest_rate: f64,
    pub loan_tenure_years: u32,
}

/// LTV rule applied to a purchase, with how it was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLtv {
    pub rule: LtvRule,
    pub rationale: String,
    pub was_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResult {
    pub max_loan_amount: f64,
    pub max_affordable_price: f64,
    pub total_down_payment: f64,
    pub min_cash_down_payment: f64,
    #[serde(rename = "cpfEligibleDownPayment")]
    pub cpf_eligible_down_payment: f64,
    pub stamp_duty: StampDutyResult,
    pub total_cash_required: f64,
    /// Repayment on the maximum loan at the actual interest rate
    pub monthly_repayment: f64,
    #[serde(rename = "tdsrAtMaxLoan")]
    pub tdsr_at_max_loan: f64,
    #[serde(rename = "withinTDSRLimit")]
    pub within_tdsr_limit: bool,
    pub binding_constraint: BindingConstraint,
    pub ltv: ResolvedLtv,
    pub effective_residency: ResidencyStatus,
    /// Requested tenure capped at the loan type's maximum
    pub effective_tenure_years: u32,
}

/// Find the LTV rule for a loan.
///
/// Only a rule tabulated for the exact tenure and existing-loan count is a
/// direct hit. Everything else is flagged as a fallback: the longest tenure
/// band at or below the request, then a relaxed existing-loan count, then the
/// closest rule for the property type that does not need a longer tenure, and
/// finally the most conservative rule in the table.
pub fn resolve_ltv(
    config: &RegulatoryConfig,
    loan_type: LoanType,
    property_type: PropertyType,
    tenure_years: u32,
    existing_loans: u32,
) -> Option<ResolvedLtv> {
    let resolver = TableResolver::new()
        .exact("exact match", move |r: &LtvRule| {
            r.loan_type == loan_type
                && r.property_type == property_type
                && r.existing_loans == existing_loans
                && r.loan_tenure_years == tenure_years
        })
        .fallback(
            "tenure band",
            move |r: &LtvRule| {
                r.loan_type == loan_type
                    && r.property_type == property_type
                    && r.existing_loans == existing_loans
                    && r.loan_tenure_years <= tenure_years
            },
            |r| r.loan_tenure_years as i64,
        )
        .fallback(
            "highest tabulated existing-loan count",
            move |r: &LtvRule| {
                r.loan_type == loan_type
                    && r.property_type == property_type
                    && r.existing_loans <= existing_loans
                    && r.loan_tenure_years <= tenure_years
            },
            |r| r.existing_loans as i64 * 1_000 + r.loan_tenure_years as i64,
        )
        .fallback(
            "closest rule for property type",
            move |r: &LtvRule| r.property_type == property_type && r.loan_tenure_years <= tenure_years,
            move |r| {
                let loan_distance = (r.existing_loans as i64 - existing_loans as i64).abs();
                r.loan_tenure_years as i64 * 1_000 - loan_distance
            },
        )
        .fallback("most conservative rule", |_: &LtvRule| true, |r| -rank_of(r.max_ltv_pct));

    let hit = resolver.resolve(&config.ltv_rules)?;
    let rationale = format!(
        "{:?} loan, {}, {} existing loan(s), tenure from {} years: {:.0}% LTV ({})",
        hit.entry.loan_type,
        hit.entry.property_type.as_str(),
        hit.entry.existing_loans,
        hit.entry.loan_tenure_years,
        hit.entry.max_ltv_pct,
        hit.step
    );
    if hit.was_fallback {
        log::debug!("LTV resolved by fallback: {}", rationale);
    }

    Some(ResolvedLtv {
        rule: hit.entry.clone(),
        rationale,
        was_fallback: hit.was_fallback,
    })
}

/// Most expensive property the buyers can finance
pub fn calculate_affordability(input: &AffordabilityInput, config: &RegulatoryConfig) -> AffordabilityResult {
    let max_tenure = config.loan_limits.max_tenure_years(input.loan_type);
    let tenure_years = input.loan_tenure_years.min(max_tenure);
    if tenure_years < input.loan_tenure_years {
        log::debug!(
            "tenure capped from {} to {} years for {:?} loan",
            input.loan_tenure_years,
            tenure_years,
            input.loan_type
        );
    }

    let income = IncomeProfile::from_buyers(&input.buyers);
    let max_loan = borrowing::calculate_max_loan(
        &MaxLoanInput {
            income,
            existing_monthly_debts: input.existing_monthly_debts,
            existing_mortgage_repayments: input.existing_mortgage_repayments,
            property_type: input.property_type,
            annual_interest_rate: input.annual_interest_rate,
            tenure_years,
        },
        config,
    );

    // Validation guarantees a non-empty table
    let ltv = resolve_ltv(
        config,
        input.loan_type,
        input.property_type,
        tenure_years,
        input.existing_loans,
    )
    .unwrap_or_else(|| ResolvedLtv {
        rule: LtvRule {
            loan_type: input.loan_type,
            property_type: input.property_type,
            loan_tenure_years: tenure_years,
            existing_loans: input.existing_loans,
            max_ltv_pct: 0.0,
            min_cash_down_payment_pct: 0.0,
        },
        rationale: "no LTV rules".to_string(),
        was_fallback: true,
    });

    let max_loan_amount = max_loan.max_loan_amount;
    let max_affordable_price = if ltv.rule.max_ltv_pct > 0.0 {
        max_loan_amount / (ltv.rule.max_ltv_pct / 100.0)
    } else {
        0.0
    };
    let total_down_payment = (max_affordable_price - max_loan_amount).max(0.0);
    let min_cash_down_payment = max_affordable_price * ltv.rule.min_cash_down_payment_pct / 100.0;
    let cpf_eligible_down_payment = (total_down_payment - min_cash_down_payment).max(0.0);

    let residencies: Vec<ResidencyStatus> = input.buyers.iter().map(|b| b.residency).collect();
    let residency = effective_residency(&residencies);
    let stamp_duty = calculate_stamp_duty(
        &StampDutyInput::purchase(
            max_affordable_price,
            residency,
            input.property_type,
            input.existing_properties,
        ),
        config,
    );

    let total_cash_required = min_cash_down_payment + stamp_duty.total_stamp_duty;

    let monthly_repayment = mortgage::monthly_repayment(max_loan_amount, input.annual_interest_rate, tenure_years);
    let tdsr = borrowing::calculate_tdsr(
        &TdsrInput {
            fixed_monthly_income: income.fixed_monthly,
            variable_monthly_income: income.variable_monthly,
            existing_monthly_debts: input.existing_monthly_debts,
            proposed_monthly_repayment: monthly_repayment,
        },
        &config.tdsr,
    );

    AffordabilityResult {
        max_loan_amount,
        max_affordable_price,
        total_down_payment,
        min_cash_down_payment,
        cpf_eligible_down_payment,
        stamp_duty,
        total_cash_required,
        monthly_repayment,
        tdsr_at_max_loan: tdsr.ratio,
        within_tdsr_limit: tdsr.within_limit,
        binding_constraint: max_loan.binding_constraint,
        ltv,
        effective_residency: residency,
        effective_tenure_years: tenure_years,
    }
}
