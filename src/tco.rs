//! Total cost of ownership over a holding period

use crate::config::RegulatoryConfig;
use crate::mortgage;
use crate::stamp_duty::{calculate_stamp_duty, progressive_total, StampDutyInput, StampDutyResult};
use crate::transaction::{PropertyType, ResidencyStatus, SaleFacts};
use serde::{Deserialize, Serialize};

fn owner_occupied_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcoInput {
    pub purchase_price: f64,
    pub loan_amount: f64,
    pub annual_interest_rate: f64,
    pub loan_tenure_years: u32,
    pub holding_period_years: u32,
    #[serde(default)]
    pub annual_appreciation_rate: f64,
    pub residency: ResidencyStatus,
    #[serde(default)]
    pub joint_residency: Option<ResidencyStatus>,
    #[serde(default)]
    pub existing_properties: u32,
    pub property_type: PropertyType,
    #[serde(default = "owner_occupied_default")]
    pub owner_occupied: bool,
    /// Annual Value for property tax; estimated from the price when absent
    #[serde(default)]
    pub annual_value: Option<f64>,
    /// Overrides the configured maintenance fee for the property type
    #[serde(default)]
    pub monthly_maintenance: Option<f64>,
}

/// Costs incurred over the holding period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcoCosts {
    pub purchase_price: f64,
    /// BSD and ABSD on purchase, plus SSD on the projected sale
    pub stamp_duty: StampDutyResult,
    pub mortgage_interest: f64,
    pub property_tax: f64,
    pub maintenance: f64,
    pub legal_fees: f64,
    pub valuation_fee: f64,
}

impl TcoCosts {
    pub fn total(&self) -> f64 {
        self.purchase_price
            + self.stamp_duty.total_stamp_duty
            + self.mortgage_interest
            + self.property_tax
            + self.maintenance
            + self.legal_fees
            + self.valuation_fee
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcoResult {
    pub costs: TcoCosts,
    pub annual_value: f64,
    pub annual_property_tax: f64,
    pub annual_maintenance: f64,
    pub grand_total: f64,
    pub projected_sale_price: f64,
    pub net_gain: f64,
    pub annualized_return: f64,
    /// Loan balance still owed when the property is sold
    pub outstanding_loan_at_sale: f64,
}

impl TcoResult {
    /// Cash left after selling and clearing the loan
    pub fn net_sale_proceeds(&self) -> f64 {
        self.projected_sale_price - self.costs.stamp_duty.ssd - self.outstanding_loan_at_sale
    }
}

/// `(sale / total)^(1/years) − 1`, zero when undefined
pub fn annualized_return(projected_sale_price: f64, grand_total: f64, years: u32) -> f64 {
    if years == 0 || !(grand_total > 0.0) || projected_sale_price < 0.0 {
        return 0.0;
    }
    (projected_sale_price / grand_total).powf(1.0 / years as f64) - 1.0
}

pub fn calculate_tco(input: &TcoInput, config: &RegulatoryConfig) -> TcoResult {
    let years = input.holding_period_years;
    let holding_months = years.saturating_mul(12);
    let years_f = years as f64;

    let projected_sale_price = input.purchase_price.max(0.0) * (1.0 + input.annual_appreciation_rate).powi(years as i32);

    let mut duty_input = StampDutyInput::purchase(
        input.purchase_price,
        input.residency,
        input.property_type,
        input.existing_properties,
    )
    .with_sale(SaleFacts::new(projected_sale_price, holding_months));
    if let Some(joint) = input.joint_residency {
        duty_input = duty_input.with_joint_buyer(joint);
    }
    let stamp_duty = calculate_stamp_duty(&duty_input, config);

    let schedule = mortgage::amortization_schedule(input.loan_amount, input.annual_interest_rate, input.loan_tenure_years);
    let mortgage_interest = schedule.interest_paid_through(holding_months);
    let outstanding_loan_at_sale = schedule.balance_after(holding_months);

    let annual_value = input
        .annual_value
        .unwrap_or(input.purchase_price * config.property_tax.annual_value_rate)
        .max(0.0);
    let annual_property_tax = progressive_total(config.property_tax.schedule(input.owner_occupied), annual_value);

    let annual_maintenance = input
        .monthly_maintenance
        .unwrap_or_else(|| config.maintenance_fees.monthly_for(input.property_type))
        .max(0.0)
        * 12.0;

    let costs = TcoCosts {
        purchase_price: input.purchase_price,
        stamp_duty,
        mortgage_interest,
        property_tax: annual_property_tax * years_f,
        maintenance: annual_maintenance * years_f,
        legal_fees: input.purchase_price.max(0.0) * config.fees.legal_fee_rate,
        valuation_fee: config.fees.valuation_fee,
    };
    let grand_total = costs.total();
    let net_gain = projected_sale_price - grand_total;

    log::debug!(
        "TCO over {} years: total {:.2}, projected sale {:.2}, SSD {:.2}",
        years,
        grand_total,
        projected_sale_price,
        costs.stamp_duty.ssd
    );

    TcoResult {
        costs,
        annual_value,
        annual_property_tax,
        annual_maintenance,
        grand_total,
        projected_sale_price,
        net_gain,
        annualized_return: annualized_return(projected_sale_price, grand_total, years),
        outstanding_loan_at_sale,
    }
}
