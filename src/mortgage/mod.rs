//! Fixed-rate amortizing mortgage calculations
//!
//! Rates are annual decimals compounded monthly (`r = annual_rate / 12`).

mod schedule;

pub use schedule::{AmortizationEntry, AmortizationSchedule, DatedAmortizationEntry, MortgageSummary};

use chrono::NaiveDate;

/// Below this monthly rate the loan is treated as interest free
const ZERO_RATE_EPSILON: f64 = 1e-12;

pub fn monthly_rate(annual_rate: f64) -> f64 {
    annual_rate / 12.0
}

/// Longest tenure a loan is amortized over, matching the loan-limit bound
pub const MAX_TENURE_YEARS: u32 = 100;

pub fn tenure_months(tenure_years: u32) -> u32 {
    tenure_years.min(MAX_TENURE_YEARS) * 12
}

/// Level monthly payment on an amortizing loan
///
/// `M = P·r(1+r)^n / ((1+r)^n − 1)`, or `P/n` for a zero rate.
pub fn monthly_repayment(principal: f64, annual_rate: f64, tenure_years: u32) -> f64 {
    payment_for_months(principal, annual_rate, tenure_months(tenure_years))
}

pub fn payment_for_months(principal: f64, annual_rate: f64, months: u32) -> f64 {
    if !(principal > 0.0) || months == 0 {
        return 0.0;
    }

    let r = monthly_rate(annual_rate);
    let n = months as f64;
    if r.abs() < ZERO_RATE_EPSILON {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Principal serviceable by a level monthly payment (present value of an annuity)
///
/// `P = M × (1 − (1+r)^−n) / r`, or `M × n` for a zero rate.
pub fn principal_for_payment(payment: f64, annual_rate: f64, tenure_years: u32) -> f64 {
    let months = tenure_months(tenure_years);
    if !(payment > 0.0) || months == 0 || payment.is_infinite() {
        return 0.0;
    }

    let r = monthly_rate(annual_rate);
    let n = months as f64;
    if r.abs() < ZERO_RATE_EPSILON {
        return payment * n;
    }

    payment * (1.0 - (1.0 + r).powf(-n)) / r
}

/// Month-by-month schedule for a loan
pub fn amortization_schedule(principal: f64, annual_rate: f64, tenure_years: u32) -> AmortizationSchedule {
    let months = tenure_months(tenure_years);
    let payment = payment_for_months(principal, annual_rate, months);
    let r = monthly_rate(annual_rate);

    let mut entries = Vec::with_capacity(months as usize);
    if payment > 0.0 {
        let mut balance = principal;
        let mut cumulative_interest = 0.0;

        for month in 1..=months {
            let interest = balance * r;
            let principal_component = payment - interest;
            balance = (balance - principal_component).max(0.0);
            cumulative_interest += interest;

            entries.push(AmortizationEntry {
                month,
                payment,
                principal_component,
                interest_component: interest,
                balance,
                cumulative_interest,
            });
        }
    }

    AmortizationSchedule {
        principal: principal.max(0.0),
        annual_rate,
        tenure_months: months,
        monthly_payment: payment,
        entries,
    }
}

/// Schedule with payment dates and totals
pub fn mortgage_summary(
    principal: f64,
    annual_rate: f64,
    tenure_years: u32,
    start_date: NaiveDate,
) -> MortgageSummary {
    amortization_schedule(principal, annual_rate, tenure_years).summarize(start_date)
}
