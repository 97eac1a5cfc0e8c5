//! Monthly CPF Ordinary Account projection for one strategy

use super::scenario::{AgeBalance, CpfScenario, ScenarioKind};
use super::CpfOptimizerInput;
use crate::config::CpfRates;

/// Projections stop at this age however late retirement is set
pub const MAX_PROJECTION_AGE: u32 = 120;

/// Running state of the OA during projection
#[derive(Debug, Clone)]
struct ProjectionState {
    month: u32,
    balance: f64,
    /// CPF withdrawn for housing so far
    cpf_used: f64,
    /// Withdrawals grown at the OA rate, the amount refundable on sale
    cpf_used_with_interest: f64,
    cpf_installments: f64,
    cash_installments: f64,
}

impl ProjectionState {
    fn new(balance: f64, cpf_down_payment: f64) -> Self {
        Self {
            month: 0,
            balance,
            cpf_used: cpf_down_payment,
            cpf_used_with_interest: cpf_down_payment,
            cpf_installments: 0.0,
            cash_installments: 0.0,
        }
    }

    fn advance_month(&mut self, growth: f64, contribution: f64) {
        self.month += 1;
        self.balance *= growth;
        self.cpf_used_with_interest *= growth;
        self.balance += contribution;
    }

    /// Pay one installment, from the OA as far as it reaches when allowed
    fn pay_installment(&mut self, installment: f64, from_cpf: bool) {
        let from_oa = if from_cpf {
            installment.min(self.balance).max(0.0)
        } else {
            0.0
        };
        self.balance -= from_oa;
        self.cpf_used += from_oa;
        self.cpf_used_with_interest += from_oa;
        self.cpf_installments += from_oa;
        self.cash_installments += installment - from_oa;
    }
}

/// Project the OA balance from current age to retirement under one strategy
pub fn project_scenario(
    kind: ScenarioKind,
    input: &CpfOptimizerInput,
    rates: &CpfRates,
    monthly_installment: f64,
    mortgage_interest: f64,
) -> CpfScenario {
    let usage = kind.usage(input.annual_interest_rate, rates.oa_interest_rate);

    let down_payment = (input.property_price - input.loan_amount).max(0.0);
    let opening_balance = input.cpf_oa_balance.max(0.0);
    let cpf_down_payment = if usage.down_payment {
        down_payment.min(opening_balance)
    } else {
        0.0
    };

    let mut state = ProjectionState::new(opening_balance - cpf_down_payment, cpf_down_payment);
    let mut balance_by_age = vec![AgeBalance {
        age: input.current_age,
        balance: state.balance,
    }];

    let growth = 1.0 + rates.oa_monthly_rate();
    let contribution = input.monthly_oa_contribution.max(0.0);
    let loan_months = input.loan_tenure_years.saturating_mul(12);
    let retirement_age = input.retirement_age.min(MAX_PROJECTION_AGE);
    let projection_months = retirement_age.saturating_sub(input.current_age).saturating_mul(12);

    for _ in 0..projection_months {
        state.advance_month(growth, contribution);

        if state.month <= loan_months && monthly_installment > 0.0 {
            state.pay_installment(monthly_installment, usage.installments);
        }

        if state.month % 12 == 0 {
            balance_by_age.push(AgeBalance {
                age: input.current_age + state.month / 12,
                balance: state.balance,
            });
        }
    }

    let cpf_accrued_interest = (state.cpf_used_with_interest - state.cpf_used).max(0.0);
    let projected = state.balance;

    log::debug!(
        "CPF scenario {} ({}): OA at {} = {:.2}, CPF used {:.2}, accrued interest {:.2}",
        kind.letter(),
        kind.name(),
        retirement_age,
        projected,
        state.cpf_used,
        cpf_accrued_interest
    );

    CpfScenario {
        kind,
        usage,
        cpf_down_payment,
        cash_down_payment: down_payment - cpf_down_payment,
        monthly_installment,
        total_cpf_installments: state.cpf_installments,
        total_cash_installments: state.cash_installments,
        mortgage_interest,
        cpf_accrued_interest,
        total_interest: mortgage_interest + cpf_accrued_interest,
        projected_cpf_oa_at_retirement: projected,
        net_wealth_at_retirement: projected + input.property_price,
        balance_by_age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input() -> CpfOptimizerInput {
        CpfOptimizerInput {
            property_price: 1_000_000.0,
            loan_amount: 750_000.0,
            annual_interest_rate: 0.035,
            loan_tenure_years: 25,
            cpf_oa_balance: 150_000.0,
            current_age: 35,
            retirement_age: 65,
            monthly_oa_contribution: 0.0,
        }
    }

    #[test]
    fn test_full_cash_compounds_untouched() {
        let rates = CpfRates::default();
        let scenario = project_scenario(ScenarioKind::FullCash, &input(), &rates, 3_000.0, 0.0);

        assert_eq!(scenario.cpf_down_payment, 0.0);
        assert_eq!(scenario.total_cpf_installments, 0.0);
        assert_relative_eq!(
            scenario.projected_cpf_oa_at_retirement,
            150_000.0 * 1.025_f64.powi(30),
            max_relative = 1e-9
        );
        assert_relative_eq!(scenario.total_cash_installments, 3_000.0 * 300.0, max_relative = 1e-12);
        assert_eq!(scenario.cpf_accrued_interest, 0.0);
    }

    #[test]
    fn test_maximum_cpf_exhausts_then_pays_cash() {
        let rates = CpfRates::default();
        let scenario = project_scenario(ScenarioKind::MaximumCpf, &input(), &rates, 3_500.0, 0.0);

        // 150k covers 150k of the 250k down payment
        assert_eq!(scenario.cpf_down_payment, 150_000.0);
        assert_eq!(scenario.cash_down_payment, 100_000.0);
        assert_eq!(scenario.total_cpf_installments, 0.0);
        assert_eq!(scenario.projected_cpf_oa_at_retirement, 0.0);
        assert!(scenario.cpf_accrued_interest > 0.0);
    }

    #[test]
    fn test_installments_drawn_until_balance_runs_out() {
        let rates = CpfRates::default();
        let mut facts = input();
        facts.cpf_oa_balance = 300_000.0;
        let scenario = project_scenario(ScenarioKind::MaximumCpf, &facts, &rates, 3_500.0, 0.0);

        assert_eq!(scenario.cpf_down_payment, 250_000.0);
        assert!(scenario.total_cpf_installments > 50_000.0);
        assert!(scenario.total_cash_installments > 0.0);
        assert_relative_eq!(
            scenario.total_cpf_installments + scenario.total_cash_installments,
            3_500.0 * 300.0,
            max_relative = 1e-12
        );
        assert!(scenario.balance_by_age.iter().all(|b| b.balance >= 0.0));
    }

    #[test]
    fn test_birthday_snapshots() {
        let rates = CpfRates::default();
        let scenario = project_scenario(ScenarioKind::FullCash, &input(), &rates, 3_000.0, 0.0);

        assert_eq!(scenario.balance_by_age.len(), 31);
        assert_eq!(scenario.balance_by_age[0].age, 35);
        assert_eq!(scenario.balance_by_age[0].balance, 150_000.0);
        assert_eq!(scenario.balance_by_age.last().unwrap().age, 65);
        assert_eq!(
            scenario.balance_by_age.last().unwrap().balance,
            scenario.projected_cpf_oa_at_retirement
        );
    }

    #[test]
    fn test_contributions_are_credited() {
        let rates = CpfRates::default();
        let mut facts = input();
        facts.monthly_oa_contribution = 1_000.0;

        let with = project_scenario(ScenarioKind::FullCash, &facts, &rates, 3_000.0, 0.0);
        let without = project_scenario(ScenarioKind::FullCash, &input(), &rates, 3_000.0, 0.0);
        assert!(with.projected_cpf_oa_at_retirement > without.projected_cpf_oa_at_retirement + 360_000.0);
    }

    #[test]
    fn test_retired_buyer_has_no_projection() {
        let rates = CpfRates::default();
        let mut facts = input();
        facts.current_age = 70;

        let scenario = project_scenario(ScenarioKind::FullCash, &facts, &rates, 3_000.0, 0.0);
        assert_eq!(scenario.balance_by_age.len(), 1);
        assert_eq!(scenario.projected_cpf_oa_at_retirement, 150_000.0);
    }

    #[test]
    fn test_absurd_retirement_age_stops_at_age_cap() {
        let rates = CpfRates::default();
        let mut facts = input();
        facts.retirement_age = u32::MAX;

        let scenario = project_scenario(ScenarioKind::FullCash, &facts, &rates, 3_000.0, 0.0);
        assert_eq!(scenario.balance_by_age.len(), (MAX_PROJECTION_AGE - 35 + 1) as usize);
        assert_eq!(scenario.balance_by_age.last().unwrap().age, MAX_PROJECTION_AGE);

        facts.current_age = u32::MAX;
        let scenario = project_scenario(ScenarioKind::FullCash, &facts, &rates, 3_000.0, 0.0);
        assert_eq!(scenario.balance_by_age.len(), 1);
    }
}
