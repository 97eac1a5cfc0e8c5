//! CPF Ordinary Account usage optimizer
//!
//! Runs three strategies over the same loan and projects the OA balance to
//! retirement under each, then recommends the one with the highest net wealth.

mod projection;
mod scenario;

pub use projection::project_scenario;
pub use scenario::{AgeBalance, CpfScenario, CpfUsage, ScenarioKind};

use crate::config::RegulatoryConfig;
use crate::mortgage;
use serde::{Deserialize, Serialize};

/// Facts for a CPF usage comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpfOptimizerInput {
    pub property_price: f64,
    pub loan_amount: f64,
    pub annual_interest_rate: f64,
    pub loan_tenure_years: u32,
    #[serde(rename = "cpfOABalance")]
    pub cpf_oa_balance: f64,
    pub current_age: u32,
    pub retirement_age: u32,
    #[serde(default, rename = "monthlyOAContribution")]
    pub monthly_oa_contribution: f64,
}

/// All three scenarios with the recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpfComparison {
    pub scenario_a: CpfScenario,
    pub scenario_b: CpfScenario,
    pub scenario_c: CpfScenario,
    pub recommended: ScenarioKind,
    /// A.totalInterest − C.totalInterest
    pub interest_saved: f64,
    /// B.finalBalance − C.finalBalance
    #[serde(rename = "cpfReduction")]
    pub cpf_reduction: f64,
}

impl CpfComparison {
    pub fn scenario(&self, kind: ScenarioKind) -> &CpfScenario {
        match kind {
            ScenarioKind::MaximumCpf => &self.scenario_a,
            ScenarioKind::FullCash => &self.scenario_b,
            ScenarioKind::OptimizedSplit => &self.scenario_c,
        }
    }

    pub fn scenarios(&self) -> [&CpfScenario; 3] {
        [&self.scenario_a, &self.scenario_b, &self.scenario_c]
    }

    pub fn recommended_scenario(&self) -> &CpfScenario {
        self.scenario(self.recommended)
    }
}

/// Compare the three CPF strategies for one loan
pub fn optimize_cpf_usage(input: &CpfOptimizerInput, config: &RegulatoryConfig) -> CpfComparison {
    let schedule = mortgage::amortization_schedule(
        input.loan_amount,
        input.annual_interest_rate,
        input.loan_tenure_years,
    );
    let installment = schedule.monthly_payment;
    let mortgage_interest = schedule.total_interest();

    let run = |kind| project_scenario(kind, input, &config.cpf, installment, mortgage_interest);
    let scenario_a = run(ScenarioKind::MaximumCpf);
    let scenario_b = run(ScenarioKind::FullCash);
    let scenario_c = run(ScenarioKind::OptimizedSplit);

    let recommended = recommend([&scenario_a, &scenario_b, &scenario_c]);
    log::debug!(
        "CPF optimizer: recommended scenario {} ({})",
        recommended.letter(),
        recommended.name()
    );

    let interest_saved = scenario_a.total_interest - scenario_c.total_interest;
    let cpf_reduction =
        scenario_b.projected_cpf_oa_at_retirement - scenario_c.projected_cpf_oa_at_retirement;

    CpfComparison {
        scenario_a,
        scenario_b,
        scenario_c,
        recommended,
        interest_saved,
        cpf_reduction,
    }
}

/// Highest net wealth at retirement; ties go to the earliest kind in the tie-break order
pub fn recommend(scenarios: [&CpfScenario; 3]) -> ScenarioKind {
    let mut best: Option<&CpfScenario> = None;

    for kind in ScenarioKind::TIE_BREAK_ORDER {
        let Some(candidate) = scenarios.iter().copied().find(|s| s.kind == kind) else {
            continue;
        };
        match best {
            Some(current) if candidate.net_wealth_at_retirement <= current.net_wealth_at_retirement => {}
            _ => best = Some(candidate),
        }
    }

    best.map(|s| s.kind).unwrap_or(ScenarioKind::OptimizedSplit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(rate: f64) -> CpfOptimizerInput {
        CpfOptimizerInput {
            property_price: 1_000_000.0,
            loan_amount: 750_000.0,
            annual_interest_rate: rate,
            loan_tenure_years: 25,
            cpf_oa_balance: 400_000.0,
            current_age: 35,
            retirement_age: 65,
            monthly_oa_contribution: 0.0,
        }
    }

    #[test]
    fn test_full_cash_never_below_maximum_cpf() {
        let config = RegulatoryConfig::singapore_2024();
        for rate in [0.005, 0.015, 0.025, 0.035, 0.05] {
            let comparison = optimize_cpf_usage(&input(rate), &config);
            assert!(
                comparison.scenario_b.projected_cpf_oa_at_retirement
                    >= comparison.scenario_a.projected_cpf_oa_at_retirement,
                "rate {}",
                rate
            );
        }
    }

    #[test]
    fn test_same_loan_in_every_scenario() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.035), &config);
        let expected = mortgage::monthly_repayment(750_000.0, 0.035, 25);

        for scenario in comparison.scenarios() {
            assert_relative_eq!(scenario.monthly_installment, expected, max_relative = 1e-12);
            assert_eq!(scenario.mortgage_interest, comparison.scenario_a.mortgage_interest);
            assert_relative_eq!(
                scenario.cpf_down_payment + scenario.cash_down_payment,
                250_000.0,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_optimized_split_uses_cpf_for_down_payment_on_expensive_loan() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.04), &config);
        let c = &comparison.scenario_c;

        assert_eq!(c.cpf_down_payment, 250_000.0);
        assert_eq!(c.cash_down_payment, 0.0);
        assert_eq!(c.total_cpf_installments, 0.0);
        assert!(comparison.cpf_reduction > 0.0);
        assert!(comparison.interest_saved > 0.0);
    }

    #[test]
    fn test_optimized_split_matches_full_cash_on_cheap_loan() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.02), &config);

        assert_eq!(
            comparison.scenario_c.projected_cpf_oa_at_retirement,
            comparison.scenario_b.projected_cpf_oa_at_retirement
        );
        assert_eq!(comparison.cpf_reduction, 0.0);
        // B and C tie on net wealth, C wins the tie
        assert_eq!(comparison.recommended, ScenarioKind::OptimizedSplit);
    }

    #[test]
    fn test_total_interest_includes_accrued_cpf_interest() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.035), &config);

        let a = &comparison.scenario_a;
        assert!(a.cpf_accrued_interest > 0.0);
        assert_relative_eq!(
            a.total_interest,
            a.mortgage_interest + a.cpf_accrued_interest,
            max_relative = 1e-12
        );
        assert_eq!(comparison.scenario_b.cpf_accrued_interest, 0.0);
        assert_relative_eq!(
            comparison.interest_saved,
            a.total_interest - comparison.scenario_c.total_interest,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_net_wealth_is_oa_plus_price() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.035), &config);

        for scenario in comparison.scenarios() {
            assert_eq!(
                scenario.net_wealth_at_retirement,
                scenario.projected_cpf_oa_at_retirement + 1_000_000.0
            );
        }
        assert_eq!(comparison.recommended, ScenarioKind::FullCash);
    }

    #[test]
    fn test_recommend_replaces_only_on_strictly_greater() {
        let config = RegulatoryConfig::singapore_2024();
        let comparison = optimize_cpf_usage(&input(0.035), &config);

        let mut a = comparison.scenario_a.clone();
        let mut b = comparison.scenario_b.clone();
        let mut c = comparison.scenario_c.clone();
        a.net_wealth_at_retirement = 2_000_000.0;
        b.net_wealth_at_retirement = 2_000_000.0;
        c.net_wealth_at_retirement = 1_999_999.0;
        assert_eq!(recommend([&a, &b, &c]), ScenarioKind::MaximumCpf);

        c.net_wealth_at_retirement = 2_000_000.0;
        assert_eq!(recommend([&a, &b, &c]), ScenarioKind::OptimizedSplit);
    }

    #[test]
    fn test_input_json_defaults_contribution() {
        let json = r#"{
            "propertyPrice": 900000, "loanAmount": 600000, "annualInterestRate": 0.03,
            "loanTenureYears": 25, "cpfOABalance": 120000, "currentAge": 32, "retirementAge": 65
        }"#;
        let parsed: CpfOptimizerInput = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.monthly_oa_contribution, 0.0);
        assert_eq!(parsed.cpf_oa_balance, 120_000.0);
    }
}
