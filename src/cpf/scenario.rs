//! CPF usage strategies and their per-scenario results

use serde::{Deserialize, Serialize};

/// Named CPF usage strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Scenario A: CPF first for down payment and installments
    MaximumCpf,
    /// Scenario B: everything in cash, CPF untouched
    FullCash,
    /// Scenario C: CPF for the down payment only when the loan costs more than the OA pays
    OptimizedSplit,
}

impl ScenarioKind {
    /// Presentation order
    pub const ALL: [ScenarioKind; 3] = [
        ScenarioKind::MaximumCpf,
        ScenarioKind::FullCash,
        ScenarioKind::OptimizedSplit,
    ];

    /// Order used when picking a winner; earlier entries win ties
    pub const TIE_BREAK_ORDER: [ScenarioKind; 3] = [
        ScenarioKind::OptimizedSplit,
        ScenarioKind::MaximumCpf,
        ScenarioKind::FullCash,
    ];

    pub fn letter(&self) -> char {
        match self {
            ScenarioKind::MaximumCpf => 'A',
            ScenarioKind::FullCash => 'B',
            ScenarioKind::OptimizedSplit => 'C',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::MaximumCpf => "Maximum CPF",
            ScenarioKind::FullCash => "Full Cash",
            ScenarioKind::OptimizedSplit => "Optimized Split",
        }
    }

    /// How the strategy draws on the OA for a loan at `loan_rate`
    pub fn usage(&self, loan_rate: f64, oa_rate: f64) -> CpfUsage {
        match self {
            ScenarioKind::MaximumCpf => CpfUsage {
                down_payment: true,
                installments: true,
            },
            ScenarioKind::FullCash => CpfUsage::NONE,
            ScenarioKind::OptimizedSplit if loan_rate > oa_rate => CpfUsage {
                down_payment: true,
                installments: false,
            },
            ScenarioKind::OptimizedSplit => CpfUsage::NONE,
        }
    }
}

/// Which payments are drawn from the OA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpfUsage {
    pub down_payment: bool,
    pub installments: bool,
}

impl CpfUsage {
    pub const NONE: CpfUsage = CpfUsage {
        down_payment: false,
        installments: false,
    };
}

/// OA balance on a birthday
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBalance {
    pub age: u32,
    pub balance: f64,
}

/// Projection result for one strategy
///
/// Installment totals cover the projection window (current age to retirement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpfScenario {
    pub kind: ScenarioKind,
    pub usage: CpfUsage,
    pub cpf_down_payment: f64,
    pub cash_down_payment: f64,
    pub monthly_installment: f64,
    pub total_cpf_installments: f64,
    pub total_cash_installments: f64,
    /// Mortgage interest over the full tenure, identical across scenarios
    pub mortgage_interest: f64,
    /// Interest the withdrawn CPF would have earned by retirement
    pub cpf_accrued_interest: f64,
    pub total_interest: f64,
    #[serde(rename = "projectedCPFOAAtRetirement")]
    pub projected_cpf_oa_at_retirement: f64,
    pub net_wealth_at_retirement: f64,
    pub balance_by_age: Vec<AgeBalance>,
}

impl CpfScenario {
    pub fn total_cpf_used(&self) -> f64 {
        self.cpf_down_payment + self.total_cpf_installments
    }

    pub fn total_cash_outlay(&self) -> f64 {
        self.cash_down_payment + self.total_cash_installments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimized_split_follows_rate_spread() {
        let expensive = ScenarioKind::OptimizedSplit.usage(0.04, 0.025);
        assert!(expensive.down_payment);
        assert!(!expensive.installments);

        let cheap = ScenarioKind::OptimizedSplit.usage(0.02, 0.025);
        assert_eq!(cheap, ScenarioKind::FullCash.usage(0.02, 0.025));

        // Equal rates preserve CPF
        assert_eq!(ScenarioKind::OptimizedSplit.usage(0.025, 0.025), CpfUsage::NONE);
    }

    #[test]
    fn test_letters() {
        let letters: String = ScenarioKind::ALL.iter().map(|k| k.letter()).collect();
        assert_eq!(letters, "ABC");
    }
}
