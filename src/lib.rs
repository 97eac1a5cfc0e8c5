//! Property Engine - Regulatory calculations for Singapore residential property
//!
//! This library provides:
//! - Buyer's, Additional Buyer's and Seller's Stamp Duty (BSD, ABSD, SSD)
//! - Borrowing limits (TDSR, MSR) and maximum loan sizing
//! - Mortgage repayment and amortization schedules
//! - CPF Ordinary Account usage comparison
//! - Affordability and total cost of ownership analysis
//!
//! All rates and tiers come from a validated [`RegulatoryConfig`], loaded from
//! `data/regulatory/`, a JSON snapshot, or the built-in 2024 tables.

pub mod config;
pub mod transaction;
pub mod resolver;
pub mod stamp_duty;
pub mod borrowing;
pub mod mortgage;
pub mod cpf;
pub mod affordability;
pub mod tco;

// Re-export commonly used types
pub use config::{ConfigError, LoadError, RegulatoryConfig, RegulatoryConfigData};
pub use transaction::{Buyer, IncomeProfile, LoanType, PropertyType, ResidencyStatus, SaleFacts};
pub use stamp_duty::{calculate_stamp_duty, StampDutyInput, StampDutyResult};
pub use borrowing::{calculate_max_loan, calculate_msr, calculate_tdsr, MaxLoanInput, MaxLoanResult, TdsrInput};
pub use mortgage::{amortization_schedule, monthly_repayment, mortgage_summary, MortgageSummary};
pub use cpf::{optimize_cpf_usage, CpfComparison, CpfOptimizerInput};
pub use affordability::{calculate_affordability, AffordabilityInput, AffordabilityResult};
pub use tco::{calculate_tco, TcoInput, TcoResult};
