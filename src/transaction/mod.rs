//! Transaction facts: buyers, property and sale details

mod data;

pub use data::{
    effective_residency, whole_months_between, Buyer, IncomeProfile, LoanType, PropertyType,
    ResidencyStatus, SaleFacts,
};
