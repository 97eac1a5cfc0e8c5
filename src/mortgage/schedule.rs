//! Amortization schedule output structures

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    /// Payment number (1-indexed)
    pub month: u32,
    pub payment: f64,
    pub principal_component: f64,
    pub interest_component: f64,
    /// Outstanding balance after this payment
    pub balance: f64,
    pub cumulative_interest: f64,
}

/// Schedule entry with its calendar payment date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedAmortizationEntry {
    pub payment_date: NaiveDate,
    #[serde(flatten)]
    pub entry: AmortizationEntry,
}

/// Complete schedule for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationSchedule {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub monthly_payment: f64,
    pub entries: Vec<AmortizationEntry>,
}

impl AmortizationSchedule {
    pub fn total_interest(&self) -> f64 {
        self.entries.last().map(|e| e.cumulative_interest).unwrap_or(0.0)
    }

    pub fn total_payment(&self) -> f64 {
        self.entries.iter().map(|e| e.payment).sum()
    }

    pub fn total_principal(&self) -> f64 {
        self.entries.iter().map(|e| e.principal_component).sum()
    }

    /// Interest paid over the first `months` payments
    pub fn interest_paid_through(&self, months: u32) -> f64 {
        if months == 0 {
            return 0.0;
        }
        let idx = (months as usize).min(self.entries.len());
        idx.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.cumulative_interest)
            .unwrap_or(0.0)
    }

    /// Outstanding balance after `months` payments
    pub fn balance_after(&self, months: u32) -> f64 {
        if months == 0 {
            return self.principal.max(0.0);
        }
        let idx = (months as usize).min(self.entries.len());
        idx.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.balance)
            .unwrap_or(0.0)
    }

    /// Attach calendar dates and totals. Payment `k` falls `k` months after `start_date`.
    pub fn summarize(&self, start_date: NaiveDate) -> MortgageSummary {
        let schedule: Vec<DatedAmortizationEntry> = self
            .entries
            .iter()
            .map(|entry| DatedAmortizationEntry {
                payment_date: start_date
                    .checked_add_months(Months::new(entry.month))
                    .unwrap_or(NaiveDate::MAX),
                entry: entry.clone(),
            })
            .collect();

        let total_payment = self.total_payment();
        let total_interest = self.total_interest();
        let interest_pct_of_total = if total_payment > 0.0 {
            total_interest / total_payment * 100.0
        } else {
            0.0
        };

        MortgageSummary {
            principal: self.principal,
            annual_rate: self.annual_rate,
            tenure_months: self.tenure_months,
            monthly_repayment: self.monthly_payment,
            total_payment,
            total_interest,
            total_principal: self.total_principal(),
            interest_pct_of_total,
            start_date,
            final_payment_date: schedule.last().map(|e| e.payment_date),
            schedule,
        }
    }
}

/// Schedule with calendar dates and headline totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageSummary {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
    pub monthly_repayment: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub total_principal: f64,
    /// Total interest as a percentage of total payments
    pub interest_pct_of_total: f64,
    pub start_date: NaiveDate,
    pub final_payment_date: Option<NaiveDate>,
    pub schedule: Vec<DatedAmortizationEntry>,
}
