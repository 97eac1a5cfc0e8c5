//! Buyer and property facts used as calculation inputs

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Residency status of a buyer for stamp duty purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResidencyStatus {
    /// Singapore Citizen
    SingaporeCitizen,
    /// Singapore Permanent Resident
    PermanentResident,
    /// Foreign individual
    Foreigner,
    /// Company, trust or other non-individual purchaser
    Entity,
}

impl ResidencyStatus {
    /// Rank by ABSD exposure, higher is more restrictive
    pub fn restrictiveness(&self) -> u8 {
        match self {
            ResidencyStatus::SingaporeCitizen => 0,
            ResidencyStatus::PermanentResident => 1,
            ResidencyStatus::Foreigner => 2,
            ResidencyStatus::Entity => 3,
        }
    }

    /// The more restrictive of two statuses
    pub fn more_restrictive(self, other: ResidencyStatus) -> ResidencyStatus {
        if other.restrictiveness() > self.restrictiveness() {
            other
        } else {
            self
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResidencyStatus::SingaporeCitizen => "Singapore Citizen",
            ResidencyStatus::PermanentResident => "Permanent Resident",
            ResidencyStatus::Foreigner => "Foreigner",
            ResidencyStatus::Entity => "Entity",
        }
    }
}

/// Residential property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    /// HDB flat
    #[serde(rename = "HDB")]
    Hdb,
    /// Executive condominium
    #[serde(rename = "EC")]
    ExecutiveCondo,
    /// Private condominium or apartment
    Condo,
    /// Landed house
    Landed,
}

impl PropertyType {
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Hdb,
        PropertyType::ExecutiveCondo,
        PropertyType::Condo,
        PropertyType::Landed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Hdb => "HDB",
            PropertyType::ExecutiveCondo => "EC",
            PropertyType::Condo => "Condo",
            PropertyType::Landed => "Landed",
        }
    }
}

/// Source of the housing loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoanType {
    /// Loan from a bank or financial institution
    Bank,
    /// HDB concessionary loan
    #[serde(rename = "HDB")]
    Hdb,
}

impl FromStr for ResidencyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "sc" | "citizen" | "singaporecitizen" => Ok(ResidencyStatus::SingaporeCitizen),
            "pr" | "permanentresident" => Ok(ResidencyStatus::PermanentResident),
            "foreigner" | "fr" => Ok(ResidencyStatus::Foreigner),
            "entity" | "trust" => Ok(ResidencyStatus::Entity),
            _ => Err(format!("unknown residency status '{}'", s)),
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "hdb" => Ok(PropertyType::Hdb),
            "ec" | "executivecondo" => Ok(PropertyType::ExecutiveCondo),
            "condo" | "condominium" => Ok(PropertyType::Condo),
            "landed" => Ok(PropertyType::Landed),
            _ => Err(format!("unknown property type '{}'", s)),
        }
    }
}

impl FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bank" => Ok(LoanType::Bank),
            "hdb" => Ok(LoanType::Hdb),
            _ => Err(format!("unknown loan type '{}'", s)),
        }
    }
}

/// One applicant on a purchase or loan application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Buyer {
    pub residency: ResidencyStatus,

    /// Age in whole years
    pub age: u32,

    /// Fixed monthly income (salary)
    #[serde(default)]
    pub fixed_monthly_income: f64,

    /// Variable monthly income (commission, bonus, rental), before haircut
    #[serde(default)]
    pub variable_monthly_income: f64,
}

impl Buyer {
    pub fn new(residency: ResidencyStatus, age: u32, fixed_monthly_income: f64) -> Self {
        Self {
            residency,
            age,
            fixed_monthly_income,
            variable_monthly_income: 0.0,
        }
    }

    pub fn with_variable_income(mut self, variable_monthly_income: f64) -> Self {
        self.variable_monthly_income = variable_monthly_income;
        self
    }
}

/// Combined income of all applicants
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeProfile {
    pub fixed_monthly: f64,
    pub variable_monthly: f64,
}

impl IncomeProfile {
    /// Sum income streams across single or joint applicants
    pub fn from_buyers(buyers: &[Buyer]) -> Self {
        buyers.iter().fold(Self::default(), |acc, b| Self {
            fixed_monthly: acc.fixed_monthly + b.fixed_monthly_income.max(0.0),
            variable_monthly: acc.variable_monthly + b.variable_monthly_income.max(0.0),
        })
    }

    /// Gross income with no haircut applied
    pub fn gross_monthly(&self) -> f64 {
        self.fixed_monthly + self.variable_monthly
    }
}

/// Residency used for ABSD on a purchase by one or more buyers.
///
/// Liability follows the worst-positioned co-owner. An empty list is treated
/// as a Singapore Citizen purchase.
pub fn effective_residency(residencies: &[ResidencyStatus]) -> ResidencyStatus {
    residencies
        .iter()
        .copied()
        .reduce(ResidencyStatus::more_restrictive)
        .unwrap_or(ResidencyStatus::SingaporeCitizen)
}

/// Facts of a disposal, used for Seller's Stamp Duty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleFacts {
    pub sale_price: f64,
    pub holding_period_months: u32,
}

impl SaleFacts {
    pub fn new(sale_price: f64, holding_period_months: u32) -> Self {
        Self {
            sale_price,
            holding_period_months,
        }
    }

    /// Build from the original purchase date and the sale date
    pub fn from_dates(purchase_date: NaiveDate, sale_date: NaiveDate, sale_price: f64) -> Self {
        Self::new(sale_price, whole_months_between(purchase_date, sale_date))
    }
}

/// Completed calendar months from `start` to `end`, zero if `end` precedes `start`
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_residency_takes_most_restrictive() {
        use ResidencyStatus::*;

        assert_eq!(effective_residency(&[SingaporeCitizen]), SingaporeCitizen);
        assert_eq!(effective_residency(&[SingaporeCitizen, PermanentResident]), PermanentResident);
        assert_eq!(effective_residency(&[PermanentResident, SingaporeCitizen]), PermanentResident);
        assert_eq!(effective_residency(&[Foreigner, PermanentResident]), Foreigner);
        assert_eq!(effective_residency(&[SingaporeCitizen, Entity]), Entity);
        assert_eq!(effective_residency(&[]), SingaporeCitizen);
    }

    #[test]
    fn test_income_profile_sums_joint_applicants() {
        let buyers = vec![
            Buyer::new(ResidencyStatus::SingaporeCitizen, 32, 6_000.0).with_variable_income(1_000.0),
            Buyer::new(ResidencyStatus::PermanentResident, 30, 4_000.0),
        ];
        let income = IncomeProfile::from_buyers(&buyers);

        assert_eq!(income.fixed_monthly, 10_000.0);
        assert_eq!(income.variable_monthly, 1_000.0);
        assert_eq!(income.gross_monthly(), 11_000.0);
    }

    #[test]
    fn test_whole_months_between() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();

        assert_eq!(whole_months_between(d(2023, 1, 15), d(2024, 7, 15)), 18);
        assert_eq!(whole_months_between(d(2023, 1, 15), d(2024, 7, 14)), 17);
        assert_eq!(whole_months_between(d(2023, 1, 31), d(2023, 2, 28)), 0);
        assert_eq!(whole_months_between(d(2024, 1, 1), d(2023, 1, 1)), 0);
    }

    #[test]
    fn test_parse_from_command_line_names() {
        assert_eq!("SC".parse::<ResidencyStatus>(), Ok(ResidencyStatus::SingaporeCitizen));
        assert_eq!("permanent-resident".parse::<ResidencyStatus>(), Ok(ResidencyStatus::PermanentResident));
        assert_eq!("EC".parse::<PropertyType>(), Ok(PropertyType::ExecutiveCondo));
        assert_eq!("Executive Condo".parse::<PropertyType>(), Ok(PropertyType::ExecutiveCondo));
        assert_eq!("hdb".parse::<LoanType>(), Ok(LoanType::Hdb));
        assert!("villa".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_sale_facts_from_dates() {
        let purchase = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let sale = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let facts = SaleFacts::from_dates(purchase, sale, 1_200_000.0);

        assert_eq!(facts.holding_period_months, 36);
        assert_eq!(facts.sale_price, 1_200_000.0);
    }
}
