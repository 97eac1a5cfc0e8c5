//! Stamp duty engine: BSD, ABSD and SSD
//!
//! All functions are pure; degenerate prices yield zero duty rather than
//! errors since callers may be working from partially entered forms.

mod absd;
mod bsd;
mod ssd;

pub use absd::resolve_absd_rate;
pub use bsd::{calculate_bsd, progressive_charges, progressive_total, TierCharge};
pub use ssd::{calculate_ssd, SsdOutcome};

use serde::{Deserialize, Serialize};

use crate::config::RegulatoryConfig;
use crate::resolver::ResolvedRate;
use crate::transaction::{PropertyType, ResidencyStatus, SaleFacts};

/// Facts needed to compute duties on a purchase, and optionally a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDutyInput {
    pub purchase_price: f64,
    pub residency: ResidencyStatus,
    /// Co-buyer on a joint purchase
    #[serde(default)]
    pub joint_residency: Option<ResidencyStatus>,
    pub property_type: PropertyType,
    /// Residential properties already owned
    #[serde(default)]
    pub existing_properties: u32,
    /// Present for sell-side calculations only
    #[serde(default)]
    pub sale: Option<SaleFacts>,
}

impl StampDutyInput {
    pub fn purchase(
        purchase_price: f64,
        residency: ResidencyStatus,
        property_type: PropertyType,
        existing_properties: u32,
    ) -> Self {
        Self {
            purchase_price,
            residency,
            joint_residency: None,
            property_type,
            existing_properties,
            sale: None,
        }
    }

    pub fn with_joint_buyer(mut self, residency: ResidencyStatus) -> Self {
        self.joint_residency = Some(residency);
        self
    }

    pub fn with_sale(mut self, sale: SaleFacts) -> Self {
        self.sale = Some(sale);
        self
    }

    /// Residency driving ABSD: the more restrictive of the co-owners
    pub fn effective_residency(&self) -> ResidencyStatus {
        match self.joint_residency {
            Some(other) => self.residency.more_restrictive(other),
            None => self.residency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDutyBreakdown {
    pub bsd_tiers: Vec<TierCharge>,
    pub effective_residency: ResidencyStatus,
    pub absd_rate: ResolvedRate,
    pub ssd: SsdOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StampDutyResult {
    pub bsd: f64,
    pub absd: f64,
    pub ssd: f64,
    pub total_stamp_duty: f64,
    pub breakdown: StampDutyBreakdown,
}

/// Compute BSD, ABSD and (for sales) SSD
pub fn calculate_stamp_duty(input: &StampDutyInput, config: &RegulatoryConfig) -> StampDutyResult {
    let effective_residency = input.effective_residency();
    let ssd = calculate_ssd(&config.ssd, input.sale.as_ref());

    if !(input.purchase_price > 0.0) {
        return StampDutyResult {
            bsd: 0.0,
            absd: 0.0,
            ssd: ssd.amount,
            total_stamp_duty: ssd.amount,
            breakdown: StampDutyBreakdown {
                bsd_tiers: Vec::new(),
                effective_residency,
                absd_rate: ResolvedRate::none(),
                ssd,
            },
        };
    }

    let bsd_tiers = progressive_charges(&config.bsd_tiers, input.purchase_price);
    let bsd: f64 = bsd_tiers.iter().map(|c| c.duty).sum();

    let absd_rate = resolve_absd_rate(
        config,
        effective_residency,
        input.property_type,
        input.existing_properties,
    );
    let absd = input.purchase_price * absd_rate.rate;

    log::debug!(
        "stamp duty on {:.2}: BSD {:.2}, ABSD {:.2} ({}), SSD {:.2}",
        input.purchase_price,
        bsd,
        absd,
        absd_rate.rationale,
        ssd.amount
    );

    StampDutyResult {
        bsd,
        absd,
        ssd: ssd.amount,
        total_stamp_duty: bsd + absd + ssd.amount,
        breakdown: StampDutyBreakdown {
            bsd_tiers,
            effective_residency,
            absd_rate,
            ssd,
        },
    }
}
