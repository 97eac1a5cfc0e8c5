//! Buyer's Stamp Duty and other progressive-tier charges

use serde::{Deserialize, Serialize};

use crate::config::ValueTier;

/// Charge on the portion of an amount falling inside one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierCharge {
    pub label: String,
    pub taxable_amount: f64,
    pub rate: f64,
    pub duty: f64,
}

/// Walk ordered tiers consuming `amount` band by band.
///
/// Non-positive amounts produce no charges.
pub fn progressive_charges(tiers: &[ValueTier], amount: f64) -> Vec<TierCharge> {
    let mut charges = Vec::new();
    if !(amount > 0.0) {
        return charges;
    }

    let mut remaining = amount;
    for tier in tiers {
        if remaining <= 0.0 {
            break;
        }
        let taxable_amount = remaining.min(tier.width());
        charges.push(TierCharge {
            label: tier.label.clone(),
            taxable_amount,
            rate: tier.rate,
            duty: taxable_amount * tier.rate,
        });
        remaining -= taxable_amount;
    }

    charges
}

/// Sum of a progressive schedule applied to `amount`
pub fn progressive_total(tiers: &[ValueTier], amount: f64) -> f64 {
    progressive_charges(tiers, amount).iter().map(|c| c.duty).sum()
}

/// Buyer's Stamp Duty on a purchase price
pub fn calculate_bsd(tiers: &[ValueTier], purchase_price: f64) -> f64 {
    progressive_total(tiers, purchase_price)
}
