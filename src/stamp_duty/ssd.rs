//! Seller's Stamp Duty on disposals within the holding period window

use serde::{Deserialize, Serialize};

use crate::config::SsdSchedule;
use crate::transaction::SaleFacts;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsdOutcome {
    pub rate: f64,
    pub amount: f64,
    /// Matching band label, `None` when exempt or not applicable
    pub band: Option<String>,
    pub exempt: bool,
}

impl SsdOutcome {
    fn exempt() -> Self {
        Self {
            rate: 0.0,
            amount: 0.0,
            band: None,
            exempt: true,
        }
    }
}

/// SSD for a sale; `None` (a purchase, not a disposal) attracts no duty
pub fn calculate_ssd(schedule: &SsdSchedule, sale: Option<&SaleFacts>) -> SsdOutcome {
    let Some(sale) = sale else {
        return SsdOutcome {
            exempt: false,
            ..SsdOutcome::exempt()
        };
    };

    if sale.holding_period_months >= schedule.exemption_threshold_months {
        return SsdOutcome::exempt();
    }

    let Some(tier) = schedule
        .tiers
        .iter()
        .find(|t| t.contains(sale.holding_period_months))
    else {
        log::warn!(
            "no SSD band covers a holding period of {} months; treating as exempt",
            sale.holding_period_months
        );
        return SsdOutcome::exempt();
    };

    let amount = if sale.sale_price > 0.0 {
        sale.sale_price * tier.rate
    } else {
        0.0
    };

    SsdOutcome {
        rate: tier.rate,
        amount,
        band: Some(tier.label.clone()),
        exempt: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RegulatoryConfig, SsdTier};
    use approx::assert_relative_eq;

    fn schedule() -> SsdSchedule {
        RegulatoryConfig::singapore_2024().ssd.clone()
    }

    #[test]
    fn test_ssd_at_eighteen_months() {
        let sale = SaleFacts::new(1_000_000.0, 18);
        let ssd = calculate_ssd(&schedule(), Some(&sale));

        assert_relative_eq!(ssd.amount, 80_000.0, max_relative = 1e-12);
        assert_eq!(ssd.rate, 0.08);
        assert!(!ssd.exempt);
        assert_eq!(ssd.band.as_deref(), Some("Held more than 1 and up to 2 years"));
    }

    #[test]
    fn test_band_boundaries() {
        let schedule = schedule();
        let rate_at = |months| calculate_ssd(&schedule, Some(&SaleFacts::new(100.0, months))).rate;

        assert_eq!(rate_at(0), 0.12);
        assert_eq!(rate_at(11), 0.12);
        assert_eq!(rate_at(12), 0.08);
        assert_eq!(rate_at(24), 0.04);
        assert_eq!(rate_at(35), 0.04);
        assert_eq!(rate_at(36), 0.0);
    }

    #[test]
    fn test_exempt_at_or_after_threshold_for_any_schedule() {
        let schedules = vec![
            schedule(),
            SsdSchedule {
                tiers: vec![SsdTier { min_months: 0, max_months: None, rate: 0.5, label: "all".into() }],
                exemption_threshold_months: 6,
            },
            SsdSchedule {
                tiers: vec![
                    SsdTier { min_months: 0, max_months: Some(24), rate: 0.16, label: "a".into() },
                    SsdTier { min_months: 24, max_months: Some(48), rate: 0.04, label: "b".into() },
                ],
                exemption_threshold_months: 48,
            },
        ];

        for schedule in &schedules {
            for months in schedule.exemption_threshold_months..schedule.exemption_threshold_months + 120 {
                let ssd = calculate_ssd(schedule, Some(&SaleFacts::new(2_500_000.0, months)));
                assert_eq!(ssd.amount, 0.0);
                assert!(ssd.exempt);
            }
        }
    }

    #[test]
    fn test_no_sale_means_no_ssd() {
        let ssd = calculate_ssd(&schedule(), None);
        assert_eq!(ssd.amount, 0.0);
        assert!(!ssd.exempt);
        assert!(ssd.band.is_none());
    }

    #[test]
    fn test_uncovered_period_treated_as_exempt() {
        // Bypasses validation: bands stop short of the threshold
        let schedule = SsdSchedule {
            tiers: vec![SsdTier { min_months: 0, max_months: Some(12), rate: 0.12, label: "a".into() }],
            exemption_threshold_months: 36,
        };
        let ssd = calculate_ssd(&schedule, Some(&SaleFacts::new(1_000_000.0, 20)));
        assert!(ssd.exempt);
        assert_eq!(ssd.amount, 0.0);
    }

    #[test]
    fn test_non_positive_sale_price() {
        let ssd = calculate_ssd(&schedule(), Some(&SaleFacts::new(0.0, 6)));
        assert_eq!(ssd.amount, 0.0);
        assert_eq!(ssd.rate, 0.12);
    }
}
