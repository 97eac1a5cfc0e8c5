//! Additional Buyer's Stamp Duty rate resolution

use crate::config::{AbsdRate, RegulatoryConfig};
use crate::resolver::{rank_of, ResolvedRate, TableResolver};
use crate::transaction::{PropertyType, ResidencyStatus};

/// Resolve the ABSD rate for an (already effective) residency status.
///
/// Entity purchases use the flat entity rate. Otherwise the table is searched
/// exact-first; when the requested property count is beyond what is
/// tabulated, the highest tabulated count for the residency applies.
pub fn resolve_absd_rate(
    config: &RegulatoryConfig,
    residency: ResidencyStatus,
    property_type: PropertyType,
    existing_properties: u32,
) -> ResolvedRate {
    if residency == ResidencyStatus::Entity {
        return ResolvedRate::direct(
            config.absd_entity_rate,
            "Entity or trust purchase: flat rate applies regardless of property count",
        );
    }

    let resolver = TableResolver::new()
        .exact("exact match", move |r: &AbsdRate| {
            r.residency_status == residency
                && r.property_type == property_type
                && r.existing_properties == existing_properties
        })
        .fallback(
            "highest tabulated property count for residency and property type",
            move |r: &AbsdRate| {
                r.residency_status == residency
                    && r.property_type == property_type
                    && r.existing_properties <= existing_properties
            },
            |r| r.existing_properties as i64,
        )
        .fallback(
            "highest tabulated property count for residency",
            move |r: &AbsdRate| r.residency_status == residency,
            |r| r.existing_properties as i64,
        )
        .fallback("highest tabulated rate", |_: &AbsdRate| true, |r| rank_of(r.rate));

    match resolver.resolve(&config.absd_rates) {
        Some(hit) if hit.was_fallback => {
            log::debug!(
                "ABSD for {:?}/{}/{} resolved by fallback: {} -> {:.2}%",
                residency,
                property_type.as_str(),
                existing_properties,
                hit.step,
                hit.entry.rate * 100.0
            );
            ResolvedRate {
                rate: hit.entry.rate,
                rationale: format!("{} (fallback: {})", hit.entry.rationale, hit.step),
                was_fallback: true,
            }
        }
        Some(hit) => ResolvedRate::direct(hit.entry.rate, hit.entry.rationale.clone()),
        // Validation guarantees a non-empty table
        None => ResolvedRate {
            rate: 0.0,
            rationale: "no ABSD table entries".to_string(),
            was_fallback: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegulatoryConfigData;

    #[test]
    fn test_citizen_second_condo() {
        let config = RegulatoryConfig::singapore_2024();
        let rate = resolve_absd_rate(&config, ResidencyStatus::SingaporeCitizen, PropertyType::Condo, 1);

        assert_eq!(rate.rate, 0.20);
        assert!(!rate.was_fallback);
        assert!(rate.rationale.contains("second"));
    }

    #[test]
    fn test_beyond_tabulated_count_uses_highest_entry() {
        let config = RegulatoryConfig::singapore_2024();

        let fifth = resolve_absd_rate(&config, ResidencyStatus::SingaporeCitizen, PropertyType::Condo, 4);
        assert_eq!(fifth.rate, 0.30);
        assert!(fifth.was_fallback);
        assert!(fifth.rationale.contains("fallback"));

        let pr_third = resolve_absd_rate(&config, ResidencyStatus::PermanentResident, PropertyType::Landed, 7);
        assert_eq!(pr_third.rate, 0.35);

        let foreigner_second = resolve_absd_rate(&config, ResidencyStatus::Foreigner, PropertyType::Condo, 1);
        assert_eq!(foreigner_second.rate, 0.60);
        assert!(foreigner_second.was_fallback);
    }

    #[test]
    fn test_fallback_rate_equals_highest_tabulated_below_request() {
        // Only counts 0..=1 tabulated for citizens: 3 existing resolves to the 1-property rate
        let mut data = RegulatoryConfigData::singapore_2024();
        data.absd_rates
            .retain(|r| !(r.residency_status == ResidencyStatus::SingaporeCitizen && r.existing_properties == 2));
        let config = data.build().unwrap();

        let rate = resolve_absd_rate(&config, ResidencyStatus::SingaporeCitizen, PropertyType::Condo, 3);
        assert_eq!(rate.rate, 0.20);
        assert!(rate.was_fallback);
    }

    #[test]
    fn test_missing_property_type_falls_back_to_residency() {
        let mut data = RegulatoryConfigData::singapore_2024();
        data.absd_rates.retain(|r| r.property_type != PropertyType::Landed);
        let config = data.build().unwrap();

        let rate = resolve_absd_rate(&config, ResidencyStatus::PermanentResident, PropertyType::Landed, 0);
        assert_eq!(rate.rate, 0.35);
        assert!(rate.rationale.contains("for residency)"));
    }

    #[test]
    fn test_entity_bypasses_table() {
        let config = RegulatoryConfig::singapore_2024();
        let rate = resolve_absd_rate(&config, ResidencyStatus::Entity, PropertyType::Condo, 0);

        assert_eq!(rate.rate, 0.65);
        assert!(!rate.was_fallback);
    }
}
