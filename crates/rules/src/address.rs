//! Address comparisons between GST and Udyam.
//!
//! Registered office vs principal place of business, the PIN code on its
//! own, and factory units vs additional places of business.

use docverify_model::{AddressField, DocumentKind, Entity, NormalizedAddress, Severity};
use serde_json::json;

use crate::{
    fail_result, pass_result, skip_if_missing, skip_result, to_details, warning_result, Rule,
    RuleError, RuleResult,
};

/// Fields scored when comparing two addresses.
pub const COMPARED_ADDRESS_FIELDS: [AddressField; 5] = [
    AddressField::Pin,
    AddressField::City,
    AddressField::District,
    AddressField::State,
    AddressField::Locality,
];

/// Fraction of comparable fields that must agree for a partial match.
pub const PARTIAL_ADDRESS_THRESHOLD: f64 = 0.6;

/// Field-by-field comparison of a GST and a Udyam address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddressComparison {
    /// Fields present on both sides with equal values
    pub score: usize,
    /// Fields present on at least one side
    pub max_score: usize,
    pub matches: Vec<String>,
    pub mismatches: Vec<String>,
}

impl AddressComparison {
    pub fn ratio(&self) -> Option<f64> {
        if self.max_score == 0 {
            None
        } else {
            Some(self.score as f64 / self.max_score as f64)
        }
    }
}

/// Score two addresses over `COMPARED_ADDRESS_FIELDS`.
///
/// A field only counts toward `max_score` when at least one side has a value,
/// so a component neither extractor found does not drag the score down.
pub fn compare_addresses(gst: &NormalizedAddress, udyam: &NormalizedAddress) -> AddressComparison {
    let mut comparison = AddressComparison::default();

    for field in COMPARED_ADDRESS_FIELDS {
        let left = gst.get(field).trim().to_uppercase();
        let right = udyam.get(field).trim().to_uppercase();

        if left.is_empty() && right.is_empty() {
            continue;
        }
        comparison.max_score += 1;

        if left.is_empty() || right.is_empty() {
            continue;
        }
        if left == right {
            comparison.score += 1;
            comparison.matches.push(format!("{}: {left}", field.name()));
        } else {
            comparison
                .mismatches
                .push(format!("{}: GST='{left}' vs Udyam='{right}'", field.name()));
        }
    }

    comparison
}

/// PIN codes of the GST principal place and Udyam office must be equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinMatch;

impl Rule for PinMatch {
    fn rule_id(&self) -> &str {
        "PIN_MATCH_GST_UDYAM"
    }

    fn description(&self) -> &str {
        "PIN code should match between GST principal address and Udyam registered office"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Gst, DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let gst_pin = entity.gst.principal_address.pin.trim();
        let udyam_pin = entity.udyam.registered_address.pin.trim();

        if gst_pin.is_empty() || udyam_pin.is_empty() {
            return Ok(skip_result(self, "PIN code missing from one or both documents"));
        }

        let details = to_details(json!({ "gst_pin": gst_pin, "udyam_pin": udyam_pin }));
        if gst_pin == udyam_pin {
            Ok(pass_result(self, format!("PIN codes match: {gst_pin}"), details))
        } else {
            Ok(fail_result(self, "PIN codes do NOT match", details))
        }
    }
}

/// GST principal place of business should match the Udyam registered office.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrincipalAddressMatch;

impl Rule for PrincipalAddressMatch {
    fn rule_id(&self) -> &str {
        "ADDR_GST_PRINCIPAL_UDYAM_OFFICE"
    }

    fn description(&self) -> &str {
        "GST principal place of business should match Udyam registered office address"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Gst, DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let gst_addr = &entity.gst.principal_address;
        let udyam_addr = &entity.udyam.registered_address;
        let comparison = compare_addresses(gst_addr, udyam_addr);

        let Some(ratio) = comparison.ratio() else {
            return Ok(skip_result(
                self,
                "Address data missing from one or both documents",
            ));
        };

        let AddressComparison {
            score,
            max_score,
            matches,
            mismatches,
        } = comparison;
        let details = to_details(json!({
            "match_score": format!("{score}/{max_score}"),
            "gst_address": gst_addr.full_address,
            "udyam_address": udyam_addr.full_address,
            "matches": matches,
            "mismatches": mismatches,
        }));

        if score == max_score {
            Ok(pass_result(
                self,
                "GST principal address matches Udyam registered office",
                details,
            ))
        } else if ratio >= PARTIAL_ADDRESS_THRESHOLD {
            Ok(warning_result(
                self,
                format!("Partial address match ({score}/{max_score} fields)"),
                details,
            ))
        } else {
            Ok(fail_result(
                self,
                format!("Address mismatch ({score}/{max_score} fields match)"),
                details,
            ))
        }
    }
}

/// GST additional places of business should include the Udyam factory units.
///
/// Additional places are free text on the GST certificate, so a unit counts
/// as found when its PIN code appears anywhere in that text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactoryAddressMatch;

impl Rule for FactoryAddressMatch {
    fn rule_id(&self) -> &str {
        "ADDR_GST_ADDITIONAL_UDYAM_FACTORY"
    }

    fn description(&self) -> &str {
        "GST additional places of business should match Udyam unit/factory addresses"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Gst, DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let gst_additional = entity.gst.additional_places.as_str();
        let factories = &entity.udyam.factory_addresses;

        if gst_additional.trim().is_empty() {
            return Ok(skip_result(self, "No additional places in GST"));
        }
        if factories.is_empty() {
            return Ok(skip_result(self, "No factory/unit addresses in Udyam"));
        }

        let haystack = gst_additional.to_uppercase();
        let matching: Vec<_> = factories
            .iter()
            .filter(|f| !f.address.pin.is_empty() && haystack.contains(f.address.pin.as_str()))
            .map(|f| json!({ "pin": f.address.pin, "unit_name": f.unit_name }))
            .collect();

        let found = matching.len();
        let details = to_details(json!({
            "gst_additional_places": gst_additional,
            "udyam_factories": factories
                .iter()
                .map(|f| f.address.full_address.as_str())
                .collect::<Vec<_>>(),
            "matching_pins": matching,
        }));

        if found > 0 {
            Ok(pass_result(
                self,
                format!("Found {found} matching factory address(es) by PIN"),
                details,
            ))
        } else {
            Ok(warning_result(
                self,
                "Could not match GST additional places with Udyam factory addresses",
                details,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{address, consistent_entity};
    use docverify_model::{FactoryAddress, Status};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pin_match() {
        let result = PinMatch.validate(&consistent_entity()).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.details()["gst_pin"], "380060");
        assert_eq!(result.details()["udyam_pin"], "380060");
    }

    #[test]
    fn test_pin_mismatch() {
        let mut entity = consistent_entity();
        entity.udyam.registered_address.pin = "380061".into();

        let result = PinMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
    }

    #[test]
    fn test_pin_missing_skips() {
        let mut entity = consistent_entity();
        entity.gst.principal_address.pin.clear();

        let result = PinMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Skipped);
    }

    #[test]
    fn test_compare_addresses_ignores_fields_empty_on_both_sides() {
        let gst = address("380060", "AHMEDABAD", "GUJARAT");
        let udyam = address("380060", "AHMEDABAD", "MAHARASHTRA");

        let comparison = compare_addresses(&gst, &udyam);
        assert_eq!(comparison.max_score, 3);
        assert_eq!(comparison.score, 2);
        assert_eq!(
            comparison.mismatches,
            vec!["state: GST='GUJARAT' vs Udyam='MAHARASHTRA'".to_string()]
        );
    }

    #[test]
    fn test_one_sided_field_counts_against_score() {
        let gst = address("380060", "AHMEDABAD", "GUJARAT");
        let mut udyam = address("380060", "AHMEDABAD", "GUJARAT");
        udyam.district = "AHMEDABAD".into();

        let comparison = compare_addresses(&gst, &udyam);
        assert_eq!((comparison.score, comparison.max_score), (3, 4));
        assert!(comparison.mismatches.is_empty());
    }

    #[test]
    fn test_partial_address_match_warns() {
        let mut entity = consistent_entity();
        entity.udyam.registered_address = address("380060", "AHMEDABAD", "MAHARASHTRA");

        let result = PrincipalAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Warning);
        assert_eq!(result.details()["match_score"], "2/3");
    }

    #[test]
    fn test_full_address_match_passes() {
        let result = PrincipalAddressMatch.validate(&consistent_entity()).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.details()["match_score"], "3/3");
    }

    #[test]
    fn test_address_mismatch_fails() {
        let mut entity = consistent_entity();
        entity.udyam.registered_address = address("400001", "MUMBAI", "GUJARAT");

        let result = PrincipalAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
        assert_eq!(result.message(), "Address mismatch (1/3 fields match)");
    }

    #[test]
    fn test_partial_threshold_is_inclusive() {
        let full = |pin: &str, city: &str, state: &str, district: &str, locality: &str| {
            let mut addr = address(pin, city, state);
            addr.district = district.into();
            addr.locality = locality.into();
            addr
        };

        let mut entity = consistent_entity();
        entity.gst.principal_address =
            full("380060", "AHMEDABAD", "GUJARAT", "AHMEDABAD", "NARODA");

        // 3/5 sits exactly on the threshold
        entity.udyam.registered_address =
            full("380060", "AHMEDABAD", "GUJARAT", "GANDHINAGAR", "VATVA");
        let result = PrincipalAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Warning);
        assert_eq!(result.details()["match_score"], "3/5");

        entity.udyam.registered_address =
            full("380060", "AHMEDABAD", "MAHARASHTRA", "GANDHINAGAR", "VATVA");
        let result = PrincipalAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
        assert_eq!(result.message(), "Address mismatch (2/5 fields match)");
    }

    #[test]
    fn test_no_comparable_address_fields_skips() {
        let mut entity = consistent_entity();
        entity.gst.principal_address = Default::default();
        entity.udyam.registered_address = Default::default();

        let result = PrincipalAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Skipped);
    }

    #[test]
    fn test_factory_pin_found_in_additional_places() {
        let result = FactoryAddressMatch.validate(&consistent_entity()).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.details()["matching_pins"][0]["pin"], "382213");
        assert_eq!(result.details()["matching_pins"][0]["unit_name"], "UNIT 1");
    }

    #[test]
    fn test_factory_pin_not_found_warns() {
        let mut entity = consistent_entity();
        entity.udyam.factory_addresses = vec![FactoryAddress {
            unit_name: "UNIT 9".into(),
            address: address("110001", "DELHI", "DELHI"),
        }];

        let result = FactoryAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Warning);
    }

    #[test]
    fn test_factory_without_pin_never_matches() {
        let mut entity = consistent_entity();
        entity.udyam.factory_addresses = vec![FactoryAddress::default()];

        let result = FactoryAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Warning);
    }

    #[test]
    fn test_factory_check_skips_without_additional_places() {
        let mut entity = consistent_entity();
        entity.gst.additional_places.clear();

        let result = FactoryAddressMatch.validate(&entity).unwrap();
        assert_eq!(result.skip_reason(), Some("No additional places in GST"));
    }
}
