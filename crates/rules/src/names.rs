//! Legal name consistency between document pairs.

use docverify_model::{DocumentKind, Entity, Severity};
use docverify_normalize::normalize_text;
use serde_json::json;

use crate::{
    fail_result, pass_result, skip_if_missing, skip_result, to_details, Rule, RuleError,
    RuleResult,
};

/// Normalized legal names of two documents must be equal.
#[derive(Debug, Clone)]
pub struct NameMatch {
    rule_id: &'static str,
    description: &'static str,
    docs: [DocumentKind; 2],
}

impl NameMatch {
    pub fn pan_gst() -> Self {
        Self {
            rule_id: "NAME_MATCH_PAN_GST",
            description: "PAN legal name should match GST legal name",
            docs: [DocumentKind::Pan, DocumentKind::Gst],
        }
    }

    pub fn pan_udyam() -> Self {
        Self {
            rule_id: "NAME_MATCH_PAN_UDYAM",
            description: "PAN legal name should match Udyam enterprise name",
            docs: [DocumentKind::Pan, DocumentKind::Udyam],
        }
    }

    pub fn gst_udyam() -> Self {
        Self {
            rule_id: "NAME_MATCH_GST_UDYAM",
            description: "GST legal name should match Udyam enterprise name",
            docs: [DocumentKind::Gst, DocumentKind::Udyam],
        }
    }
}

/// (normalized, raw) name for a document.
fn names(entity: &Entity, kind: DocumentKind) -> (String, &str) {
    let (legal, raw) = match kind {
        DocumentKind::Pan => (&entity.pan.legal_name, &entity.pan.raw_name),
        DocumentKind::Gst => (&entity.gst.legal_name, &entity.gst.raw_name),
        DocumentKind::Udyam => (&entity.udyam.legal_name, &entity.udyam.raw_name),
    };
    (normalize_text(legal), raw.as_str())
}

impl Rule for NameMatch {
    fn rule_id(&self) -> &str {
        self.rule_id
    }

    fn description(&self) -> &str {
        self.description
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &self.docs
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let [a, b] = self.docs;
        let (name_a, raw_a) = names(entity, a);
        let (name_b, raw_b) = names(entity, b);

        if name_a.is_empty() || name_b.is_empty() {
            return Ok(skip_result(self, "Name field missing in one or both documents"));
        }

        let key_a = format!("{}_name", a.key());
        let key_b = format!("{}_name", b.key());

        if name_a == name_b {
            return Ok(pass_result(
                self,
                format!("{} name matches {} name", a.display_name(), b.display_name()),
                to_details(json!({ key_a: name_a, key_b: name_b })),
            ));
        }

        Ok(fail_result(
            self,
            format!(
                "{} name does NOT match {} name",
                a.display_name(),
                b.display_name()
            ),
            to_details(json!({
                key_a: name_a,
                key_b: name_b,
                format!("{}_raw", a.key()): raw_a,
                format!("{}_raw", b.key()): raw_b,
            })),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::consistent_entity;
    use docverify_model::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_names_match_after_normalization() {
        let mut entity = consistent_entity();
        entity.pan.legal_name = "M/s. Stellinox Stainless Pvt. Ltd.".into();
        entity.gst.legal_name = "STELLINOX STAINLESS PVT LTD".into();

        let result = NameMatch::pan_gst().validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.details()["pan_name"], "STELLINOX STAINLESS PVT LTD");
        assert_eq!(result.details()["gst_name"], "STELLINOX STAINLESS PVT LTD");
    }

    #[test]
    fn test_name_mismatch_fails_with_raw_names() {
        let mut entity = consistent_entity();
        entity.udyam.legal_name = "STELLINOX STEELS PRIVATE LIMITED".into();
        entity.udyam.raw_name = "Stellinox Steels Private Limited".into();

        let result = NameMatch::gst_udyam().validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
        assert_eq!(result.message(), "GST name does NOT match Udyam name");
        assert_eq!(result.details()["udyam_raw"], "Stellinox Steels Private Limited");
        assert_eq!(result.details()["gst_name"], "STELLINOX STAINLESS PRIVATE LIMITED");
    }

    #[test]
    fn test_missing_name_skips() {
        let mut entity = consistent_entity();
        entity.pan.legal_name.clear();

        let result = NameMatch::pan_udyam().validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Skipped);
        assert_eq!(
            result.skip_reason(),
            Some("Name field missing in one or both documents")
        );
    }
}
