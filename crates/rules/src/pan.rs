//! PAN number consistency.

use docverify_model::{DocumentKind, Entity, Severity};
use docverify_normalize::normalize_pan;
use serde_json::json;

use crate::{
    fail_result, pass_result, skip_if_missing, skip_result, to_details, Rule, RuleError,
    RuleResult,
};

/// The PAN card's number must equal the PAN carried by another document.
///
/// For GST this is the PAN embedded in the GSTIN, derived by the adapter.
#[derive(Debug, Clone)]
pub struct PanMatch {
    rule_id: &'static str,
    description: &'static str,
    docs: [DocumentKind; 2],
}

impl PanMatch {
    pub fn gst() -> Self {
        Self {
            rule_id: "PAN_MATCH_GST",
            description: "PAN number should match PAN portion of GST number (positions 3-12)",
            docs: [DocumentKind::Pan, DocumentKind::Gst],
        }
    }

    pub fn udyam() -> Self {
        Self {
            rule_id: "PAN_MATCH_UDYAM",
            description: "PAN number should match PAN in Udyam registration",
            docs: [DocumentKind::Pan, DocumentKind::Udyam],
        }
    }

    fn other(&self) -> DocumentKind {
        self.docs[1]
    }
}

impl Rule for PanMatch {
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

        let other = self.other();
        let pan_number = normalize_pan(&entity.pan.pan);
        let other_pan = match other {
            DocumentKind::Gst => normalize_pan(&entity.gst.pan),
            DocumentKind::Udyam => normalize_pan(&entity.udyam.pan),
            DocumentKind::Pan => pan_number.clone(),
        };

        if pan_number.is_empty() {
            return Ok(skip_result(self, "PAN number missing from PAN document"));
        }
        if other_pan.is_empty() {
            let reason = match other {
                DocumentKind::Gst => "Could not extract PAN from GST number",
                _ => "PAN number missing from Udyam registration",
            };
            return Ok(skip_result(self, reason));
        }

        let other_key = format!("{}_pan", other.key());

        if pan_number == other_pan {
            return Ok(pass_result(
                self,
                format!("PAN number matches {}", other.display_name()),
                to_details(json!({ "pan": pan_number, other_key: other_pan })),
            ));
        }

        let mut details = to_details(json!({ "pan": pan_number, other_key: other_pan }));
        if other == DocumentKind::Gst {
            details.insert("gst_number".into(), json!(entity.gst.gst_number));
        }
        Ok(fail_result(
            self,
            format!("PAN number does NOT match {}", other.display_name()),
            details,
        ))
    }
}
