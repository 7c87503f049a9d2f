//! Business constitution consistency.

use docverify_model::{DocumentKind, Entity, Severity};
use docverify_normalize::infer_constitution_from_name;
use serde_json::json;

use crate::{
    pass_result, skip_if_missing, skip_result, to_details, warning_result, Rule, RuleError,
    RuleResult,
};

/// GST constitution of business should agree with the constitution implied
/// by the Udyam enterprise name.
///
/// Udyam certificates carry no constitution field, so it is inferred from
/// name suffixes such as "PVT LTD" or "LLP". When nothing can be inferred the
/// rule passes and asks for a manual check.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstitutionMatch;

impl Rule for ConstitutionMatch {
    fn rule_id(&self) -> &str {
        "CONSTITUTION_GST_UDYAM"
    }

    fn description(&self) -> &str {
        "GST constitution of business should be consistent with Udyam registration"
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

        let gst_constitution = entity.gst.constitution.as_str();
        if gst_constitution.is_empty() {
            return Ok(skip_result(self, "Constitution missing from GST certificate"));
        }

        let udyam_name = if entity.udyam.raw_name.trim().is_empty() {
            &entity.udyam.legal_name
        } else {
            &entity.udyam.raw_name
        };
        let inferred = infer_constitution_from_name(udyam_name);

        let details = to_details(json!({
            "gst_constitution": gst_constitution,
            "gst_raw_constitution": entity.gst.raw_constitution,
            "inferred_from_udyam": inferred.unwrap_or_default(),
            "udyam_name": udyam_name,
        }));

        match inferred {
            None => Ok(pass_result(
                self,
                "Could not infer constitution from Udyam name (check manually)",
                details,
            )),
            Some(inferred) if inferred == gst_constitution => Ok(pass_result(
                self,
                format!("Constitution match: {gst_constitution}"),
                details,
            )),
            Some(inferred) => Ok(warning_result(
                self,
                format!(
                    "Constitution may not match: GST='{gst_constitution}' vs inferred='{inferred}'"
                ),
                details,
            )),
        }
    }
}
