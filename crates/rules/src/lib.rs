//! Cross-document verification rules.
//!
//! Every rule is an independent, side-effect-free comparator over an
//! [`Entity`]. Results are built only through the factory functions in this
//! crate so a result's severity and source documents always mirror the rule
//! that produced it.

mod address;
mod constitution;
mod dates;
mod names;
mod pan;

use std::sync::Arc;

use docverify_model::{Details, DocumentKind, Entity, Severity, Status};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use address::{
    compare_addresses, AddressComparison, FactoryAddressMatch, PinMatch, PrincipalAddressMatch,
    COMPARED_ADDRESS_FIELDS, PARTIAL_ADDRESS_THRESHOLD,
};
pub use constitution::ConstitutionMatch;
pub use dates::{
    classify_age, CommencementDateCheck, EntityAgeCheck, EntityAgeStatus, IncorporationDateMatch,
    NEW_ENTITY_MAX_YEARS,
};
pub use names::NameMatch;
pub use pan::PanMatch;

/// Unexpected failure inside a rule. The engine turns these into SKIPPED
/// results; they never abort a verification run.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Internal rule error: {0}")]
    Internal(String),
}

/// A verification rule.
///
/// Implementations are stateless after construction and must be total over
/// any `Entity`: missing data is a SKIPPED result, not an error.
pub trait Rule: Send + Sync {
    /// Globally unique identifier (e.g. `NAME_MATCH_PAN_GST`)
    fn rule_id(&self) -> &str;

    /// Human-readable description of what is checked
    fn description(&self) -> &str;

    /// Fixed importance tier
    fn severity(&self) -> Severity;

    /// Documents that must be present for the rule to run
    fn source_docs(&self) -> &[DocumentKind];

    /// Evaluate the rule against an entity
    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError>;
}

/// Outcome of one rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleResult {
    rule_id: String,
    status: Status,
    message: String,
    severity: Severity,
    source_docs: Vec<DocumentKind>,
    details: Details,
}

impl RuleResult {
    fn from_rule<R: Rule + ?Sized>(
        rule: &R,
        status: Status,
        message: String,
        details: Details,
    ) -> Self {
        Self {
            rule_id: rule.rule_id().to_string(),
            status,
            message,
            severity: rule.severity(),
            source_docs: rule.source_docs().to_vec(),
            details,
        }
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn source_docs(&self) -> &[DocumentKind] {
        &self.source_docs
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    /// Why the rule was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&str> {
        self.details.get("skip_reason").and_then(Value::as_str)
    }

    pub fn is_critical_failure(&self) -> bool {
        self.status == Status::Fail && self.severity == Severity::Critical
    }
}

/// Build a PASS result for `rule`.
pub fn pass_result<R: Rule + ?Sized>(
    rule: &R,
    message: impl Into<String>,
    details: Details,
) -> RuleResult {
    RuleResult::from_rule(rule, Status::Pass, message.into(), details)
}

/// Build a FAIL result for `rule`.
pub fn fail_result<R: Rule + ?Sized>(
    rule: &R,
    message: impl Into<String>,
    details: Details,
) -> RuleResult {
    RuleResult::from_rule(rule, Status::Fail, message.into(), details)
}

/// Build a WARNING result for `rule`.
pub fn warning_result<R: Rule + ?Sized>(
    rule: &R,
    message: impl Into<String>,
    details: Details,
) -> RuleResult {
    RuleResult::from_rule(rule, Status::Warning, message.into(), details)
}

/// Build a SKIPPED result carrying `reason` as `details.skip_reason`.
pub fn skip_result<R: Rule + ?Sized>(rule: &R, reason: impl Into<String>) -> RuleResult {
    let reason = reason.into();
    let mut details = Details::new();
    details.insert("skip_reason".into(), Value::String(reason.clone()));
    RuleResult::from_rule(rule, Status::Skipped, format!("Skipped: {reason}"), details)
}

/// Build the SKIPPED result recorded when a rule faults during execution.
pub fn fault_result<R: Rule + ?Sized>(rule: &R, error: &str) -> RuleResult {
    let message = format!("Rule execution error: {error}");
    let mut details = Details::new();
    details.insert("error".into(), Value::String(error.to_string()));
    details.insert("skip_reason".into(), Value::String(message.clone()));
    RuleResult::from_rule(rule, Status::Skipped, message, details)
}

/// Whether every document the rule needs carries data.
pub fn has_required_data<R: Rule + ?Sized>(rule: &R, entity: &Entity) -> bool {
    rule.source_docs().iter().all(|doc| entity.has(*doc))
}

/// SKIPPED result naming the required documents, if any are missing.
pub fn skip_if_missing<R: Rule + ?Sized>(rule: &R, entity: &Entity) -> Option<RuleResult> {
    if has_required_data(rule, entity) {
        return None;
    }
    let docs: Vec<&str> = rule
        .source_docs()
        .iter()
        .map(DocumentKind::display_name)
        .collect();
    Some(skip_result(rule, format!("Missing {} data", docs.join(" or "))))
}

/// Convert a `json!({...})` object literal into a details map.
pub fn to_details(value: Value) -> Details {
    match value {
        Value::Object(map) => map,
        _ => Details::new(),
    }
}

/// Every built-in rule, in registration order.
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(NameMatch::pan_gst()),
        Arc::new(NameMatch::pan_udyam()),
        Arc::new(NameMatch::gst_udyam()),
        Arc::new(PanMatch::gst()),
        Arc::new(PanMatch::udyam()),
        Arc::new(IncorporationDateMatch),
        Arc::new(EntityAgeCheck::default()),
        Arc::new(CommencementDateCheck),
        Arc::new(ConstitutionMatch),
        Arc::new(PinMatch),
        Arc::new(PrincipalAddressMatch),
        Arc::new(FactoryAddressMatch),
    ]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use docverify_model::{
        Entity, FactoryAddress, GstRecord, NormalizedAddress, PanRecord, UdyamRecord,
    };

    pub fn address(pin: &str, city: &str, state: &str) -> NormalizedAddress {
        NormalizedAddress {
            city: city.into(),
            state: state.into(),
            pin: pin.into(),
            full_address: [city, state, pin]
                .iter()
                .filter(|v| !v.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(", "),
            ..Default::default()
        }
    }

    /// A consistent three-document entity for one private limited company.
    pub fn consistent_entity() -> Entity {
        Entity {
            pan: PanRecord {
                legal_name: "STELLINOX STAINLESS PRIVATE LIMITED".into(),
                pan: "ABFCS7205N".into(),
                pan_type: "COMPANY".into(),
                incorporation_date: "11/03/2021".into(),
                raw_name: "STELLINOX STAINLESS PRIVATE LIMITED".into(),
            },
            gst: GstRecord {
                legal_name: "STELLINOX STAINLESS PRIVATE LIMITED".into(),
                pan: "ABFCS7205N".into(),
                gst_number: "24ABFCS7205N1Z3".into(),
                constitution: "PRIVATE LIMITED".into(),
                principal_address: address("380060", "AHMEDABAD", "GUJARAT"),
                additional_places: "Survey No 45, Changodar, Ahmedabad, Gujarat, 382213".into(),
                total_additional_places: "1".into(),
                raw_name: "STELLINOX STAINLESS PRIVATE LIMITED".into(),
                raw_constitution: "Private Limited Company".into(),
            },
            udyam: UdyamRecord {
                legal_name: "STELLINOX STAINLESS PRIVATE LIMITED".into(),
                pan: "ABFCS7205N".into(),
                udyam_number: "UDYAM-GJ-01-0090271".into(),
                incorporation_date: "11/03/2021".into(),
                commencement_date: "15/04/2021".into(),
                registered_address: address("380060", "AHMEDABAD", "GUJARAT"),
                factory_addresses: vec![FactoryAddress {
                    unit_name: "UNIT 1".into(),
                    address: address("382213", "", "GUJARAT"),
                }],
                enterprise_type: "MICRO".into(),
                mobile: String::new(),
                email: String::new(),
                raw_name: "M/S STELLINOX STAINLESS PRIVATE LIMITED".into(),
            },
        }
    }
}
