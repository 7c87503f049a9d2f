//! Incorporation date checks and entity age classification.

use chrono::{Local, NaiveDate};
use docverify_model::{DocumentKind, Entity, Severity};
use docverify_normalize::normalize_date;
use serde::Serialize;
use serde_json::json;

use crate::{
    fail_result, pass_result, skip_if_missing, skip_result, to_details, warning_result, Rule,
    RuleError, RuleResult,
};

/// Entities younger than this many years are classified NEW.
pub const NEW_ENTITY_MAX_YEARS: f64 = 2.0;

/// Date layout used on PAN and Udyam certificates.
const CERTIFICATE_DATE_FORMAT: &str = "%d/%m/%Y";

const DAYS_PER_YEAR: f64 = 365.25;

/// Incorporation dates on PAN and Udyam must be identical.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncorporationDateMatch;

impl Rule for IncorporationDateMatch {
    fn rule_id(&self) -> &str {
        "INCORPORATION_DATE_PAN_UDYAM"
    }

    fn description(&self) -> &str {
        "Date of incorporation on PAN should match Udyam registration"
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Pan, DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let pan_date = normalize_date(&entity.pan.incorporation_date);
        let udyam_date = normalize_date(&entity.udyam.incorporation_date);

        if pan_date.is_empty() {
            return Ok(skip_result(self, "Incorporation date missing from PAN"));
        }
        if udyam_date.is_empty() {
            return Ok(skip_result(self, "Incorporation date missing from Udyam"));
        }

        let details = to_details(json!({ "pan_date": pan_date, "udyam_date": udyam_date }));
        if pan_date == udyam_date {
            Ok(pass_result(
                self,
                format!("Incorporation dates match: {pan_date}"),
                details,
            ))
        } else {
            Ok(fail_result(self, "Incorporation dates do NOT match", details))
        }
    }
}

/// Whether an entity counts as newly incorporated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityAgeStatus {
    New,
    Existing,
}

impl EntityAgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Existing => "EXISTING",
        }
    }
}

/// Age in years (365.25-day years) on `today` and the resulting status.
pub fn classify_age(incorporated: NaiveDate, today: NaiveDate) -> (f64, EntityAgeStatus) {
    let age_years = (today - incorporated).num_days() as f64 / DAYS_PER_YEAR;
    let status = if age_years < NEW_ENTITY_MAX_YEARS {
        EntityAgeStatus::New
    } else {
        EntityAgeStatus::Existing
    };
    (age_years, status)
}

/// Classifies the entity as NEW or EXISTING from its Udyam incorporation date.
///
/// Informational: a parsable date always yields PASS with the
/// classification in the details.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityAgeCheck {
    as_of: Option<NaiveDate>,
}

impl EntityAgeCheck {
    /// Evaluate ages relative to a fixed date instead of today.
    pub fn as_of(date: NaiveDate) -> Self {
        Self { as_of: Some(date) }
    }

    fn today(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Rule for EntityAgeCheck {
    fn rule_id(&self) -> &str {
        "ENTITY_AGE_CHECK"
    }

    fn description(&self) -> &str {
        "Classify entity as new (< 2 years) or existing based on incorporation date"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let date_text = normalize_date(&entity.udyam.incorporation_date);
        if date_text.is_empty() {
            return Ok(skip_result(self, "Incorporation date not available"));
        }

        let Ok(incorporated) = NaiveDate::parse_from_str(&date_text, CERTIFICATE_DATE_FORMAT)
        else {
            return Ok(skip_result(
                self,
                format!("Could not parse date: {date_text}"),
            ));
        };

        let (age_years, status) = classify_age(incorporated, self.today());
        let rounded = (age_years * 10.0).round() / 10.0;

        Ok(pass_result(
            self,
            format!(
                "Entity is {} (incorporated {rounded:.1} years ago)",
                status.as_str()
            ),
            to_details(json!({
                "incorporation_date": date_text,
                "age_years": rounded,
                "entity_status": status,
                "enterprise_type": entity.udyam.enterprise_type,
            })),
        ))
    }
}

/// Same incorporation and commencement date hints at a pre-existing business
/// that registered late.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommencementDateCheck;

impl Rule for CommencementDateCheck {
    fn rule_id(&self) -> &str {
        "INCORPORATION_VS_COMMENCEMENT"
    }

    fn description(&self) -> &str {
        "Compare incorporation and commencement dates to detect existing entities"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn source_docs(&self) -> &[DocumentKind] {
        &[DocumentKind::Udyam]
    }

    fn validate(&self, entity: &Entity) -> Result<RuleResult, RuleError> {
        if let Some(skip) = skip_if_missing(self, entity) {
            return Ok(skip);
        }

        let incorporation = normalize_date(&entity.udyam.incorporation_date);
        let commencement = normalize_date(&entity.udyam.commencement_date);
        let details = to_details(json!({
            "incorporation_date": incorporation,
            "commencement_date": commencement,
        }));

        if incorporation.is_empty() || commencement.is_empty() {
            return Ok(pass_result(
                self,
                "Commencement date not available for comparison",
                details,
            ));
        }

        if incorporation == commencement {
            Ok(warning_result(
                self,
                "Incorporation and commencement dates are same - may indicate existing entity",
                details,
            ))
        } else {
            Ok(pass_result(
                self,
                "Incorporation and commencement dates differ",
                details,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::consistent_entity;
    use docverify_model::Status;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_incorporation_dates_match_across_separators() {
        let mut entity = consistent_entity();
        entity.pan.incorporation_date = "11-03-2021".into();

        let result = IncorporationDateMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.message(), "Incorporation dates match: 11/03/2021");
    }

    #[test]
    fn test_incorporation_dates_differ() {
        let mut entity = consistent_entity();
        entity.udyam.incorporation_date = "12/03/2021".into();

        let result = IncorporationDateMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
        assert_eq!(result.details()["pan_date"], "11/03/2021");
        assert_eq!(result.details()["udyam_date"], "12/03/2021");
    }

    #[test]
    fn test_reordered_components_do_not_match() {
        let mut entity = consistent_entity();
        entity.pan.incorporation_date = "2021-03-11".into();

        let result = IncorporationDateMatch.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Fail);
    }

    #[test]
    fn test_entity_age_existing() {
        let rule = EntityAgeCheck::as_of(date(2026, 10, 16));
        let result = rule.validate(&consistent_entity()).unwrap();

        assert_eq!(result.status(), Status::Pass);
        assert_eq!(result.details()["entity_status"], "EXISTING");
        assert_eq!(result.details()["age_years"], 5.6);
        assert_eq!(result.details()["enterprise_type"], "MICRO");
    }

    #[test]
    fn test_entity_age_new() {
        let rule = EntityAgeCheck::as_of(date(2022, 6, 1));
        let result = rule.validate(&consistent_entity()).unwrap();

        assert_eq!(result.details()["entity_status"], "NEW");
        assert!(result.message().starts_with("Entity is NEW"));
    }

    #[test]
    fn test_classify_age_boundary() {
        let incorporated = date(2021, 3, 11);
        let (_, status) = classify_age(incorporated, date(2023, 3, 10));
        assert_eq!(status, EntityAgeStatus::New);
        let (_, status) = classify_age(incorporated, date(2023, 3, 12));
        assert_eq!(status, EntityAgeStatus::Existing);
    }

    #[test]
    fn test_unparsable_date_skips() {
        let mut entity = consistent_entity();
        entity.udyam.incorporation_date = "2021/03/11".into();

        let result = EntityAgeCheck::as_of(date(2026, 1, 1))
            .validate(&entity)
            .unwrap();
        assert_eq!(result.status(), Status::Skipped);
        assert_eq!(result.skip_reason(), Some("Could not parse date: 2021/03/11"));
    }

    #[test]
    fn test_same_commencement_date_warns() {
        let mut entity = consistent_entity();
        entity.udyam.commencement_date = "11/03/2021".into();

        let result = CommencementDateCheck.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Warning);
    }

    #[test]
    fn test_missing_commencement_date_passes() {
        let mut entity = consistent_entity();
        entity.udyam.commencement_date.clear();

        let result = CommencementDateCheck.validate(&entity).unwrap();
        assert_eq!(result.status(), Status::Pass);
        assert_eq!(
            result.message(),
            "Commencement date not available for comparison"
        );
    }
}
