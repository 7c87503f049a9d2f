//! Verification report generation.
//!
//! Turns an entity and its ordered rule results into:
//! - `Summary`: per-status counts, pass rate and overall status
//! - `Report`: a minimized structured report for JSON output
//! - a console rendering grouped by status

use chrono::Local;
use docverify_model::{Details, Entity, Severity, Status};
use docverify_rules::RuleResult;
use serde::Serialize;
use serde_json::Value;

/// Longest detail value printed on the console before truncation.
const CONSOLE_VALUE_WIDTH: usize = 80;

/// Longest fallback "matched" value before truncation.
const MATCHED_VALUE_WIDTH: usize = 50;

const RULE_WIDTH: usize = 60;

/// Verdict over a whole result set, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OverallStatus {
    #[serde(rename = "FAILED (Critical issues found)")]
    FailedCritical,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "PASSED WITH WARNINGS")]
    PassedWithWarnings,
    #[serde(rename = "PASSED")]
    Passed,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedCritical => "FAILED (Critical issues found)",
            Self::Failed => "FAILED",
            Self::PassedWithWarnings => "PASSED WITH WARNINGS",
            Self::Passed => "PASSED",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FailedCritical | Self::Failed)
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate counts for one verification run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    pub warnings: usize,
    pub skipped: usize,
    /// FAIL results from CRITICAL rules
    pub critical_failures: usize,
    /// "NN.N%" or "N/A" when no rules ran
    pub pass_rate: String,
    pub overall_status: OverallStatus,
}

impl Summary {
    pub fn from_results(results: &[RuleResult]) -> Self {
        let count = |status: Status| results.iter().filter(|r| r.status() == status).count();

        let total_rules = results.len();
        let passed = count(Status::Pass);
        let failed = count(Status::Fail);
        let warnings = count(Status::Warning);
        let skipped = count(Status::Skipped);
        let critical_failures = results.iter().filter(|r| r.is_critical_failure()).count();

        let overall_status = if critical_failures > 0 {
            OverallStatus::FailedCritical
        } else if failed > 0 {
            OverallStatus::Failed
        } else if warnings > 0 {
            OverallStatus::PassedWithWarnings
        } else {
            OverallStatus::Passed
        };

        let pass_rate = if total_rules == 0 {
            "N/A".to_string()
        } else {
            format!("{:.1}%", passed as f64 / total_rules as f64 * 100.0)
        };

        Self {
            total_rules,
            passed,
            failed,
            warnings,
            skipped,
            critical_failures,
            pass_rate,
            overall_status,
        }
    }
}

/// Identifying header for the verified business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityInfo {
    pub name: String,
    pub pan: String,
    pub gst_number: String,
    pub udyam_number: String,
    pub incorporation_date: String,
}

fn or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

impl EntityInfo {
    pub fn from_entity(entity: &Entity) -> Self {
        let name = [
            &entity.pan.raw_name,
            &entity.gst.raw_name,
            &entity.udyam.raw_name,
        ]
        .into_iter()
        .find(|n| !n.is_empty())
        .map(String::as_str)
        .unwrap_or_default();

        Self {
            name: or_na(name),
            pan: or_na(&entity.pan.pan),
            gst_number: or_na(&entity.gst.gst_number),
            udyam_number: or_na(&entity.udyam.udyam_number),
            incorporation_date: or_na(&entity.udyam.incorporation_date),
        }
    }
}

/// What a minimized result shows besides its message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    /// Representative value a PASS agreed on
    Matched { matched: Option<String> },
    /// The disagreeing values of a FAIL or WARNING
    Comparison { comparison: Details },
}

/// One rule result reduced to what a reviewer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalResult {
    pub rule: String,
    pub status: Status,
    pub message: String,
    #[serde(flatten)]
    pub evidence: Evidence,
}

impl MinimalResult {
    fn from_result(result: &RuleResult) -> Self {
        let evidence = if result.status() == Status::Pass {
            Evidence::Matched {
                matched: matched_value(result.details()),
            }
        } else {
            Evidence::Comparison {
                comparison: comparison(result.details()),
            }
        };
        Self {
            rule: result.rule_id().to_string(),
            status: result.status(),
            message: result.message().to_string(),
            evidence,
        }
    }
}

/// Structured report as written to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub report_generated_at: String,
    pub entity_info: EntityInfo,
    pub summary: Summary,
    /// FAIL and WARNING results
    pub mismatches: Vec<MinimalResult>,
    /// PASS results
    pub matches: Vec<MinimalResult>,
}

/// Whether a detail value carries anything worth showing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let head: String = text.chars().take(width).collect();
        format!("{head}...")
    }
}

fn text_of(details: &Details, key: &str) -> Option<String> {
    details.get(key).map(display_value)
}

fn has_all(details: &Details, keys: &[&str]) -> bool {
    keys.iter().all(|k| details.contains_key(*k))
}

/// Pick the value a passing rule agreed on.
fn matched_value(details: &Details) -> Option<String> {
    if details.is_empty() {
        return None;
    }

    const PAIRS: [(&str, &str); 3] = [
        ("pan_name", "gst_name"),
        ("gst_name", "udyam_name"),
        ("pan_name", "udyam_name"),
    ];
    for (first, second) in PAIRS {
        if has_all(details, &[first, second]) {
            return text_of(details, first);
        }
    }

    if details.contains_key("pan") {
        return text_of(details, "pan");
    }
    if has_all(details, &["gst_pin", "udyam_pin"]) {
        return text_of(details, "gst_pin");
    }
    if has_all(details, &["pan_date", "udyam_date"]) {
        return text_of(details, "pan_date");
    }
    if details.contains_key("gst_constitution") {
        return text_of(details, "gst_constitution");
    }
    if let Some(pins) = details.get("matching_pins").and_then(Value::as_array) {
        let pins: Vec<&str> = pins
            .iter()
            .filter_map(|p| p.get("pin").and_then(Value::as_str))
            .filter(|p| !p.is_empty())
            .collect();
        return (!pins.is_empty()).then(|| format!("Matching PINs: {}", pins.join(", ")));
    }

    details
        .iter()
        .find(|(key, value)| is_truthy(value) && !key.ends_with("_raw") && *key != "skip_reason")
        .map(|(_, value)| truncate(&display_value(value), MATCHED_VALUE_WIDTH))
}

fn select(details: &Details, keep: impl Fn(&str, &Value) -> bool) -> Details {
    details
        .iter()
        .filter(|(k, v)| keep(k, v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Pick the disagreeing values of a FAIL or WARNING.
fn comparison(details: &Details) -> Details {
    if details.is_empty() {
        return Details::new();
    }

    if has_all(details, &["gst_address", "udyam_address"]) {
        let mut out = Details::new();
        out.insert("gst".into(), details["gst_address"].clone());
        out.insert("udyam".into(), details["udyam_address"].clone());
        if let Some(matches) = details.get("matches") {
            out.insert("matched_fields".into(), matches.clone());
        }
        if let Some(mismatches) = details.get("mismatches").filter(|v| is_truthy(v)) {
            out.insert("mismatched_fields".into(), mismatches.clone());
        }
        if let Some(score) = details.get("match_score") {
            out.insert("score".into(), score.clone());
        }
        return out;
    }

    if details.keys().any(|k| k.ends_with("_name")) {
        return select(details, |k, v| k.ends_with("_name") && is_truthy(v));
    }

    if details.contains_key("pan") {
        return select(details, |k, _| k.to_lowercase().contains("pan"));
    }

    if details.keys().any(|k| k.ends_with("_date")) {
        return select(details, |k, _| k.ends_with("_date"));
    }

    select(details, |k, v| {
        is_truthy(v) && k != "skip_reason" && !k.ends_with("_raw")
    })
}

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Pass => "[+]",
        Status::Fail => "[x]",
        Status::Warning => "[!]",
        Status::Skipped => "[o]",
    }
}

/// Builds reports from one verification run.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    entity: Entity,
    results: Vec<RuleResult>,
    generated_at: String,
}

impl ReportGenerator {
    /// Timestamped with the current local time.
    pub fn new(entity: Entity, results: Vec<RuleResult>) -> Self {
        Self {
            entity,
            results,
            generated_at: Local::now().to_rfc3339(),
        }
    }

    /// Replace the generation timestamp.
    pub fn with_timestamp(mut self, generated_at: impl Into<String>) -> Self {
        self.generated_at = generated_at.into();
        self
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn results(&self) -> &[RuleResult] {
        &self.results
    }

    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results)
    }

    pub fn entity_info(&self) -> EntityInfo {
        EntityInfo::from_entity(&self.entity)
    }

    pub fn report(&self) -> Report {
        let (matches, mismatches): (Vec<_>, Vec<_>) = self
            .results
            .iter()
            .filter(|r| r.status() != Status::Skipped)
            .map(MinimalResult::from_result)
            .partition(|r| r.status == Status::Pass);

        Report {
            report_generated_at: self.generated_at.clone(),
            entity_info: self.entity_info(),
            summary: self.summary(),
            mismatches,
            matches,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }

    /// Human-readable rendering; `verbose` adds each result's details.
    pub fn to_console(&self, verbose: bool) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let summary = self.summary();
        let info = self.entity_info();
        let mut lines = Vec::new();

        lines.push(heavy.clone());
        lines.push("DOCUMENT VERIFICATION REPORT".to_string());
        lines.push(heavy.clone());
        lines.push(format!("Generated: {}", self.generated_at));
        lines.push(String::new());

        lines.push("Entity Information:".to_string());
        lines.push(format!("  Name: {}", info.name));
        lines.push(format!("  PAN: {}", info.pan));
        lines.push(format!("  GST: {}", info.gst_number));
        lines.push(format!("  Udyam: {}", info.udyam_number));
        lines.push(String::new());

        lines.push(light.clone());
        lines.push("SUMMARY".to_string());
        lines.push(light.clone());
        lines.push(format!("  Total Rules: {}", summary.total_rules));
        lines.push(format!(
            "  [PASS] Passed: {} ({})",
            summary.passed, summary.pass_rate
        ));
        lines.push(format!("  [FAIL] Failed: {}", summary.failed));
        lines.push(format!("  [WARN] Warning: {}", summary.warnings));
        lines.push(format!("  [SKIP] Skipped: {}", summary.skipped));
        lines.push(format!("  Overall: {}", summary.overall_status));
        lines.push(String::new());

        let critical: Vec<_> = self.critical_failures().collect();
        if !critical.is_empty() {
            lines.push(light.clone());
            lines.push("CRITICAL FAILURES".to_string());
            lines.push(light.clone());
            for result in critical {
                lines.push(format!("  [{}]", result.rule_id()));
                lines.push(format!("    {}", result.message()));
                if verbose {
                    for (key, value) in result.details() {
                        lines.push(format!("    * {key}: {}", display_value(value)));
                    }
                }
            }
            lines.push(String::new());
        }

        lines.push(light.clone());
        lines.push("DETAILED RESULTS".to_string());
        lines.push(light);

        for status in [Status::Fail, Status::Warning, Status::Pass, Status::Skipped] {
            let group: Vec<_> = self
                .results
                .iter()
                .filter(|r| r.status() == status)
                .collect();
            if group.is_empty() {
                continue;
            }

            lines.push(String::new());
            lines.push(format!("  {} {status} ({})", status_icon(status), group.len()));
            lines.push(format!("  {}", "-".repeat(40)));
            for result in group {
                lines.push(format!("    {} [{}]", result.rule_id(), result.severity()));
                lines.push(format!("      -> {}", result.message()));
                if verbose && status != Status::Skipped {
                    for (key, value) in result.details() {
                        if key == "skip_reason" {
                            continue;
                        }
                        let text = truncate(&display_value(value), CONSOLE_VALUE_WIDTH);
                        lines.push(format!("        {key}: {text}"));
                    }
                }
            }
        }

        lines.push(String::new());
        lines.push(heavy);
        lines.join("\n")
    }

    /// Results from CRITICAL rules that failed.
    pub fn critical_failures(&self) -> impl Iterator<Item = &RuleResult> {
        self.results
            .iter()
            .filter(|r| r.severity() == Severity::Critical && r.status() == Status::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docverify_model::{GstRecord, PanRecord};
    use docverify_rules::{
        fail_result, pass_result, skip_result, to_details, warning_result, FactoryAddressMatch,
        NameMatch, PanMatch, PinMatch, PrincipalAddressMatch,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_entity() -> Entity {
        Entity {
            pan: PanRecord {
                pan: "ABFCS7205N".into(),
                ..Default::default()
            },
            gst: GstRecord {
                raw_name: "Stellinox Stainless Pvt Ltd".into(),
                gst_number: "24ABFCS7205N1Z3".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sample_results() -> Vec<RuleResult> {
        vec![
            pass_result(
                &NameMatch::pan_gst(),
                "PAN name matches GST name",
                to_details(json!({"pan_name": "ACME LTD", "gst_name": "ACME LTD"})),
            ),
            fail_result(
                &PinMatch,
                "PIN codes do NOT match",
                to_details(json!({"gst_pin": "380060", "udyam_pin": "380061"})),
            ),
            warning_result(
                &PrincipalAddressMatch,
                "Partial address match (2/3 fields)",
                to_details(json!({
                    "match_score": "2/3",
                    "gst_address": "AHMEDABAD, GUJARAT, 380060",
                    "udyam_address": "AHMEDABAD, MAHARASHTRA, 380060",
                    "matches": ["pin: 380060", "city: AHMEDABAD"],
                    "mismatches": ["state: GST='GUJARAT' vs Udyam='MAHARASHTRA'"],
                })),
            ),
            skip_result(&FactoryAddressMatch, "No additional places in GST"),
        ]
    }

    #[test]
    fn test_summary_counts_and_critical_status() {
        let summary = Summary::from_results(&sample_results());
        assert_eq!(summary.total_rules, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.warnings, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.critical_failures, 1);
        assert_eq!(summary.pass_rate, "25.0%");
        assert_eq!(summary.overall_status, OverallStatus::FailedCritical);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.pass_rate, "N/A");
        assert_eq!(summary.overall_status, OverallStatus::Passed);
    }

    #[test]
    fn test_overall_status_priority() {
        let warn_only = vec![warning_result(
            &PrincipalAddressMatch,
            "Partial",
            Details::new(),
        )];
        assert_eq!(
            Summary::from_results(&warn_only).overall_status,
            OverallStatus::PassedWithWarnings
        );

        let non_critical_fail = vec![fail_result(
            &PrincipalAddressMatch,
            "Address mismatch",
            Details::new(),
        )];
        let status = Summary::from_results(&non_critical_fail).overall_status;
        assert_eq!(status, OverallStatus::Failed);
        assert!(status.is_failure());
    }

    #[test]
    fn test_overall_status_serializes_as_text() {
        let value = serde_json::to_value(OverallStatus::FailedCritical).unwrap();
        assert_eq!(value, "FAILED (Critical issues found)");
    }

    #[test]
    fn test_entity_info_falls_back() {
        let info = EntityInfo::from_entity(&sample_entity());
        assert_eq!(info.name, "Stellinox Stainless Pvt Ltd");
        assert_eq!(info.pan, "ABFCS7205N");
        assert_eq!(info.udyam_number, "N/A");
        assert_eq!(info.incorporation_date, "N/A");
    }

    #[test]
    fn test_report_partitions_results() {
        let report = ReportGenerator::new(sample_entity(), sample_results())
            .with_timestamp("2026-10-16T10:00:00+05:30")
            .report();

        assert_eq!(report.report_generated_at, "2026-10-16T10:00:00+05:30");
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.mismatches.len(), 2);
        assert_eq!(
            report.matches[0].evidence,
            Evidence::Matched {
                matched: Some("ACME LTD".into())
            }
        );
    }

    #[test]
    fn test_report_json_shape() {
        let json = ReportGenerator::new(sample_entity(), sample_results())
            .with_timestamp("t")
            .to_json()
            .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["summary"]["overall_status"], "FAILED (Critical issues found)");
        assert_eq!(value["matches"][0]["matched"], "ACME LTD");
        assert_eq!(value["mismatches"][0]["rule"], "PIN_MATCH_GST_UDYAM");
        assert_eq!(value["mismatches"][0]["comparison"]["udyam_pin"], "380061");
        assert_eq!(value["mismatches"][1]["comparison"]["score"], "2/3");
        assert!(value["mismatches"][1]["comparison"]["matched_fields"].is_array());
    }

    #[test]
    fn test_name_comparison_drops_raw_names() {
        let details = to_details(json!({
            "pan_name": "ACME LTD",
            "gst_name": "ACME LIMITED",
            "pan_raw": "Acme Ltd",
            "gst_raw": "Acme Limited",
        }));
        let cmp = comparison(&details);
        assert_eq!(cmp.len(), 2);
        assert_eq!(cmp["gst_name"], "ACME LIMITED");
    }

    #[test]
    fn test_pan_comparison_keeps_pan_keys() {
        let details = to_details(json!({
            "pan": "ABFCS7205N",
            "gst_pan": "ABFCS7205X",
            "gst_number": "24ABFCS7205X1Z3",
        }));
        let cmp = comparison(&details);
        assert_eq!(cmp.len(), 2);
        assert!(cmp.contains_key("gst_pan"));
    }

    #[test]
    fn test_matched_value_for_factory_pins() {
        let result = pass_result(
            &FactoryAddressMatch,
            "Found 1 matching factory address(es) by PIN",
            to_details(json!({
                "gst_additional_places": "Changodar 382213",
                "udyam_factories": ["GUJARAT, 382213"],
                "matching_pins": [{"pin": "382213", "unit_name": "UNIT 1"}],
            })),
        );
        let minimal = MinimalResult::from_result(&result);
        assert_eq!(
            minimal.evidence,
            Evidence::Matched {
                matched: Some("Matching PINs: 382213".into())
            }
        );
    }

    #[test]
    fn test_matched_value_fallback_truncates() {
        let long = "X".repeat(70);
        let details = to_details(json!({"incorporation_date": long}));
        assert_eq!(matched_value(&details), Some(format!("{}...", "X".repeat(50))));
    }

    #[test]
    fn test_matched_value_pan_match() {
        let result = pass_result(
            &PanMatch::gst(),
            "PAN number matches GST",
            to_details(json!({"pan": "ABFCS7205N", "gst_pan": "ABFCS7205N"})),
        );
        assert_eq!(
            MinimalResult::from_result(&result).evidence,
            Evidence::Matched {
                matched: Some("ABFCS7205N".into())
            }
        );
    }

    #[test]
    fn test_console_report_sections() {
        let generator = ReportGenerator::new(sample_entity(), sample_results()).with_timestamp("t");
        let text = generator.to_console(true);

        assert!(text.contains("DOCUMENT VERIFICATION REPORT"));
        assert!(text.contains("Overall: FAILED (Critical issues found)"));
        assert!(text.contains("CRITICAL FAILURES"));
        assert!(text.contains("  [x] FAIL (1)"));
        assert!(text.contains("  [o] SKIPPED (1)"));
        assert!(text.contains("PIN_MATCH_GST_UDYAM [CRITICAL]"));
        assert!(text.contains("        udyam_pin: 380061"));

        let fail_at = text.find("[x] FAIL").unwrap();
        let pass_at = text.find("[+] PASS").unwrap();
        assert!(fail_at < pass_at);
    }

    #[test]
    fn test_console_quiet_omits_details() {
        let generator = ReportGenerator::new(sample_entity(), sample_results()).with_timestamp("t");
        let text = generator.to_console(false);
        assert!(!text.contains("udyam_pin: 380061"));
        assert!(text.contains("-> PIN codes do NOT match"));
    }

    #[test]
    fn test_console_truncates_long_values() {
        let results = vec![pass_result(
            &PrincipalAddressMatch,
            "match",
            to_details(json!({"gst_address": "A".repeat(100)})),
        )];
        let text = ReportGenerator::new(Entity::default(), results).to_console(true);
        assert!(text.contains(&format!("gst_address: {}...", "A".repeat(80))));
    }
}
