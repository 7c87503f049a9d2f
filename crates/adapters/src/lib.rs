//! Document adapters.
//!
//! Maps each extractor's raw JSON schema onto its canonical record so rules
//! only ever see normalized values. Adapters never fail: a missing field or
//! a document without a `fields` object simply yields empty values.

use docverify_model::{
    DocumentKind, FactoryAddress, GstRecord, PanRecord, RawDocument, UdyamRecord,
};
use docverify_normalize::{
    normalize_address, normalize_constitution, normalize_date, normalize_pan, normalize_text,
};
use serde_json::Value;

/// Year used for classification rows that carry no `classification_year`.
const MISSING_CLASSIFICATION_YEAR: &str = "0000-00";

/// Trait for turning one document type's raw JSON into its canonical record.
pub trait DocumentAdapter {
    /// The canonical record this adapter produces
    type Record;

    /// Which document this adapter understands
    fn document_kind(&self) -> DocumentKind;

    /// Normalize a raw document
    fn adapt(&self, raw: &RawDocument) -> Self::Record;
}

fn check_shape(kind: DocumentKind, raw: &RawDocument) {
    if raw.fields().is_none() {
        tracing::warn!(
            document = %kind,
            "document has no `fields` object, treating all fields as absent"
        );
    } else {
        tracing::debug!(document = %kind, "adapting document");
    }
}

/// Adapter for PAN card extraction output.
///
/// Reads `fields.{name, pan, pan_type, incorporation_date}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanAdapter;

impl DocumentAdapter for PanAdapter {
    type Record = PanRecord;

    fn document_kind(&self) -> DocumentKind {
        DocumentKind::Pan
    }

    fn adapt(&self, raw: &RawDocument) -> PanRecord {
        check_shape(self.document_kind(), raw);
        let name = raw.field_str("name");

        PanRecord {
            legal_name: normalize_text(&name),
            pan: normalize_pan(&raw.field_str("pan")),
            pan_type: raw.field_str("pan_type").trim().to_uppercase(),
            incorporation_date: normalize_date(&raw.field_str("incorporation_date")),
            raw_name: name,
        }
    }
}

/// Adapter for GST registration certificates.
#[derive(Debug, Default, Clone, Copy)]
pub struct GstAdapter;

impl DocumentAdapter for GstAdapter {
    type Record = GstRecord;

    fn document_kind(&self) -> DocumentKind {
        DocumentKind::Gst
    }

    fn adapt(&self, raw: &RawDocument) -> GstRecord {
        check_shape(self.document_kind(), raw);
        let name = raw.field_str("name");
        let constitution = raw.field_str("constitution_of_business");
        let gst_number = raw.field_str("gst_number").trim().to_uppercase();

        let mut total_additional_places = raw.field_str("total_no_of_additional_places");
        if total_additional_places.is_empty() {
            total_additional_places = "0".to_string();
        }

        GstRecord {
            legal_name: normalize_text(&name),
            pan: pan_from_gstin(&gst_number),
            constitution: normalize_constitution(&constitution),
            principal_address: normalize_address(raw.field_object("principal_address")),
            additional_places: raw.field_str("additional_place_of_business"),
            total_additional_places,
            gst_number,
            raw_name: name,
            raw_constitution: constitution,
        }
    }
}

/// Extract the PAN embedded in a GSTIN.
///
/// A GSTIN is `SS` (state code) + 10-character PAN + entity/check characters,
/// so the PAN sits at characters 3-12. Numbers shorter than 12 characters
/// yield an empty string.
pub fn pan_from_gstin(gst_number: &str) -> String {
    let chars: Vec<char> = gst_number.chars().collect();
    if chars.len() < 12 {
        return String::new();
    }
    chars[2..12].iter().collect::<String>().to_uppercase()
}

/// Adapter for Udyam (MSME) registration certificates.
///
/// Besides `fields`, reads the `units_details` and `classification_history`
/// tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdyamAdapter;

impl DocumentAdapter for UdyamAdapter {
    type Record = UdyamRecord;

    fn document_kind(&self) -> DocumentKind {
        DocumentKind::Udyam
    }

    fn adapt(&self, raw: &RawDocument) -> UdyamRecord {
        check_shape(self.document_kind(), raw);
        let name = raw.field_str("enterprise_name");

        UdyamRecord {
            legal_name: normalize_text(&name),
            pan: normalize_pan(&raw.field_str("pan")),
            udyam_number: raw.field_str("udyam_number").trim().to_string(),
            incorporation_date: normalize_date(&raw.field_str("incorporation_date")),
            commencement_date: normalize_date(&raw.field_str("commencement_date")),
            registered_address: normalize_address(raw.field_object("official_address")),
            factory_addresses: factory_addresses(raw.table("units_details")),
            enterprise_type: current_enterprise_type(raw.table("classification_history")),
            mobile: raw.field_str("mobile"),
            email: raw.field_str("email"),
            raw_name: name,
        }
    }
}

/// Normalize each `units_details` row, keeping table order.
///
/// Unit rows use `flat` and `village_town`, which the address alias table
/// already maps onto `flat_no` and `locality`.
fn factory_addresses(units: &[Value]) -> Vec<FactoryAddress> {
    units
        .iter()
        .filter_map(Value::as_object)
        .map(|unit| FactoryAddress {
            unit_name: unit
                .get("unit_name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .replace('\n', " ")
                .trim()
                .to_string(),
            address: normalize_address(Some(unit)),
        })
        .collect()
}

/// Enterprise type from the most recent classification row.
///
/// Rows are ordered by their `classification_year` text, newest first. This
/// is a plain string sort: it only tracks chronology while every row uses
/// the same `YYYY-YY` layout.
fn current_enterprise_type(history: &[Value]) -> String {
    let year = |row: &Value| {
        row.get("classification_year")
            .and_then(Value::as_str)
            .unwrap_or(MISSING_CLASSIFICATION_YEAR)
            .to_string()
    };

    let mut rows: Vec<&Value> = history.iter().filter(|r| r.is_object()).collect();
    rows.sort_by_key(|row| std::cmp::Reverse(year(*row)));

    rows.first()
        .and_then(|row| row.get("enterprise_type"))
        .and_then(Value::as_str)
        .map(|t| t.trim().to_uppercase())
        .unwrap_or_default()
}
