//! Core domain model for docverify cross-document verification.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `RawDocument`: extractor output for one PAN / GST / Udyam document
//! - `PanRecord`, `GstRecord`, `UdyamRecord`: canonical per-document records
//! - `Entity`: the three canonical records for one business
//! - `Severity` and `Status`: rule importance tier and rule outcome

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Free-form, insertion-ordered detail map attached to rule results.
pub type Details = Map<String, Value>;

/// The three source document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
    /// Permanent Account Number card
    Pan,
    /// GST registration certificate
    Gst,
    /// Udyam (MSME) registration certificate
    Udyam,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [Self::Pan, Self::Gst, Self::Udyam];

    /// Source key used for this document inside an entity ("pan", "gst", "udyam").
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Gst => "gst",
            Self::Udyam => "udyam",
        }
    }

    /// Upper-case label used in rule metadata.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::Gst => "GST",
            Self::Udyam => "UDYAM",
        }
    }

    /// Human-facing name used in rule messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pan => "PAN",
            Self::Gst => "GST",
            Self::Udyam => "Udyam",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAN" => Ok(Self::Pan),
            "GST" => Ok(Self::Gst),
            "UDYAM" => Ok(Self::Udyam),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown document type: {0}")]
pub struct ParseKindError(pub String);

/// Rule importance tier. Ordered `Info < Warning < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational only
    Info,
    /// Should be reviewed but not blocking
    Warning,
    /// Must pass for a valid verification
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown severity: {0} (expected CRITICAL, WARNING or INFO)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Outcome of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Pass,
    Fail,
    Warning,
    /// Rule could not run, usually because input data is missing
    Skipped,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warning => "WARNING",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extractor output for a single document.
///
/// Shape is `{"fields": {...}, "tables": {...}}`; every accessor treats a
/// missing or mistyped part as absent rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawDocument(Value);

impl RawDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The `fields` object, if present.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.get("fields").and_then(Value::as_object)
    }

    /// A scalar field as text; empty when absent or not a string/number.
    pub fn field_str(&self, key: &str) -> String {
        self.fields()
            .and_then(|f| f.get(key))
            .and_then(scalar_text)
            .unwrap_or_default()
    }

    /// A nested object field (e.g. an address block).
    pub fn field_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.fields()
            .and_then(|f| f.get(key))
            .and_then(Value::as_object)
    }

    /// Rows of a named table; empty when absent.
    pub fn table(&self, key: &str) -> &[Value] {
        self.0
            .get("tables")
            .and_then(|t| t.get(key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl From<Value> for RawDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Text of a JSON string or number; `None` for anything else.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The components of a normalized address, in `full_address` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    FlatNo,
    Building,
    Road,
    Locality,
    City,
    District,
    State,
    Pin,
}

impl AddressField {
    pub const ALL: [AddressField; 8] = [
        Self::FlatNo,
        Self::Building,
        Self::Road,
        Self::Locality,
        Self::City,
        Self::District,
        Self::State,
        Self::Pin,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatNo => "flat_no",
            Self::Building => "building",
            Self::Road => "road",
            Self::Locality => "locality",
            Self::City => "city",
            Self::District => "district",
            Self::State => "state",
            Self::Pin => "pin",
        }
    }
}

/// Address with a fixed set of upper-cased components.
///
/// All nine keys are always serialized, empty when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizedAddress {
    pub flat_no: String,
    pub building: String,
    pub road: String,
    pub locality: String,
    pub city: String,
    pub district: String,
    pub state: String,
    pub pin: String,
    /// Comma-join of the non-empty components above
    pub full_address: String,
}

impl NormalizedAddress {
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::FlatNo => &self.flat_no,
            AddressField::Building => &self.building,
            AddressField::Road => &self.road,
            AddressField::Locality => &self.locality,
            AddressField::City => &self.city,
            AddressField::District => &self.district,
            AddressField::State => &self.state,
            AddressField::Pin => &self.pin,
        }
    }

    pub fn set(&mut self, field: AddressField, value: String) {
        let slot = match field {
            AddressField::FlatNo => &mut self.flat_no,
            AddressField::Building => &mut self.building,
            AddressField::Road => &mut self.road,
            AddressField::Locality => &mut self.locality,
            AddressField::City => &mut self.city,
            AddressField::District => &mut self.district,
            AddressField::State => &mut self.state,
            AddressField::Pin => &mut self.pin,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        AddressField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// A factory / plant unit listed on a Udyam certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryAddress {
    #[serde(default)]
    pub unit_name: String,

    #[serde(flatten)]
    pub address: NormalizedAddress,
}

/// Canonical PAN card record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanRecord {
    pub legal_name: String,
    pub pan: String,
    /// COMPANY, INDIVIDUAL, FIRM...
    pub pan_type: String,
    pub incorporation_date: String,
    /// Name as printed, for display only
    pub raw_name: String,
}

impl PanRecord {
    pub fn is_empty(&self) -> bool {
        self.legal_name.is_empty()
            && self.pan.is_empty()
            && self.pan_type.is_empty()
            && self.incorporation_date.is_empty()
    }
}

/// Canonical GST certificate record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GstRecord {
    pub legal_name: String,
    /// PAN embedded in the GSTIN (characters 3-12)
    pub pan: String,
    pub gst_number: String,
    pub constitution: String,
    pub principal_address: NormalizedAddress,
    /// Free-text list of additional places of business
    pub additional_places: String,
    pub total_additional_places: String,
    pub raw_name: String,
    pub raw_constitution: String,
}

impl GstRecord {
    pub fn is_empty(&self) -> bool {
        self.legal_name.is_empty()
            && self.gst_number.is_empty()
            && self.constitution.is_empty()
            && self.principal_address.is_empty()
            && self.additional_places.is_empty()
    }
}

/// Canonical Udyam registration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UdyamRecord {
    pub legal_name: String,
    pub pan: String,
    pub udyam_number: String,
    pub incorporation_date: String,
    pub commencement_date: String,
    pub registered_address: NormalizedAddress,
    pub factory_addresses: Vec<FactoryAddress>,
    /// Latest MICRO / SMALL / MEDIUM classification
    pub enterprise_type: String,
    pub mobile: String,
    pub email: String,
    pub raw_name: String,
}

impl UdyamRecord {
    pub fn is_empty(&self) -> bool {
        self.legal_name.is_empty()
            && self.pan.is_empty()
            && self.udyam_number.is_empty()
            && self.incorporation_date.is_empty()
            && self.commencement_date.is_empty()
            && self.registered_address.is_empty()
            && self.factory_addresses.is_empty()
            && self.enterprise_type.is_empty()
    }
}

/// Canonical view of one business across its three documents.
///
/// A document that was not supplied is an empty record, never missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    pub pan: PanRecord,
    pub gst: GstRecord,
    pub udyam: UdyamRecord,
}

impl Entity {
    pub fn new(pan: PanRecord, gst: GstRecord, udyam: UdyamRecord) -> Self {
        Self { pan, gst, udyam }
    }

    /// Whether data from the given document is present.
    pub fn has(&self, kind: DocumentKind) -> bool {
        match kind {
            DocumentKind::Pan => !self.pan.is_empty(),
            DocumentKind::Gst => !self.gst.is_empty(),
            DocumentKind::Udyam => !self.udyam.is_empty(),
        }
    }

    /// Documents that carry data, in PAN, GST, UDYAM order.
    pub fn present_documents(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|k| self.has(*k))
            .collect()
    }
}
