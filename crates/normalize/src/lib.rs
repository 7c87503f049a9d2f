//! Normalization primitives for cross-document comparison.
//!
//! Provides pure functions that bring values from different extractors onto
//! a common footing before any rule compares them:
//! - Legal name / free text normalization
//! - PAN and date normalization
//! - Address normalization over extractor-specific key aliases
//! - Business constitution canonicalization

use std::sync::LazyLock;

use docverify_model::{scalar_text, AddressField, NormalizedAddress};
use regex::Regex;
use serde_json::{Map, Value};

/// Leading honorifics that never belong to a legal name.
static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:M/S\.?|MESSRS\.?|SHRI\b\.?|SMT\b\.?)\s*").unwrap());

/// Extractor key aliases per address field, highest precedence first.
const ADDRESS_ALIASES: &[(AddressField, &[&str])] = &[
    (
        AddressField::FlatNo,
        &["flat_no", "building_flat_no", "flat", "plot", "door_no"],
    ),
    (
        AddressField::Building,
        &["building", "premises_name", "premises", "complex"],
    ),
    (AddressField::Road, &["road", "road_street", "street", "lane"]),
    (
        AddressField::Locality,
        &["locality", "area", "village_town", "village", "town"],
    ),
    (AddressField::City, &["city", "taluka", "tehsil"]),
    (AddressField::District, &["district"]),
    (AddressField::State, &["state"]),
    (
        AddressField::Pin,
        &["pin", "pin_code", "pincode", "postal_code"],
    ),
];

/// Canonical constitution forms and the variants that map onto them.
const CONSTITUTION_FORMS: &[(&str, &[&str])] = &[
    (
        "PRIVATE LIMITED",
        &[
            "PRIVATE LIMITED",
            "PVT LTD",
            "PRIVATE LTD",
            "PRIVATE LIMITED COMPANY",
        ],
    ),
    (
        "PUBLIC LIMITED",
        &["PUBLIC LIMITED", "PUBLIC LTD", "PUBLIC LIMITED COMPANY"],
    ),
    ("LLP", &["LLP", "LIMITED LIABILITY PARTNERSHIP"]),
    ("PARTNERSHIP", &["PARTNERSHIP", "PARTNERSHIP FIRM"]),
    (
        "PROPRIETORSHIP",
        &["PROPRIETORSHIP", "SOLE PROPRIETORSHIP", "PROPRIETOR"],
    ),
    ("HUF", &["HUF", "HINDU UNDIVIDED FAMILY"]),
    ("TRUST", &["TRUST"]),
    ("SOCIETY", &["SOCIETY"]),
    ("AOP", &["AOP", "ASSOCIATION OF PERSONS"]),
    ("BOI", &["BOI", "BODY OF INDIVIDUALS"]),
];

/// Name suffixes that reveal a constitution, most specific first.
const NAME_CONSTITUTION_PATTERNS: &[(&str, &[&str])] = &[
    (
        "PRIVATE LIMITED",
        &["PRIVATE LIMITED", "PVT LTD", "PVT. LTD.", "PRIVATE LTD"],
    ),
    ("PUBLIC LIMITED", &["PUBLIC LIMITED", "PUBLIC LTD"]),
    ("LLP", &["LLP", "LIMITED LIABILITY PARTNERSHIP"]),
    ("PARTNERSHIP", &["PARTNERSHIP"]),
];

/// Normalize a legal name or free text for comparison.
///
/// Upper-cases, drops leading honorifics (M/S, MESSRS, SHRI, SMT), keeps only
/// `[A-Z0-9 ]` and collapses whitespace. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let mut current = text.to_uppercase();

    // Stripping punctuation can expose a new honorific ("S.M.T." -> "SMT"),
    // so iterate until stable.
    loop {
        let stripped = HONORIFIC_RE.replace(current.trim(), "");
        let cleaned: String = stripped
            .chars()
            .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == ' ')
            .collect();
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed == current {
            return collapsed;
        }
        current = collapsed;
    }
}

/// Normalize a PAN: upper-case and trim only.
pub fn normalize_pan(pan: &str) -> String {
    pan.trim().to_uppercase()
}

/// Normalize a date's separators to `/`.
///
/// Component order is left untouched: `2021-03-11` becomes `2021/03/11`,
/// not `11/03/2021`.
pub fn normalize_date(date: &str) -> String {
    date.trim().replace(['-', '.'], "/")
}

/// Normalize an extractor address block onto the fixed nine-field shape.
///
/// Each field takes the first non-empty alias from `ADDRESS_ALIASES`.
/// A missing block yields an all-empty address.
pub fn normalize_address(raw: Option<&Map<String, Value>>) -> NormalizedAddress {
    let mut address = NormalizedAddress::default();
    let Some(raw) = raw else {
        return address;
    };

    for (field, aliases) in ADDRESS_ALIASES {
        let value = aliases
            .iter()
            .filter_map(|key| raw.get(*key).and_then(scalar_text))
            .map(|v| v.trim().to_uppercase())
            .find(|v| !v.is_empty())
            .unwrap_or_default();
        address.set(*field, value);
    }

    address.full_address = AddressField::ALL
        .iter()
        .map(|f| address.get(*f))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    address
}

/// Map a constitution description onto its canonical form.
///
/// Unknown descriptions come back upper-cased but otherwise unchanged.
pub fn normalize_constitution(constitution: &str) -> String {
    let upper = constitution.trim().to_uppercase();
    if upper.is_empty() {
        return upper;
    }

    first_keyword_match(&upper, CONSTITUTION_FORMS)
        .map(str::to_string)
        .unwrap_or(upper)
}

/// Infer a constitution from words in an entity's name.
///
/// `"M/S ACME STEELS PVT. LTD."` infers `PRIVATE LIMITED`; a name with no
/// telltale suffix infers nothing.
pub fn infer_constitution_from_name(name: &str) -> Option<&'static str> {
    let upper = name.to_uppercase();
    if upper.trim().is_empty() {
        return None;
    }
    first_keyword_match(&upper, NAME_CONSTITUTION_PATTERNS)
}

fn first_keyword_match(
    haystack: &str,
    table: &'static [(&'static str, &'static [&'static str])],
) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(canonical, _)| *canonical)
}
