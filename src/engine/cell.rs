//! Typed Cell Decoding
//!
//! The Data API returns every value as a record in which at most one
//! type-specific field is populated. [`decode`] turns one such cell into the
//! text shown in the result grid.
//!
//! # Precedence
//! The null flag wins over any value field. Otherwise fields are tested in a
//! fixed order: string, boolean, double, long, blob, array. A cell with none
//! of them renders as [`UNKNOWN_MARKER`] so that fields added to the API
//! later still display instead of failing.

use serde::{Deserialize, Serialize};

/// Rendered for cells whose null flag is set
pub const NULL_MARKER: &str = "NULL";

/// Rendered for cells with no known field populated
pub const UNKNOWN_MARKER: &str = "UNKNOWN";

/// Rendered for array cells (arrays are not decoded element by element)
pub const ARRAY_MARKER: &str = "ARRAY";

/// One column value as returned by the backend
///
/// Field names follow the Data API JSON shape (`stringValue`, `isNull`, ...).
/// Unrecognized fields are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_null: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_value: Option<i64>,

    /// Raw bytes; Base64 in the JSON representation
    #[serde(default, skip_serializing_if = "Option::is_none", with = "blob_base64")]
    pub blob_value: Option<Vec<u8>>,

    /// Kept opaque: only its presence matters for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_value: Option<serde_json::Value>,
}

impl TypedCell {
    #[must_use]
    pub fn null() -> Self {
        Self { is_null: Some(true), ..Self::default() }
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self { string_value: Some(value.into()), ..Self::default() }
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self { boolean_value: Some(value), ..Self::default() }
    }

    #[must_use]
    pub fn double(value: f64) -> Self {
        Self { double_value: Some(value), ..Self::default() }
    }

    #[must_use]
    pub fn long(value: i64) -> Self {
        Self { long_value: Some(value), ..Self::default() }
    }

    #[must_use]
    pub fn blob(value: impl Into<Vec<u8>>) -> Self {
        Self { blob_value: Some(value.into()), ..Self::default() }
    }

    #[must_use]
    pub fn array(value: serde_json::Value) -> Self {
        Self { array_value: Some(value), ..Self::default() }
    }
}

/// Convert a typed cell into its display string
///
/// Total over every cell: never fails, never panics.
#[must_use]
pub fn decode(cell: &TypedCell) -> String {
    if cell.is_null == Some(true) {
        return NULL_MARKER.to_string();
    }
    if let Some(value) = &cell.string_value {
        return value.clone();
    }
    if let Some(value) = cell.boolean_value {
        return if value { "True" } else { "False" }.to_string();
    }
    if let Some(value) = cell.double_value {
        return format_double(value);
    }
    if let Some(value) = cell.long_value {
        return value.to_string();
    }
    if let Some(bytes) = &cell.blob_value {
        return format!("BLOB({})", to_hex(bytes));
    }
    if cell.array_value.is_some() {
        return ARRAY_MARKER.to_string();
    }
    UNKNOWN_MARKER.to_string()
}

/// Shortest round-trip form with a decimal point on integral values (`2.0`)
///
/// Very large and very small magnitudes use a signed, two-digit exponent
/// (`1e+16`, `1.5e-07`); non-finite values are `nan`, `inf` and `-inf`.
fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let debug = format!("{value:?}");
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => debug,
    }
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Writing to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Serde adapter: `Option<Vec<u8>>` <-> Base64 string
mod blob_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
