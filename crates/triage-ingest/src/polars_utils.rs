//! Polars AnyValue utility functions.
//!
//! Conversions used by every validator: scalar to text, scalar to number,
//! null detection and join-key canonicalization.

use polars::prelude::*;

use crate::error::{IngestError, Result};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null, formats floats without trailing zeros.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "true" } else { "false" }.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to a trimmed String, returning None if it is empty.
pub fn any_to_string_non_empty(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    }
    .filter(|v| !v.is_nan())
}

/// Parses a string as f64, returning None for invalid or empty strings.
/// Thousands separators are accepted (`"1,200"`).
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| trimmed.replace(',', "").parse::<f64>().ok())
}

/// True for polars nulls and strings that are blank after trimming.
pub fn is_null_value(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        _ => false,
    }
}

/// Canonical form of a join-key value.
///
/// Trims text and drops an all-zero fractional part from digit-only keys, so an
/// identifier read as `123`, `123.0` or `" 123 "` compares equal. Other text is
/// kept as written: `00123` and `123` stay distinct.
pub fn canonical_key(value: AnyValue<'_>) -> Option<String> {
    if is_null_value(&value) {
        return None;
    }
    let text = any_to_string_non_empty(value)?;
    Some(strip_zero_fraction(&text).to_string())
}

fn strip_zero_fraction(text: &str) -> &str {
    match text.split_once('.') {
        Some((whole, fraction))
            if !whole.is_empty()
                && !fraction.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && fraction.bytes().all(|b| b == b'0') =>
        {
            whole
        }
        _ => text,
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| IngestError::ColumnNotFound {
        column: name.to_string(),
    })
}

/// All values of a column as trimmed, non-empty text.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = column(df, name)?;
    let mut values = Vec::with_capacity(col.len());
    for idx in 0..col.len() {
        values.push(any_to_string_non_empty(col.get(idx)?));
    }
    Ok(values)
}

/// All values of a column as numbers; non-numeric cells become `None`.
pub fn column_numbers(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = column(df, name)?;
    let mut values = Vec::with_capacity(col.len());
    for idx in 0..col.len() {
        values.push(any_to_f64(col.get(idx)?));
    }
    Ok(values)
}

/// All values of a column in canonical join-key form.
pub fn column_keys(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = column(df, name)?;
    let mut values = Vec::with_capacity(col.len());
    for idx in 0..col.len() {
        values.push(canonical_key(col.get(idx)?));
    }
    Ok(values)
}

/// Number of null (or blank) cells in a column.
pub fn null_count(df: &DataFrame, name: &str) -> Result<usize> {
    let col = column(df, name)?;
    let mut count = 0;
    for idx in 0..col.len() {
        if is_null_value(&col.get(idx)?) {
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers_without_trailing_zeros() {
        assert_eq!(format_numeric(12.50), "12.5");
        assert_eq!(format_numeric(3.0), "3");
        assert_eq!(format_numeric(1500.0), "1500");
    }

    #[test]
    fn canonical_key_unifies_numeric_forms() {
        assert_eq!(canonical_key(AnyValue::Int64(123)), Some("123".to_string()));
        assert_eq!(canonical_key(AnyValue::Float64(123.0)), Some("123".to_string()));
        assert_eq!(canonical_key(AnyValue::String(" 123.0 ")), Some("123".to_string()));
        assert_eq!(canonical_key(AnyValue::String("A-17")), Some("A-17".to_string()));
        assert_eq!(canonical_key(AnyValue::String("  ")), None);
        assert_eq!(canonical_key(AnyValue::Null), None);
        assert_eq!(canonical_key(AnyValue::Float64(f64::NAN)), None);
    }

    #[test]
    fn canonical_key_keeps_distinct_text_identifiers() {
        assert_eq!(canonical_key(AnyValue::String("00123")), Some("00123".to_string()));
        assert_eq!(canonical_key(AnyValue::String("123.00")), Some("123".to_string()));
        assert_eq!(canonical_key(AnyValue::String("1e3")), Some("1e3".to_string()));
        assert_eq!(canonical_key(AnyValue::String("123.5")), Some("123.5".to_string()));
        assert_eq!(canonical_key(AnyValue::String("A.0")), Some("A.0".to_string()));
        assert_ne!(
            canonical_key(AnyValue::String("00123")),
            canonical_key(AnyValue::String("123"))
        );
    }

    #[test]
    fn null_detection_covers_blank_text() {
        assert!(is_null_value(&AnyValue::Null));
        assert!(is_null_value(&AnyValue::String("   ")));
        assert!(!is_null_value(&AnyValue::String("0")));
        assert!(!is_null_value(&AnyValue::Int32(0)));
    }

    #[test]
    fn parses_thousands_separator() {
        assert_eq!(parse_f64("1,200"), Some(1200.0));
        assert_eq!(parse_f64("n/a"), None);
    }
}
