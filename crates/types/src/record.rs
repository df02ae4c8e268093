//! Postal-code records as loaded from the reference table.

use crate::geo::Point;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Width postal codes are padded to unless configured otherwise.
pub const DEFAULT_CODE_WIDTH: usize = 5;

/// A fixed-width postal code.
///
/// Codes are trimmed and left-padded with `'0'`, so `"8001"` and `" 08001 "`
/// both become `"08001"`. Only ASCII letters and digits are accepted, which
/// keeps every prefix slice on a character boundary.
///
/// # Examples
///
/// ```
/// use zipscope_types::record::ZipCode;
///
/// let code = ZipCode::normalize("8001", 5).unwrap();
/// assert_eq!(code.as_str(), "08001");
/// assert_eq!(code.prefix(2), "08");
/// assert!(ZipCode::normalize("  ", 5).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    /// Normalize raw input into a code of at least `width` characters.
    ///
    /// Returns `None` for empty input or anything outside `[0-9A-Za-z]`.
    pub fn normalize(raw: &str, width: usize) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        Some(Self(format!("{:0>width$}", trimmed, width = width)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Leading `len` characters, or the whole code when it is shorter.
    #[inline]
    pub fn prefix(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    #[inline]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ZipCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ZipCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One row of the reference table.
///
/// Serializes as `{"plz": .., "lat": .., "lon": ..}`, the column names of the
/// source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipRecord {
    #[serde(rename = "plz")]
    pub code: ZipCode,
    pub lat: f64,
    pub lon: f64,
}

impl ZipRecord {
    pub fn new(code: ZipCode, lat: f64, lon: f64) -> Self {
        Self { code, lat, lon }
    }

    #[inline]
    pub fn point(&self) -> Point {
        Point::from_lat_lon(self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_short_codes() {
        assert_eq!(ZipCode::normalize("1067", 5).unwrap().as_str(), "01067");
        assert_eq!(ZipCode::normalize("50667", 5).unwrap().as_str(), "50667");
        assert_eq!(ZipCode::normalize(" 42 ", 5).unwrap().as_str(), "00042");
    }

    #[test]
    fn test_normalize_keeps_long_codes() {
        assert_eq!(ZipCode::normalize("123456", 5).unwrap().as_str(), "123456");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(ZipCode::normalize("", 5).is_none());
        assert!(ZipCode::normalize("12 34", 5).is_none());
        assert!(ZipCode::normalize("12-34", 5).is_none());
        assert!(ZipCode::normalize("ü1234", 5).is_none());
    }

    #[test]
    fn test_prefix_is_clamped() {
        let code = ZipCode::normalize("08001", 5).unwrap();
        assert_eq!(code.prefix(1), "0");
        assert_eq!(code.prefix(4), "0800");
        assert_eq!(code.prefix(9), "08001");
    }

    #[test]
    fn test_record_serializes_with_source_column_names() {
        let record = ZipRecord::new(ZipCode::normalize("08001", 5).unwrap(), 48.0, 11.0);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"plz":"08001","lat":48.0,"lon":11.0}"#);
    }
}
