//! The in-memory reference table.

use super::loader::parse_table;
use crate::compute::spatial::{QueryResult, nearest, polygon_query, radius_query};
use crate::error::{Result, ZipError};
use rustc_hash::FxHashMap;
use std::io::Read;
use std::path::Path;
use zipscope_types::geo::{Point, Polygon};
use zipscope_types::record::{ZipCode, ZipRecord};

/// Postal-code records loaded once per session and only ever filtered.
///
/// # Examples
///
/// ```
/// use zipscope::ReferenceTable;
///
/// let table = ReferenceTable::from_csv_str("plz,lat,lon\n8001,48.0,11.0\n", 5)?;
/// assert_eq!(table.lookup("08001")?.lat, 48.0);
/// assert_eq!(table.lookup("8001")?.lat, 48.0);
/// assert!(table.lookup("99999").is_err());
/// # Ok::<(), zipscope::ZipError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    records: Vec<ZipRecord>,
    // First row index per code; later duplicates are reachable through scans.
    index: FxHashMap<ZipCode, usize>,
    skipped_rows: usize,
    code_width: usize,
}

impl ReferenceTable {
    /// Build a table from already parsed records.
    pub fn from_records(records: Vec<ZipRecord>, code_width: usize) -> Self {
        let mut index = FxHashMap::with_capacity_and_hasher(records.len(), Default::default());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.code.clone()).or_insert(i);
        }
        Self {
            records,
            index,
            skipped_rows: 0,
            code_width,
        }
    }

    pub fn from_reader<R: Read>(input: R, code_width: usize) -> Result<Self> {
        let parsed = parse_table(input, code_width)?;
        let mut table = Self::from_records(parsed.records, code_width);
        table.skipped_rows = parsed.skipped;

        log::info!(
            "loaded reference table with {} entries ({} rows dropped)",
            table.len(),
            table.skipped_rows
        );
        Ok(table)
    }

    pub fn from_csv_str(text: &str, code_width: usize) -> Result<Self> {
        Self::from_reader(text.as_bytes(), code_width)
    }

    pub fn from_path<P: AsRef<Path>>(path: P, code_width: usize) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file), code_width)
    }

    #[inline]
    pub fn records(&self) -> &[ZipRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped while loading because they were malformed.
    #[inline]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    #[inline]
    pub fn code_width(&self) -> usize {
        self.code_width
    }

    /// Normalize raw user input to this table's code width.
    pub fn normalize(&self, raw: &str) -> Option<ZipCode> {
        ZipCode::normalize(raw, self.code_width)
    }

    pub fn get(&self, raw: &str) -> Option<&ZipRecord> {
        let code = self.normalize(raw)?;
        self.index.get(&code).map(|&i| &self.records[i])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Find a record by code, failing with a user-facing error on a miss.
    pub fn lookup(&self, raw: &str) -> Result<&ZipRecord> {
        self.get(raw)
            .ok_or_else(|| ZipError::CodeNotFound(raw.trim().to_string()))
    }

    /// Records whose code starts with any of `prefixes`, in table order.
    /// Blank prefixes are ignored.
    pub fn with_prefixes<S: AsRef<str>>(&self, prefixes: &[S]) -> Vec<&ZipRecord> {
        let prefixes: Vec<&str> = prefixes
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .collect();
        self.records
            .iter()
            .filter(|record| prefixes.iter().any(|p| record.code.starts_with(p)))
            .collect()
    }

    pub fn nearest(&self, point: &Point) -> Option<(&ZipRecord, f64)> {
        nearest(point, &self.records)
    }

    pub fn radius_query(&self, origin: Point, radius_km: f64) -> Result<QueryResult> {
        radius_query(&self.records, origin, radius_km)
    }

    pub fn polygon_query(&self, polygon: Polygon) -> Result<QueryResult> {
        polygon_query(&self.records, polygon)
    }
}
