//! CSV parsing for reference tables and user-supplied code lists.
//!
//! Malformed rows are dropped without an error: a reference table with a few
//! bad lines is still usable, and the count of dropped rows is reported.

use crate::compute::validation::validate_geographic_point;
use crate::error::{Result, ZipError};
use csv::StringRecord;
use std::io::Read;
use zipscope_types::record::{ZipCode, ZipRecord};

const CODE_COLUMNS: &[&str] = &["plz", "zip", "zipcode", "zip_code", "postal_code", "code"];
const LAT_COLUMNS: &[&str] = &["lat", "latitude"];
const LON_COLUMNS: &[&str] = &["lon", "lng", "long", "longitude"];

/// Rows parsed from a table plus the number of rows that were dropped.
#[derive(Debug, Default)]
pub struct ParsedTable {
    pub records: Vec<ZipRecord>,
    pub skipped: usize,
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn find_column(headers: &StringRecord, aliases: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|alias| h.eq_ignore_ascii_case(alias)))
}

fn required_column(headers: &StringRecord, aliases: &[&str]) -> Result<usize> {
    find_column(headers, aliases).ok_or_else(|| {
        ZipError::InvalidFormat(format!(
            "missing column, expected one of {:?} in header {:?}",
            aliases,
            headers.iter().collect::<Vec<_>>()
        ))
    })
}

fn parse_coordinate(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Parse a reference table with a `plz,lat,lon` style header.
///
/// Rows with a bad code, unparsable coordinates or coordinates outside the
/// valid latitude/longitude range are dropped and counted in `skipped`.
pub fn parse_table<R: Read>(input: R, code_width: usize) -> Result<ParsedTable> {
    let mut reader = csv_reader(input);
    let headers = reader.headers()?.clone();
    let code_idx = required_column(&headers, CODE_COLUMNS)?;
    let lat_idx = required_column(&headers, LAT_COLUMNS)?;
    let lon_idx = required_column(&headers, LON_COLUMNS)?;

    let mut parsed = ParsedTable::default();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("dropping unreadable row: {}", e);
                parsed.skipped += 1;
                continue;
            }
        };

        let code = row
            .get(code_idx)
            .and_then(|raw| ZipCode::normalize(raw, code_width));
        let lat = parse_coordinate(row.get(lat_idx));
        let lon = parse_coordinate(row.get(lon_idx));

        let (Some(code), Some(lat), Some(lon)) = (code, lat, lon) else {
            parsed.skipped += 1;
            continue;
        };
        let record = ZipRecord::new(code, lat, lon);
        // Rows the queries would reject as an origin are unusable.
        if let Err(e) = validate_geographic_point(&record.point()) {
            log::debug!("dropping row {}: {}", record.code, e);
            parsed.skipped += 1;
            continue;
        }
        parsed.records.push(record);
    }

    Ok(parsed)
}

/// Parse the code column of a user-supplied CSV file.
///
/// Rows with an empty or invalid code are dropped; duplicates are kept since
/// highlight weights count occurrences.
pub fn parse_code_column<R: Read>(input: R, code_width: usize) -> Result<Vec<ZipCode>> {
    let mut reader = csv_reader(input);
    let headers = reader.headers()?.clone();
    let code_idx = required_column(&headers, CODE_COLUMNS)?;

    let mut codes = Vec::new();
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(_) => continue,
        };
        if let Some(code) = row
            .get(code_idx)
            .and_then(|raw| ZipCode::normalize(raw, code_width))
        {
            codes.push(code);
        }
    }
    Ok(codes)
}

/// Split free text on commas into normalized codes, dropping empty entries.
pub fn parse_code_text(text: &str, code_width: usize) -> Vec<ZipCode> {
    text.split(',')
        .filter_map(|raw| ZipCode::normalize(raw, code_width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(records: &[ZipRecord]) -> Vec<&str> {
        records.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_parse_table_pads_and_drops() {
        let csv = "plz,lat,lon\n\
                   1067,51.05,13.74\n\
                   50667,50.93,6.96\n\
                   ,48.0,11.0\n\
                   12345,abc,11.0\n\
                   23456,48.0,NaN\n\
                   34567,48.0\n";
        let parsed = parse_table(csv.as_bytes(), 5).unwrap();
        assert_eq!(codes(&parsed.records), vec!["01067", "50667"]);
        assert_eq!(parsed.skipped, 4);
    }

    #[test]
    fn test_parse_table_drops_out_of_range_coordinates() {
        let csv = "plz,lat,lon\n\
                   08001,95.0,11.0\n\
                   08002,48.0,200.0\n\
                   08003,-90.0,180.0\n\
                   08004,48.0,11.0\n";
        let parsed = parse_table(csv.as_bytes(), 5).unwrap();
        assert_eq!(codes(&parsed.records), vec!["08003", "08004"]);
        assert_eq!(parsed.skipped, 2);
    }

    #[test]
    fn test_parse_table_header_aliases_and_order() {
        let csv = "Latitude, Longitude, ZIP\n48.0, 11.0, 08001\n";
        let parsed = parse_table(csv.as_bytes(), 5).unwrap();
        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record.code.as_str(), "08001");
        assert_eq!((record.lat, record.lon), (48.0, 11.0));
    }

    #[test]
    fn test_parse_table_missing_column() {
        let csv = "plz,lat\n08001,48.0\n";
        assert!(matches!(
            parse_table(csv.as_bytes(), 5),
            Err(ZipError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_code_column() {
        let csv = "name,plz\nA,8001\nB,\nC,50667\nD,8001\n";
        let codes = parse_code_column(csv.as_bytes(), 5).unwrap();
        let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["08001", "50667", "08001"]);
    }

    #[test]
    fn test_parse_code_text() {
        let codes = parse_code_text(" 8001, ,50667,,08002 ", 5);
        let codes: Vec<&str> = codes.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, vec!["08001", "50667", "08002"]);
    }
}
