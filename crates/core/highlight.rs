//! Highlighting of a user-supplied code list against the reference table.

use crate::compute::spatial::bounding_rect_for_points;
use crate::error::{Result, ZipError};
use crate::storage::ReferenceTable;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use zipscope_types::geo::Point;
use zipscope_types::record::{ZipCode, ZipRecord};

/// A table record mentioned in the list, with its heat weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub record: ZipRecord,
    /// How often the code appeared in the list.
    pub occurrences: usize,
    /// `occurrences * weight`, capped at 1.0.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    /// Matched table records in table order.
    pub matches: Vec<HeatPoint>,
    /// Distinct listed codes the table does not know, in list order.
    pub unknown: Vec<ZipCode>,
    /// South-west and north-east corners enclosing every match.
    pub bounds: (Point, Point),
}

/// Match `codes` against `table`.
///
/// Fails with a user-facing error when nothing in the list is in the table.
///
/// # Examples
///
/// ```
/// use zipscope::{ReferenceTable, highlight::highlight};
/// use zipscope::storage::parse_code_text;
///
/// let table = ReferenceTable::from_csv_str(
///     "plz,lat,lon\n08001,48.0,11.0\n50667,50.93,6.96\n",
///     5,
/// )?;
/// let codes = parse_code_text("8001, 08001, 99999", 5);
/// let result = highlight(&table, &codes, 0.3)?;
///
/// assert_eq!(result.matches.len(), 1);
/// assert_eq!(result.matches[0].occurrences, 2);
/// assert!((result.matches[0].weight - 0.6).abs() < 1e-12);
/// assert_eq!(result.unknown[0].as_str(), "99999");
/// # Ok::<(), zipscope::ZipError>(())
/// ```
pub fn highlight(table: &ReferenceTable, codes: &[ZipCode], weight: f64) -> Result<Highlight> {
    let mut frequency: FxHashMap<&str, usize> = FxHashMap::default();
    for code in codes {
        *frequency.entry(code.as_str()).or_default() += 1;
    }

    let matches: Vec<HeatPoint> = table
        .records()
        .iter()
        .filter_map(|record| {
            frequency.get(record.code.as_str()).map(|&occurrences| HeatPoint {
                record: record.clone(),
                occurrences,
                weight: (occurrences as f64 * weight).min(1.0),
            })
        })
        .collect();

    let points: Vec<Point> = matches.iter().map(|m| m.record.point()).collect();
    let Some(rect) = bounding_rect_for_points(&points) else {
        return Err(ZipError::NoMatches("No ZIPs matched for heatmap.".to_string()));
    };

    let mut seen = FxHashSet::default();
    let unknown: Vec<ZipCode> = codes
        .iter()
        .filter(|code| !table.contains(code.as_str()) && seen.insert(code.as_str()))
        .cloned()
        .collect();

    log::debug!(
        "highlight: {} listed codes, {} table matches, {} unknown",
        codes.len(),
        matches.len(),
        unknown.len()
    );

    Ok(Highlight {
        matches,
        unknown,
        bounds: (rect.min().into(), rect.max().into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::parse_code_text;

    fn table() -> ReferenceTable {
        ReferenceTable::from_csv_str(
            "plz,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0\n50667,50.93,6.96\n",
            5,
        )
        .unwrap()
    }

    #[test]
    fn test_weights_are_capped() {
        let codes = parse_code_text("50667,50667,50667,50667,08002", 5);
        let result = highlight(&table(), &codes, 0.3).unwrap();

        let weights: Vec<(&str, f64)> = result
            .matches
            .iter()
            .map(|m| (m.record.code.as_str(), m.weight))
            .collect();
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].0, "08002");
        assert!((weights[0].1 - 0.3).abs() < 1e-12);
        assert_eq!(weights[1], ("50667", 1.0));
        assert!(result.unknown.is_empty());
    }

    #[test]
    fn test_bounds_cover_matches() {
        let codes = parse_code_text("08001,50667", 5);
        let result = highlight(&table(), &codes, 0.3).unwrap();
        let (sw, ne) = result.bounds;
        assert_eq!((sw.lat(), sw.lon()), (48.0, 6.96));
        assert_eq!((ne.lat(), ne.lon()), (50.93, 11.0));
    }

    #[test]
    fn test_unknown_codes_deduplicated() {
        let codes = parse_code_text("99999,08001,99999,12345", 5);
        let result = highlight(&table(), &codes, 0.3).unwrap();
        let unknown: Vec<&str> = result.unknown.iter().map(|c| c.as_str()).collect();
        assert_eq!(unknown, vec!["99999", "12345"]);
    }

    #[test]
    fn test_no_matches_is_an_alert() {
        let codes = parse_code_text("99999", 5);
        let err = highlight(&table(), &codes, 0.3).unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), "No ZIPs matched for heatmap.");
        assert!(highlight(&table(), &[], 0.3).is_err());
    }
}
