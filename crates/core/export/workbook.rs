//! Tabular structure handed to an external spreadsheet writer.

use serde::Serialize;
use zipscope_types::record::ZipRecord;

/// Column names of every sheet, matching the serialized record fields.
pub const COLUMNS: [&str; 3] = ["plz", "lat", "lon"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    /// One row per record.
    pub rows: Vec<ZipRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// A workbook with a single sheet.
    pub fn single_sheet<'a, I>(name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = &'a ZipRecord>,
    {
        Self {
            sheets: vec![Sheet {
                name: name.to_string(),
                columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: records.into_iter().cloned().collect(),
            }],
        }
    }
}
