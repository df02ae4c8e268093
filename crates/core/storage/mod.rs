//! Reference-table storage and the sources it can be loaded from.
//!
//! The table lives in memory for the whole session. Where it comes from is
//! abstracted behind [`TableSource`] so the session does not care whether the
//! rows were fetched from disk, embedded text or built in code.

use crate::error::Result;
use std::path::PathBuf;
use zipscope_types::record::ZipRecord;

pub mod loader;
mod table;

pub use loader::{ParsedTable, parse_code_column, parse_code_text, parse_table};
pub use table::ReferenceTable;

/// Something a [`ReferenceTable`] can be loaded from.
pub trait TableSource: std::fmt::Debug {
    /// Load the table, padding codes to `code_width`.
    fn load(&self, code_width: usize) -> Result<ReferenceTable>;

    /// Short description for log messages.
    fn describe(&self) -> String;
}

/// A CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFile(pub PathBuf);

impl TableSource for CsvFile {
    fn load(&self, code_width: usize) -> Result<ReferenceTable> {
        ReferenceTable::from_path(&self.0, code_width)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.0.display())
    }
}

/// CSV text already held in memory.
#[derive(Debug, Clone)]
pub struct CsvText(pub String);

impl TableSource for CsvText {
    fn load(&self, code_width: usize) -> Result<ReferenceTable> {
        ReferenceTable::from_csv_str(&self.0, code_width)
    }

    fn describe(&self) -> String {
        format!("{} bytes of csv text", self.0.len())
    }
}

impl TableSource for Vec<ZipRecord> {
    fn load(&self, code_width: usize) -> Result<ReferenceTable> {
        Ok(ReferenceTable::from_records(self.clone(), code_width))
    }

    fn describe(&self) -> String {
        format!("{} in-memory records", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipscope_types::record::ZipCode;

    #[test]
    fn test_sources_load_same_table() {
        let text = CsvText("plz,lat,lon\n08001,48.0,11.0\n".to_string());
        let records = vec![ZipRecord::new(
            ZipCode::normalize("08001", 5).unwrap(),
            48.0,
            11.0,
        )];

        let from_text = text.load(5).unwrap();
        let from_records = records.load(5).unwrap();
        assert_eq!(from_text.records(), from_records.records());
        assert!(text.describe().contains("csv text"));
    }
}
