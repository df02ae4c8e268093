//! Export of selected records as CSV, TXT and workbook artifacts.
//!
//! Every export produces all three artifacts at once. Producing the actual
//! download (or an xlsx file from the workbook structure) is left to the
//! caller.

use crate::compute::spatial::QueryResult;
use crate::error::{Result, ZipError};
use crate::selection::SelectionState;
use crate::storage::ReferenceTable;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::path::{Path, PathBuf};
use zipscope_types::record::{ZipCode, ZipRecord};

pub mod workbook;

pub use workbook::{Sheet, Workbook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Txt,
    Workbook,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Csv, ExportFormat::Txt, ExportFormat::Workbook];

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
            ExportFormat::Workbook => "xlsx.json",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Txt => "text/plain",
            ExportFormat::Workbook => "application/json",
        }
    }
}

/// Which records an export covers.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportMode {
    /// Included codes of the last result.
    Selected,
    /// Table rows under any of the prefixes that are also included in the
    /// last result. With no prefixes, the included codes of the last result.
    Filtered { prefixes: Vec<String> },
    /// Table rows whose code is absent from a user-supplied list.
    Unmatched { codes: Vec<ZipCode> },
}

impl ExportMode {
    /// File name without extension.
    pub fn stem(&self) -> &'static str {
        match self {
            ExportMode::Selected => "zip_export_selected",
            ExportMode::Filtered { .. } => "zip_export_filtered",
            ExportMode::Unmatched { .. } => "unmatched_zipcodes",
        }
    }

    fn code_header(&self) -> &'static str {
        match self {
            ExportMode::Unmatched { .. } => "plz",
            _ => "zip",
        }
    }

    fn sheet_name(&self) -> &'static str {
        match self {
            ExportMode::Unmatched { .. } => "Unmatched ZIPs",
            _ => "ZIPs",
        }
    }

    fn empty_message(&self) -> &'static str {
        match self {
            ExportMode::Selected => "No ZIPs selected.",
            ExportMode::Filtered { .. } => "No ZIPs matched.",
            ExportMode::Unmatched { .. } => "All ZIPs were matched.",
        }
    }
}

/// One downloadable export payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub media_type: &'static str,
    pub content: String,
}

/// The three artifacts of one export action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportBundle {
    pub record_count: usize,
    pub artifacts: Vec<Artifact>,
}

impl ExportBundle {
    pub fn artifact(&self, format: ExportFormat) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.format == format)
    }

    /// Write every artifact into `dir`, returning the paths written.
    pub fn write_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let path = dir.join(&artifact.file_name);
            std::fs::write(&path, &artifact.content)?;
            log::info!("wrote {} ({} bytes)", path.display(), artifact.content.len());
            written.push(path);
        }
        Ok(written)
    }
}

/// Records of `result` whose code is included.
pub fn selected_records<'a>(
    result: &'a QueryResult,
    selection: &SelectionState,
) -> Vec<&'a ZipRecord> {
    result
        .records()
        .filter(|record| selection.is_included(record.code.as_str()))
        .collect()
}

/// Table rows under `prefixes` whose code is included in the current
/// selection. Falls back to [`selected_records`] when no prefix is given.
pub fn filtered_records<'a, S: AsRef<str>>(
    table: &'a ReferenceTable,
    prefixes: &[S],
    result: &'a QueryResult,
    selection: &SelectionState,
) -> Vec<&'a ZipRecord> {
    if prefixes.iter().all(|p| p.as_ref().trim().is_empty()) {
        return selected_records(result, selection);
    }
    table
        .with_prefixes(prefixes)
        .into_iter()
        .filter(|record| selection.is_included(record.code.as_str()))
        .collect()
}

/// Table rows whose code does not appear in `codes`.
pub fn unmatched_records<'a>(table: &'a ReferenceTable, codes: &[ZipCode]) -> Vec<&'a ZipRecord> {
    let input: FxHashSet<&str> = codes.iter().map(ZipCode::as_str).collect();
    table
        .records()
        .iter()
        .filter(|record| !input.contains(record.code.as_str()))
        .collect()
}

/// Render one artifact.
///
/// CSV rows are joined by `\n` without a trailing newline and print
/// coordinates in their shortest round-trip form.
pub fn render(records: &[&ZipRecord], mode: &ExportMode, format: ExportFormat) -> Result<Artifact> {
    let content = match format {
        ExportFormat::Csv => to_csv(records, mode.code_header())?,
        ExportFormat::Txt => records
            .iter()
            .map(|record| record.code.as_str())
            .collect::<Vec<_>>()
            .join(","),
        ExportFormat::Workbook => serde_json::to_string_pretty(&Workbook::single_sheet(
            mode.sheet_name(),
            records.iter().copied(),
        ))?,
    };

    Ok(Artifact {
        file_name: format!("{}.{}", mode.stem(), format.extension()),
        format,
        media_type: format.media_type(),
        content,
    })
}

/// Render all three artifacts, or fail with a user-facing error when there
/// is nothing to export.
pub fn export(records: &[&ZipRecord], mode: &ExportMode) -> Result<ExportBundle> {
    if records.is_empty() {
        return Err(ZipError::NoMatches(mode.empty_message().to_string()));
    }

    let artifacts = ExportFormat::ALL
        .iter()
        .map(|&format| render(records, mode, format))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("exported {} records as {}", records.len(), mode.stem());
    Ok(ExportBundle {
        record_count: records.len(),
        artifacts,
    })
}

fn to_csv(records: &[&ZipRecord], code_header: &str) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([code_header, "lat", "lon"])?;
    for record in records {
        writer.serialize((record.code.as_str(), record.lat, record.lon))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ZipError::Io(e.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|e| ZipError::InvalidFormat(format!("CSV output is not UTF-8: {}", e)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
