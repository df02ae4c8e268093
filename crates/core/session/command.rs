//! Typed UI events and what handling them produced.

use crate::export::{ExportBundle, ExportMode};
use crate::highlight::Highlight;
use crate::storage::TableSource;
use serde::Serialize;
use zipscope_types::geo::{Point, Polygon};
use zipscope_types::record::ZipCode;

/// An event raised by the user interface.
#[derive(Debug)]
pub enum Command {
    /// Load the reference table, replacing any previous one.
    LoadTable(Box<dyn TableSource>),
    SetRadius(f64),
    /// Radius search around the record with this code.
    SearchCode(String),
    /// Radius search around the record nearest to a clicked point.
    MapClick(Point),
    /// Radius search around the record nearest to a geocoded location.
    Geocoded(Point),
    DrawPolygon(Polygon),
    SetCode { code: String, included: bool },
    SetPrefix { prefix: String, included: bool },
    SelectAll,
    DeselectAll,
    /// The "Select All" button: clears when everything is already selected.
    ToggleAll,
    Export(ExportMode),
    Highlight(Vec<ZipCode>),
}

/// Summary of a freshly computed result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    /// The code the search was centred on, if it came from a code or a click.
    pub located: Option<ZipCode>,
    pub origin: Point,
    pub hits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The command needs data that is not there yet; nothing happened.
    Ignored,
    Loaded { records: usize, skipped: usize },
    RadiusSet { radius_km: f64 },
    Results(ResultSummary),
    SelectionChanged { included: usize, visible: usize },
    Exported(ExportBundle),
    Highlighted(Highlight),
}
