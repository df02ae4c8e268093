//! The stateful controller a user interface drives.
//!
//! A [`Session`] owns the reference table, the current search radius and the
//! view of the last result (the result itself, its prefix tree and the
//! selection over it). Every new query replaces the whole view; a command that
//! fails leaves the previous view untouched.
//!
//! Until a table is loaded, commands that need one are ignored rather than
//! rejected.

use crate::builder::SessionBuilder;
use crate::compute::histogram::{Bucket, distance_histogram};
use crate::compute::spatial::{QueryResult, QueryShape};
use crate::compute::validation::{validate_geographic_point, validate_radius};
use crate::config::Config;
use crate::error::{Result, ZipError};
use crate::export::{self, ExportMode};
use crate::highlight::{self, HeatPoint};
use crate::selection::{PrefixTree, SelectionState};
use crate::storage::{ReferenceTable, TableSource};
use serde::Serialize;
use zipscope_types::geo::{Point, Polygon};
use zipscope_types::record::{ZipCode, ZipRecord};

mod command;

pub use command::{Command, Outcome, ResultSummary};

/// How a table record is drawn relative to the last result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerClass {
    /// In the last result and included.
    Selected,
    /// In the last result but excluded.
    Unselected,
    Outside,
}

/// The last result together with the structures derived from it.
#[derive(Debug, Clone)]
pub struct ResultView {
    result: QueryResult,
    tree: PrefixTree,
    selection: SelectionState,
}

impl ResultView {
    fn new(result: QueryResult) -> Self {
        let tree = PrefixTree::build(result.records());
        let selection = SelectionState::for_result(&result);
        Self {
            result,
            tree,
            selection,
        }
    }

    pub fn result(&self) -> &QueryResult {
        &self.result
    }

    pub fn tree(&self) -> &PrefixTree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }
}

#[derive(Debug)]
pub struct Session {
    config: Config,
    table: Option<ReferenceTable>,
    radius_km: f64,
    view: Option<ResultView>,
}

impl Session {
    /// Create a session without a table.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            radius_km: config.default_radius_km,
            config,
            table: None,
            view: None,
        })
    }

    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether a reference table has been loaded.
    pub fn is_ready(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Option<&ReferenceTable> {
        self.table.as_ref()
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn view(&self) -> Option<&ResultView> {
        self.view.as_ref()
    }

    pub fn last_result(&self) -> Option<&QueryResult> {
        self.view.as_ref().map(|view| &view.result)
    }

    /// Dispatch one user-interface command.
    pub fn handle(&mut self, command: Command) -> Result<Outcome> {
        let outcome = match command {
            Command::LoadTable(source) => self.load_table(source.as_ref()),
            Command::SetRadius(radius_km) => self.set_radius(radius_km),
            Command::SearchCode(code) => self.search_code(&code),
            Command::MapClick(point) | Command::Geocoded(point) => self.locate(point),
            Command::DrawPolygon(polygon) => self.draw_polygon(polygon),
            Command::SetCode { code, included } => self.set_code(&code, included),
            Command::SetPrefix { prefix, included } => self.set_prefix(&prefix, included),
            Command::SelectAll => self.select_all(),
            Command::DeselectAll => self.deselect_all(),
            Command::ToggleAll => self.toggle_all(),
            Command::Export(mode) => self.export(&mode),
            Command::Highlight(codes) => self.highlight(&codes),
        };

        if let Err(e) = &outcome {
            if e.is_user_facing() {
                log::debug!("command rejected: {}", e);
            } else {
                log::warn!("command failed: {}", e);
            }
        }
        outcome
    }

    /// Load (or replace) the reference table. Any previous result is dropped.
    pub fn load_table(&mut self, source: &dyn TableSource) -> Result<Outcome> {
        let table = source.load(self.config.code_width)?;
        log::info!(
            "loaded {} records from {} ({} rows skipped)",
            table.len(),
            source.describe(),
            table.skipped_rows()
        );

        let outcome = Outcome::Loaded {
            records: table.len(),
            skipped: table.skipped_rows(),
        };
        self.table = Some(table);
        self.view = None;
        Ok(outcome)
    }

    /// Radius used by subsequent searches. The current result is kept.
    pub fn set_radius(&mut self, radius_km: f64) -> Result<Outcome> {
        validate_radius(radius_km)?;
        self.radius_km = radius_km;
        Ok(Outcome::RadiusSet { radius_km })
    }

    /// Radius search around the record with `code`.
    pub fn search_code(&mut self, code: &str) -> Result<Outcome> {
        let Some(table) = self.table.as_ref() else {
            return Ok(Outcome::Ignored);
        };
        let record = table.lookup(code)?;
        let result = table.radius_query(record.point(), self.radius_km)?;
        let located = Some(record.code.clone());
        self.install(result, located)
    }

    /// Radius search around the record nearest to `point`.
    pub fn locate(&mut self, point: Point) -> Result<Outcome> {
        let Some(table) = self.table.as_ref() else {
            return Ok(Outcome::Ignored);
        };
        validate_geographic_point(&point)?;
        let Some((record, distance)) = table.nearest(&point) else {
            return Err(ZipError::NoMatches("No ZIPs loaded.".to_string()));
        };
        log::debug!("nearest code to click is {} at {:.3} km", record.code, distance);

        let result = table.radius_query(record.point(), self.radius_km)?;
        let located = Some(record.code.clone());
        self.install(result, located)
    }

    pub fn draw_polygon(&mut self, polygon: Polygon) -> Result<Outcome> {
        let Some(table) = self.table.as_ref() else {
            return Ok(Outcome::Ignored);
        };
        let result = table.polygon_query(polygon)?;
        self.install(result, None)
    }

    fn install(&mut self, result: QueryResult, located: Option<ZipCode>) -> Result<Outcome> {
        if result.is_empty() {
            let message = match result.shape() {
                QueryShape::Radius { radius_km, .. } => {
                    format!("No ZIPs found within {} km.", radius_km)
                }
                QueryShape::Polygon { .. } => "No ZIPs found in the drawn area.".to_string(),
            };
            return Err(ZipError::NoMatches(message));
        }

        let summary = ResultSummary {
            located,
            origin: result.origin(),
            hits: result.len(),
        };
        log::info!("new result with {} hits", summary.hits);
        self.view = Some(ResultView::new(result));
        Ok(Outcome::Results(summary))
    }

    pub fn set_code(&mut self, code: &str, included: bool) -> Result<Outcome> {
        let code = self.normalize(code);
        let Some(view) = self.view.as_mut() else {
            return Ok(Outcome::Ignored);
        };
        view.selection.set_code(&code, included)?;
        Ok(self.selection_changed())
    }

    pub fn set_prefix(&mut self, prefix: &str, included: bool) -> Result<Outcome> {
        let Some(view) = self.view.as_mut() else {
            return Ok(Outcome::Ignored);
        };
        view.selection.set_prefix(prefix, included)?;
        Ok(self.selection_changed())
    }

    pub fn select_all(&mut self) -> Result<Outcome> {
        self.with_selection(SelectionState::select_all)
    }

    pub fn deselect_all(&mut self) -> Result<Outcome> {
        self.with_selection(SelectionState::deselect_all)
    }

    pub fn toggle_all(&mut self) -> Result<Outcome> {
        self.with_selection(|selection| {
            selection.toggle_all();
        })
    }

    fn with_selection<F: FnOnce(&mut SelectionState)>(&mut self, f: F) -> Result<Outcome> {
        let Some(view) = self.view.as_mut() else {
            return Ok(Outcome::Ignored);
        };
        f(&mut view.selection);
        Ok(self.selection_changed())
    }

    fn selection_changed(&self) -> Outcome {
        let (included, visible) = self
            .view
            .as_ref()
            .map(|view| (view.selection.included_count(), view.selection.visible_count()))
            .unwrap_or_default();
        Outcome::SelectionChanged { included, visible }
    }

    /// Pad a user-entered code to the table width, keeping it verbatim when
    /// it does not normalize.
    fn normalize(&self, raw: &str) -> String {
        self.table
            .as_ref()
            .and_then(|table| table.normalize(raw))
            .map(|code| code.as_str().to_string())
            .unwrap_or_else(|| raw.trim().to_string())
    }

    /// Produce the three export artifacts for `mode`.
    ///
    /// Without a result, the selected and filtered modes have nothing to
    /// export and fail like an empty selection would.
    pub fn export(&self, mode: &ExportMode) -> Result<Outcome> {
        let Some(table) = self.table.as_ref() else {
            return Ok(Outcome::Ignored);
        };

        let records: Vec<&ZipRecord> = match (mode, self.view.as_ref()) {
            (ExportMode::Unmatched { codes }, _) => export::unmatched_records(table, codes),
            (ExportMode::Selected, Some(view)) => {
                export::selected_records(&view.result, &view.selection)
            }
            (ExportMode::Filtered { prefixes }, Some(view)) => {
                export::filtered_records(table, prefixes, &view.result, &view.selection)
            }
            (_, None) => Vec::new(),
        };

        let bundle = export::export(&records, mode)?;
        Ok(Outcome::Exported(bundle))
    }

    /// Highlight a code list against the table. The current result is kept.
    pub fn highlight(&self, codes: &[ZipCode]) -> Result<Outcome> {
        let Some(table) = self.table.as_ref() else {
            return Ok(Outcome::Ignored);
        };
        let highlight = highlight::highlight(table, codes, self.config.highlight_weight)?;
        Ok(Outcome::Highlighted(highlight))
    }

    /// Distance histogram of the last result.
    pub fn histogram(&self) -> Option<Vec<Bucket>> {
        self.view
            .as_ref()
            .map(|view| distance_histogram(&view.result, &self.config.histogram_edges_km))
    }

    /// Heat layer of the last result: every hit at the configured weight.
    pub fn result_heat(&self) -> Option<Vec<HeatPoint>> {
        let weight = self.config.result_heat_weight;
        self.view.as_ref().map(|view| {
            view.result
                .hits()
                .iter()
                .map(|hit| HeatPoint {
                    record: hit.record.clone(),
                    occurrences: 1,
                    weight,
                })
                .collect()
        })
    }

    /// Every table record with its marker class, in table order.
    ///
    /// Rows are matched against the result by row, not by code, so a
    /// duplicate code far from the search stays `Outside`.
    pub fn marker_classes(&self) -> Vec<(&ZipRecord, MarkerClass)> {
        let Some(table) = self.table.as_ref() else {
            return Vec::new();
        };
        let Some(view) = self.view.as_ref() else {
            return table
                .records()
                .iter()
                .map(|record| (record, MarkerClass::Outside))
                .collect();
        };

        // Hits are a table-order subsequence of the rows.
        let mut hits = view.result.hits().iter().peekable();
        table
            .records()
            .iter()
            .map(|record| {
                let class = match hits.next_if(|hit| hit.record == *record) {
                    Some(_) if view.selection.is_included(record.code.as_str()) => {
                        MarkerClass::Selected
                    }
                    Some(_) => MarkerClass::Unselected,
                    None => MarkerClass::Outside,
                };
                (record, class)
            })
            .collect()
    }
}
