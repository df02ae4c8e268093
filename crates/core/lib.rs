//! Postal-code proximity and selection engine.
//!
//! ## Features
//! - **Reference table**: postal codes with coordinates, loaded from CSV with
//!   malformed rows dropped and counted
//! - **Spatial queries**: great-circle radius search and polygon search, both
//!   boundary-inclusive
//! - **Prefix tree**: results grouped by the first 1 to 4 characters of the code
//! - **Selection**: include or exclude single codes or whole prefix groups with
//!   tri-state group controls
//! - **Export**: CSV, TXT and workbook artifacts for the selected, filtered or
//!   unmatched records
//! - **Highlight**: weight a user-supplied code list against the table
//!
//! ```rust
//! use zipscope::{Command, Outcome, Session};
//! use zipscope::export::{ExportFormat, ExportMode};
//! use zipscope::storage::CsvText;
//!
//! let mut session = Session::builder()
//!     .table(CsvText(
//!         "plz,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0\n50667,50.93,6.96\n".into(),
//!     ))
//!     .radius_km(5.0)
//!     .build()?;
//!
//! session.handle(Command::SearchCode("08001".into()))?;
//! assert_eq!(session.last_result().unwrap().len(), 2);
//!
//! if let Outcome::Exported(bundle) = session.handle(Command::Export(ExportMode::Selected))? {
//!     let csv = bundle.artifact(ExportFormat::Csv).unwrap();
//!     assert_eq!(csv.content, "zip,lat,lon\n08001,48.0,11.0\n08002,48.01,11.0");
//! }
//! # Ok::<(), zipscope::ZipError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod export;
pub mod highlight;
pub mod selection;
pub mod session;
pub mod storage;

pub use builder::SessionBuilder;
pub use config::Config;
pub use error::{Result, ZipError};
pub use session::{Command, MarkerClass, Outcome, ResultSummary, ResultView, Session};
pub use storage::{ReferenceTable, TableSource};

pub use zipscope_types::geo::{Point, Polygon};
pub use zipscope_types::record::{ZipCode, ZipRecord};

pub use compute::spatial::{QueryHit, QueryResult, QueryShape};
pub use compute::validation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Result, Session, SessionBuilder, ZipError};

    pub use crate::{Command, MarkerClass, Outcome};

    pub use crate::{Point, Polygon, ZipCode, ZipRecord};

    pub use crate::{Config, QueryResult, ReferenceTable, TableSource};

    pub use crate::export::{ExportFormat, ExportMode};
    pub use crate::selection::{CheckState, PrefixTree, SelectionState};
    pub use crate::storage::{CsvFile, CsvText};
}
