//! # zipscope-types
//!
//! Value types shared by the zipscope crates:
//!
//! - **Geometry**: `Point` and `Polygon`, thin wrappers over `geo` primitives
//! - **Records**: `ZipCode` and `ZipRecord`, one row of a postal-code table
//!
//! All types are serializable with Serde. GeoJSON parsing of drawn polygons is
//! available behind the `geojson` feature.
//!
//! ```rust
//! use zipscope_types::geo::Point;
//! use zipscope_types::record::{ZipCode, ZipRecord};
//!
//! let code = ZipCode::normalize("50667", 5).unwrap();
//! let cologne = ZipRecord::new(code, 50.93, 6.96);
//! assert_eq!(cologne.point(), Point::new(6.96, 50.93));
//! ```

pub mod geo;
pub mod record;
