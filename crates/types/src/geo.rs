//! Wrapped geometric types from the `geo` crate.
//!
//! Coordinates follow the GeoJSON convention: `x` is longitude, `y` is latitude.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use serde::{Deserialize, Serialize};

/// Error type for GeoJSON conversions.
#[derive(Debug)]
pub enum GeoJsonError {
    /// Deserialization failed
    Deserialization(String),
    /// The document holds something other than a polygon
    InvalidGeometry(String),
    /// Invalid coordinates
    InvalidCoordinates(String),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deserialization(msg) => write!(f, "GeoJSON deserialization error: {}", msg),
            Self::InvalidGeometry(msg) => write!(f, "Invalid GeoJSON geometry: {}", msg),
            Self::InvalidCoordinates(msg) => write!(f, "Invalid GeoJSON coordinates: {}", msg),
        }
    }
}

impl std::error::Error for GeoJsonError {}

/// A geographic point with longitude/latitude coordinates.
///
/// # Examples
///
/// ```
/// use zipscope_types::geo::Point;
///
/// let munich = Point::from_lat_lon(48.137, 11.575);
/// assert_eq!(munich.lon(), 11.575);
/// assert_eq!(munich.lat(), 48.137);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    inner: geo::Point<f64>,
}

impl Point {
    /// Create a point from x (longitude) and y (latitude).
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            inner: geo::Point::new(lon, lat),
        }
    }

    /// Create a point from latitude first, the order map widgets report.
    #[inline]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self::new(lon, lat)
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.inner.x()
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.inner.y()
    }

    /// Both coordinates are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon().is_finite() && self.lat().is_finite()
    }

    /// Access the inner `geo::Point`.
    #[inline]
    pub fn inner(&self) -> &geo::Point<f64> {
        &self.inner
    }
}

impl From<geo::Point<f64>> for Point {
    fn from(point: geo::Point<f64>) -> Self {
        Self { inner: point }
    }
}

impl From<geo::Coord<f64>> for Point {
    fn from(coord: geo::Coord<f64>) -> Self {
        Self::new(coord.x, coord.y)
    }
}

impl From<Point> for geo::Point<f64> {
    fn from(point: Point) -> Self {
        point.inner
    }
}

impl From<(f64, f64)> for Point {
    fn from((lon, lat): (f64, f64)) -> Self {
        Self::new(lon, lat)
    }
}

/// A polygon drawn over the map, with an exterior ring and optional holes.
///
/// Membership tests treat the boundary as inside, so a postal code sitting
/// exactly on a drawn edge is still selected.
///
/// # Examples
///
/// ```
/// use zipscope_types::geo::{Point, Polygon};
///
/// let square = Polygon::from_ring(&[
///     [10.0, 47.0],
///     [12.0, 47.0],
///     [12.0, 49.0],
///     [10.0, 49.0],
///     [10.0, 47.0],
/// ]);
/// assert!(square.covers(&Point::new(11.0, 48.0)));
/// assert!(square.covers(&Point::new(12.0, 48.0)));
/// assert!(!square.covers(&Point::new(13.0, 48.0)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    inner: geo::Polygon<f64>,
}

impl Polygon {
    pub fn new(exterior: geo::LineString<f64>, interiors: Vec<geo::LineString<f64>>) -> Self {
        Self {
            inner: geo::Polygon::new(exterior, interiors),
        }
    }

    /// Build a polygon from a ring of `[lon, lat]` pairs.
    ///
    /// An unclosed ring is closed by `geo`.
    pub fn from_ring(ring: &[[f64; 2]]) -> Self {
        let coords: Vec<geo::Coord> = ring.iter().map(|&[x, y]| geo::Coord { x, y }).collect();
        Self::new(geo::LineString::from(coords), vec![])
    }

    #[inline]
    pub fn exterior(&self) -> &geo::LineString<f64> {
        self.inner.exterior()
    }

    #[inline]
    pub fn interiors(&self) -> &[geo::LineString<f64>] {
        self.inner.interiors()
    }

    #[inline]
    pub fn inner(&self) -> &geo::Polygon<f64> {
        &self.inner
    }

    /// Whether the point lies inside the polygon or on its boundary.
    #[inline]
    pub fn covers(&self, point: &Point) -> bool {
        self.inner.coordinate_position(&point.inner.0) != CoordPos::Outside
    }

    /// Centre of the polygon's bounding rectangle, `None` for an empty ring.
    pub fn bounding_center(&self) -> Option<Point> {
        use geo::BoundingRect;
        self.inner.bounding_rect().map(|rect| rect.center().into())
    }

    /// Parse a GeoJSON `Polygon` geometry, or a `Feature` wrapping one.
    ///
    /// Draw widgets typically hand over a whole feature, so both are accepted.
    ///
    /// ```
    /// # #[cfg(feature = "geojson")]
    /// # {
    /// use zipscope_types::geo::Polygon;
    ///
    /// let json = r#"{"type":"Feature","properties":{},"geometry":{"type":"Polygon",
    ///     "coordinates":[[[10.0,47.0],[12.0,47.0],[12.0,49.0],[10.0,47.0]]]}}"#;
    /// let polygon = Polygon::from_geojson(json).unwrap();
    /// assert_eq!(polygon.exterior().coords().count(), 4);
    /// # }
    /// ```
    #[cfg(feature = "geojson")]
    pub fn from_geojson(text: &str) -> Result<Self, GeoJsonError> {
        use geojson::{GeoJson, Value};

        let doc: GeoJson = text
            .parse()
            .map_err(|e| GeoJsonError::Deserialization(format!("Failed to parse GeoJSON: {}", e)))?;

        let geometry = match doc {
            GeoJson::Geometry(geometry) => geometry,
            GeoJson::Feature(feature) => feature.geometry.ok_or_else(|| {
                GeoJsonError::InvalidGeometry("Feature has no geometry".to_string())
            })?,
            GeoJson::FeatureCollection(_) => {
                return Err(GeoJsonError::InvalidGeometry(
                    "expected a single Polygon, got a FeatureCollection".to_string(),
                ));
            }
        };

        let rings = match geometry.value {
            Value::Polygon(rings) => rings,
            _ => {
                return Err(GeoJsonError::InvalidGeometry(
                    "GeoJSON geometry is not a Polygon".to_string(),
                ));
            }
        };

        let mut lines = Vec::with_capacity(rings.len());
        for ring in &rings {
            let mut coords = Vec::with_capacity(ring.len());
            for position in ring {
                if position.len() < 2 {
                    return Err(GeoJsonError::InvalidCoordinates(
                        "Coordinate must have at least 2 values".to_string(),
                    ));
                }
                coords.push(geo::Coord {
                    x: position[0],
                    y: position[1],
                });
            }
            lines.push(geo::LineString::from(coords));
        }

        let mut lines = lines.into_iter();
        let exterior = lines.next().ok_or_else(|| {
            GeoJsonError::InvalidCoordinates("Polygon must have at least one ring".to_string())
        })?;
        Ok(Polygon::new(exterior, lines.collect()))
    }
}

impl From<geo::Polygon<f64>> for Polygon {
    fn from(polygon: geo::Polygon<f64>) -> Self {
        Self { inner: polygon }
    }
}
