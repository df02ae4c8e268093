//! Radius and polygon filtering over the reference table.
//!
//! Both queries are a linear scan over the records and keep table order.
//! Tables of a few tens of thousands of rows scan in well under a millisecond,
//! so there is no spatial index.

use crate::compute::spatial::distance_km;
use crate::compute::validation::{validate_geographic_point, validate_polygon, validate_radius};
use crate::error::Result;
use serde::Serialize;
use std::cmp::Ordering;
use zipscope_types::geo::{Point, Polygon};
use zipscope_types::record::{ZipCode, ZipRecord};

/// The predicate a result was produced with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryShape {
    Radius { origin: Point, radius_km: f64 },
    Polygon { polygon: Polygon, center: Point },
}

impl QueryShape {
    /// The point distances are measured from: the search origin, or the centre
    /// of the polygon's bounding rectangle.
    pub fn origin(&self) -> Point {
        match self {
            QueryShape::Radius { origin, .. } => *origin,
            QueryShape::Polygon { center, .. } => *center,
        }
    }
}

/// One record matched by a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryHit {
    pub record: ZipRecord,
    pub distance_km: f64,
}

/// Records matched by a single query, in table order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    shape: QueryShape,
    hits: Vec<QueryHit>,
}

impl QueryResult {
    pub fn shape(&self) -> &QueryShape {
        &self.shape
    }

    pub fn origin(&self) -> Point {
        self.shape.origin()
    }

    pub fn hits(&self) -> &[QueryHit] {
        &self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ZipRecord> + '_ {
        self.hits.iter().map(|hit| &hit.record)
    }

    pub fn codes(&self) -> impl Iterator<Item = &ZipCode> + '_ {
        self.records().map(|record| &record.code)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes().any(|c| c.as_str() == code)
    }

    /// Driving-route link from the result origin to `hit`.
    pub fn route_url(&self, hit: &QueryHit) -> String {
        let origin = self.origin();
        format!(
            "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}",
            origin.lat(),
            origin.lon(),
            hit.record.lat,
            hit.record.lon
        )
    }

    /// Hits ordered by ascending distance, the order of the result list.
    /// Equal distances keep table order.
    pub fn by_distance(&self) -> Vec<&QueryHit> {
        let mut sorted: Vec<&QueryHit> = self.hits.iter().collect();
        sorted.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }
}

/// Every record within `radius_km` of `origin`, boundary inclusive.
///
/// # Examples
///
/// ```
/// use zipscope::compute::spatial::radius_query;
/// use zipscope_types::geo::Point;
/// use zipscope_types::record::{ZipCode, ZipRecord};
///
/// let records = vec![
///     ZipRecord::new(ZipCode::normalize("08001", 5).unwrap(), 48.0, 11.0),
///     ZipRecord::new(ZipCode::normalize("08002", 5).unwrap(), 48.01, 11.0),
///     ZipRecord::new(ZipCode::normalize("50667", 5).unwrap(), 50.93, 6.96),
/// ];
/// let origin = Point::from_lat_lon(48.0, 11.0);
///
/// let result = radius_query(&records, origin, 5.0)?;
/// assert_eq!(result.len(), 2);
/// # Ok::<(), zipscope::ZipError>(())
/// ```
pub fn radius_query(records: &[ZipRecord], origin: Point, radius_km: f64) -> Result<QueryResult> {
    validate_geographic_point(&origin)?;
    validate_radius(radius_km)?;

    let hits: Vec<QueryHit> = records
        .iter()
        .filter_map(|record| {
            let distance_km = distance_km(&origin, &record.point());
            (distance_km <= radius_km).then(|| QueryHit {
                record: record.clone(),
                distance_km,
            })
        })
        .collect();

    log::debug!(
        "radius query at ({}, {}) r={}km matched {} of {} records",
        origin.lat(),
        origin.lon(),
        radius_km,
        hits.len(),
        records.len()
    );

    Ok(QueryResult {
        shape: QueryShape::Radius { origin, radius_km },
        hits,
    })
}

/// Every record inside `polygon` or on its boundary.
///
/// Distances are measured from the centre of the polygon's bounding rectangle.
pub fn polygon_query(records: &[ZipRecord], polygon: Polygon) -> Result<QueryResult> {
    validate_polygon(&polygon)?;
    let center = polygon.bounding_center().ok_or_else(|| {
        crate::error::ZipError::InvalidInput("Polygon has no extent".to_string())
    })?;

    let hits: Vec<QueryHit> = records
        .iter()
        .filter(|record| polygon.covers(&record.point()))
        .map(|record| QueryHit {
            distance_km: distance_km(&center, &record.point()),
            record: record.clone(),
        })
        .collect();

    log::debug!(
        "polygon query with {} vertices matched {} of {} records",
        polygon.exterior().0.len(),
        hits.len(),
        records.len()
    );

    Ok(QueryResult {
        shape: QueryShape::Polygon { polygon, center },
        hits,
    })
}
