//! Validation for coordinates, radii and drawn polygons.

use crate::error::{Result, ZipError};
use zipscope_types::geo::{Point, Polygon};

/// Validates a point has finite, in-range longitude and latitude.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use zipscope::compute::validation::validate_geographic_point;
/// use zipscope_types::geo::Point;
///
/// assert!(validate_geographic_point(&Point::from_lat_lon(48.0, 11.0)).is_ok());
/// assert!(validate_geographic_point(&Point::from_lat_lon(95.0, 11.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &Point) -> Result<()> {
    let (lon, lat) = (point.lon(), point.lat());

    if !lon.is_finite() || !lat.is_finite() {
        return Err(ZipError::InvalidInput(format!(
            "Coordinates must be finite, got lat {} lon {}",
            lat, lon
        )));
    }

    if !(-180.0..=180.0).contains(&lon) {
        return Err(ZipError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            lon
        )));
    }

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ZipError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            lat
        )));
    }

    Ok(())
}

/// Validates a search radius in kilometres. Zero is allowed and matches only
/// records sitting exactly on the origin.
pub fn validate_radius(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(ZipError::InvalidInput(format!(
            "Radius must be a finite, non-negative number of km, got {}",
            radius_km
        )));
    }
    Ok(())
}

/// Validates a drawn polygon: finite vertices and an exterior ring with at
/// least three distinct vertices.
pub fn validate_polygon(polygon: &Polygon) -> Result<()> {
    let exterior = polygon.exterior();

    if exterior
        .coords()
        .chain(polygon.interiors().iter().flat_map(|ring| ring.coords()))
        .any(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(ZipError::InvalidInput(
            "Polygon vertices must be finite".to_string(),
        ));
    }

    let mut distinct: Vec<(f64, f64)> = Vec::with_capacity(exterior.0.len());
    for coord in exterior.coords() {
        if !distinct.contains(&(coord.x, coord.y)) {
            distinct.push((coord.x, coord.y));
        }
    }
    if distinct.len() < 3 {
        return Err(ZipError::InvalidInput(format!(
            "Polygon needs at least 3 distinct vertices, got {}",
            distinct.len()
        )));
    }

    Ok(())
}
