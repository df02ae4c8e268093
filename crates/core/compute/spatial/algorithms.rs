//! Distance and nearest-record helpers.

use geo::{BoundingRect, Rect};
use zipscope_types::geo::Point;
use zipscope_types::record::ZipRecord;

/// Mean Earth radius used by every distance in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two `(lat, lon)` pairs given
/// in degrees, using the haversine formula.
///
/// The haversine term is clamped to `[0, 1]`: rounding can push it just past 1
/// for antipodal points, which would otherwise turn the result into NaN.
///
/// # Examples
///
/// ```
/// use zipscope::compute::spatial::haversine_km;
///
/// let d = haversine_km(48.0, 11.0, 48.01, 11.0);
/// assert!((d - 1.112).abs() < 0.001);
/// assert_eq!(haversine_km(48.0, 11.0, 48.0, 11.0), 0.0);
/// ```
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Haversine distance in kilometres between two points.
#[inline]
pub fn distance_km(a: &Point, b: &Point) -> f64 {
    haversine_km(a.lat(), a.lon(), b.lat(), b.lon())
}

/// The record closest to `origin` and its distance in km.
///
/// Ties keep the record that comes first in table order. Records whose
/// distance is not finite are skipped.
pub fn nearest<'a>(origin: &Point, records: &'a [ZipRecord]) -> Option<(&'a ZipRecord, f64)> {
    records
        .iter()
        .map(|record| (record, distance_km(origin, &record.point())))
        .filter(|(_, dist)| dist.is_finite())
        .fold(None, |best, (record, dist)| match best {
            Some((_, best_dist)) if best_dist <= dist => best,
            _ => Some((record, dist)),
        })
}

/// Bounding rectangle of a set of points, `None` when empty.
pub fn bounding_rect_for_points(points: &[Point]) -> Option<Rect> {
    if points.is_empty() {
        return None;
    }

    let geo_points: Vec<geo::Point> = points.iter().map(|p| (*p).into()).collect();
    geo::MultiPoint::new(geo_points).bounding_rect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipscope_types::record::ZipCode;

    fn record(code: &str, lat: f64, lon: f64) -> ZipRecord {
        ZipRecord::new(ZipCode::normalize(code, 5).unwrap(), lat, lon)
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin to Munich is roughly 504 km.
        let d = haversine_km(52.52, 13.405, 48.137, 11.575);
        assert!((d - 504.0).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_haversine_symmetric() {
        let pairs = [
            (48.0, 11.0, 50.93, 6.96),
            (-33.86, 151.2, 51.5, -0.12),
            (0.0, 179.9, 0.0, -179.9),
        ];
        for (lat1, lon1, lat2, lon2) in pairs {
            let ab = haversine_km(lat1, lon1, lat2, lon2);
            let ba = haversine_km(lat2, lon2, lat1, lon1);
            assert!((ab - ba).abs() < 1e-9);
        }
    }

    #[test]
    fn test_haversine_zero_only_for_identical_points() {
        assert_eq!(haversine_km(50.93, 6.96, 50.93, 6.96), 0.0);
        assert!(haversine_km(50.93, 6.96, 50.93, 6.9600001) > 0.0);
    }

    #[test]
    fn test_haversine_antipodal_is_finite() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);

        let poles = haversine_km(90.0, 0.0, -90.0, 0.0);
        assert!((poles - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_close_to_geo_haversine() {
        use geo::Distance;
        // geo uses a slightly larger mean radius, so compare relatively.
        let a = Point::from_lat_lon(48.0, 11.0);
        let b = Point::from_lat_lon(50.93, 6.96);
        let ours = distance_km(&a, &b);
        let theirs = geo::Haversine.distance(*a.inner(), *b.inner()) / 1000.0;
        assert!((ours - theirs).abs() / theirs < 1e-4);
    }

    #[test]
    fn test_nearest_picks_closest_and_first_on_tie() {
        let records = vec![
            record("50667", 50.93, 6.96),
            record("08001", 48.0, 11.0),
            record("08002", 48.0, 11.0),
        ];
        let (found, dist) = nearest(&Point::from_lat_lon(48.001, 11.0), &records).unwrap();
        assert_eq!(found.code.as_str(), "08001");
        assert!(dist < 0.2);
    }

    #[test]
    fn test_nearest_empty() {
        assert!(nearest(&Point::new(0.0, 0.0), &[]).is_none());
    }

    #[test]
    fn test_bounding_rect_for_points() {
        let rect = bounding_rect_for_points(&[
            Point::new(6.96, 50.93),
            Point::new(11.0, 48.0),
        ])
        .unwrap();
        assert_eq!(rect.min().x, 6.96);
        assert_eq!(rect.max().y, 50.93);
        assert!(bounding_rect_for_points(&[]).is_none());
    }
}
