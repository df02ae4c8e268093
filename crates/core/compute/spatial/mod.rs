pub mod algorithms;
pub use algorithms::{
    EARTH_RADIUS_KM, bounding_rect_for_points, distance_km, haversine_km, nearest,
};

pub mod query;
pub use query::{QueryHit, QueryResult, QueryShape, polygon_query, radius_query};
