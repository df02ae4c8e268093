//! Distance-bucket histogram of a query result, the data behind the chart.

use crate::compute::spatial::QueryResult;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub lower_km: f64,
    pub upper_km: f64,
    pub count: usize,
}

impl Bucket {
    /// Axis label such as `"0-5 km"`.
    pub fn label(&self) -> String {
        format!("{}-{} km", self.lower_km, self.upper_km)
    }
}

/// Count hits per half-open bucket `[lower, upper)`.
///
/// `edges` must be strictly ascending (see `Config::validate`). Hits farther
/// than the last edge are not counted anywhere.
pub fn distance_histogram(result: &QueryResult, edges: &[f64]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = edges
        .windows(2)
        .map(|w| Bucket {
            lower_km: w[0],
            upper_km: w[1],
            count: 0,
        })
        .collect();

    for hit in result.hits() {
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| hit.distance_km >= b.lower_km && hit.distance_km < b.upper_km)
        {
            bucket.count += 1;
        }
    }

    buckets
}
