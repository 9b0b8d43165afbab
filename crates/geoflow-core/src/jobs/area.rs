//! `polygonArea`: geodesic area of the workflow's GeoJSON geometry.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{JobOutcome, TaskRecord};

use super::geojson::{GeoJsonError, Geometry, Position};
use super::job::Job;

/// WGS84 equatorial radius in meters.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

pub const AREA_UNIT: &str = "square meters";

#[derive(Debug, Serialize)]
struct AreaOutput {
    area: f64,
    unit: &'static str,
}

pub struct PolygonAreaJob;

impl PolygonAreaJob {
    pub const TASK_TYPE: &'static str = "polygonArea";

    fn compute(payload: &serde_json::Value) -> Result<serde_json::Value, GeoJsonError> {
        let geometry = Geometry::from_value(payload)?;
        let output = AreaOutput {
            area: geodesic_area(&geometry),
            unit: AREA_UNIT,
        };
        Ok(serde_json::json!(output))
    }
}

#[async_trait]
impl Job for PolygonAreaJob {
    async fn execute(&self, task: &TaskRecord) -> JobOutcome {
        let result = Self::compute(&task.payload);
        if let Err(e) = &result {
            tracing::warn!(task_id = %task.task_id, error = %e, "invalid geometry");
        }
        JobOutcome::from_result(result)
    }
}

/// Area in square meters on a sphere. Non-areal geometries have area 0.
pub fn geodesic_area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon(rings) => polygon_area(rings),
        Geometry::MultiPolygon(polygons) => polygons.iter().map(|p| polygon_area(p)).sum(),
        _ => 0.0,
    }
}

/// Outer ring minus holes.
fn polygon_area(rings: &[Vec<Position>]) -> f64 {
    let Some((outer, holes)) = rings.split_first() else {
        return 0.0;
    };
    holes
        .iter()
        .fold(ring_area(outer).abs(), |total, hole| total - ring_area(hole).abs())
}

/// Signed area of a closed ring (spherical excess approximation, see
/// Chamberlain & Duquette, "Some Algorithms for Polygons on a Sphere").
fn ring_area(ring: &[Position]) -> f64 {
    // closing position is a duplicate of the first
    let n = ring.len().saturating_sub(1);
    if n <= 2 {
        return 0.0;
    }
    let mut total = 0.0;
    for i in 0..n {
        let lower = ring[i];
        let middle = ring[(i + 1) % n];
        let upper = ring[(i + 2) % n];
        total += (upper[0].to_radians() - lower[0].to_radians()) * middle[1].to_radians().sin();
    }
    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}
