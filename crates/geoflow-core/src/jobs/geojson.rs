//! GeoJSON geometry validation (RFC 7946, section 3.1).
//!
//! Supported types: Point, LineString, Polygon, MultiPoint, MultiLineString,
//! MultiPolygon. Positions are exactly two numbers `[x, y]`. Polygon rings
//! have at least four positions and are closed (first == last).

use serde_json::Value;
use thiserror::Error;

pub type Position = [f64; 2];

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoJsonError {
    #[error("GeoJSON is null or undefined")]
    Missing,

    #[error("GeoJSON is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Unsupported GeoJSON type: {0}")]
    UnsupportedType(String),

    #[error("{0} geometry must have a \"coordinates\" array")]
    MissingCoordinates(String),

    #[error("Point coordinates must be an array of two numbers [x, y]")]
    InvalidPoint,

    #[error("LineString coordinates must be an array of at least two positions [x, y]")]
    InvalidLineString,

    #[error(
        "Polygon coordinates must be an array of linear rings, where each ring is an array of at least four positions [x, y] and the first and last positions must be identical"
    )]
    InvalidPolygon,
}

impl Geometry {
    /// Parse and validate a geometry.
    ///
    /// Accepts either a GeoJSON object or a string holding one.
    pub fn from_value(value: &Value) -> Result<Self, GeoJsonError> {
        match value {
            Value::Null => Err(GeoJsonError::Missing),
            Value::String(text) => {
                let parsed: Value = serde_json::from_str(text)
                    .map_err(|e| GeoJsonError::InvalidJson(e.to_string()))?;
                match parsed {
                    Value::String(_) => Err(GeoJsonError::InvalidJson(
                        "expected an object, found a string".to_string(),
                    )),
                    other => Self::from_value(&other),
                }
            }
            Value::Object(map) => {
                let kind = match map.get("type") {
                    Some(Value::String(kind)) => kind.as_str(),
                    Some(other) => return Err(GeoJsonError::UnsupportedType(other.to_string())),
                    None => return Err(GeoJsonError::UnsupportedType("<missing>".to_string())),
                };
                if !SUPPORTED_TYPES.contains(&kind) {
                    return Err(GeoJsonError::UnsupportedType(kind.to_string()));
                }
                let Some(Value::Array(coords)) = map.get("coordinates") else {
                    return Err(GeoJsonError::MissingCoordinates(kind.to_string()));
                };
                parse_coordinates(kind, coords)
            }
            _ => Err(GeoJsonError::UnsupportedType(value.to_string())),
        }
    }
}

const SUPPORTED_TYPES: [&str; 6] = [
    "Point",
    "LineString",
    "Polygon",
    "MultiPoint",
    "MultiLineString",
    "MultiPolygon",
];

fn parse_coordinates(kind: &str, coords: &[Value]) -> Result<Geometry, GeoJsonError> {
    let geometry = match kind {
        "Point" => Geometry::Point(position_of(coords).ok_or(GeoJsonError::InvalidPoint)?),
        "LineString" => Geometry::LineString(line_string(coords)?),
        "Polygon" => Geometry::Polygon(polygon(coords)?),
        "MultiPoint" => Geometry::MultiPoint(
            coords
                .iter()
                .map(|p| position(p).ok_or(GeoJsonError::InvalidPoint))
                .collect::<Result<_, _>>()?,
        ),
        "MultiLineString" => Geometry::MultiLineString(
            coords
                .iter()
                .map(|line| as_array(line).ok_or(GeoJsonError::InvalidLineString).and_then(line_string))
                .collect::<Result<_, _>>()?,
        ),
        "MultiPolygon" => Geometry::MultiPolygon(
            coords
                .iter()
                .map(|poly| as_array(poly).ok_or(GeoJsonError::InvalidPolygon).and_then(polygon))
                .collect::<Result<_, _>>()?,
        ),
        other => return Err(GeoJsonError::UnsupportedType(other.to_string())),
    };
    Ok(geometry)
}

fn as_array(value: &Value) -> Option<&[Value]> {
    value.as_array().map(Vec::as_slice)
}

fn position(value: &Value) -> Option<Position> {
    position_of(as_array(value)?)
}

fn position_of(coords: &[Value]) -> Option<Position> {
    match coords {
        [x, y] => Some([x.as_f64()?, y.as_f64()?]),
        _ => None,
    }
}

fn line_string(coords: &[Value]) -> Result<Vec<Position>, GeoJsonError> {
    if coords.len() < 2 {
        return Err(GeoJsonError::InvalidLineString);
    }
    coords
        .iter()
        .map(|p| position(p).ok_or(GeoJsonError::InvalidLineString))
        .collect()
}

fn polygon(rings: &[Value]) -> Result<Vec<Vec<Position>>, GeoJsonError> {
    if rings.is_empty() {
        return Err(GeoJsonError::InvalidPolygon);
    }
    rings.iter().map(linear_ring).collect()
}

fn linear_ring(ring: &Value) -> Result<Vec<Position>, GeoJsonError> {
    let points = as_array(ring).ok_or(GeoJsonError::InvalidPolygon)?;
    if points.len() < 4 {
        return Err(GeoJsonError::InvalidPolygon);
    }
    let ring: Vec<Position> = points
        .iter()
        .map(|p| position(p).ok_or(GeoJsonError::InvalidPolygon))
        .collect::<Result<_, _>>()?;
    if ring.first() != ring.last() {
        return Err(GeoJsonError::InvalidPolygon);
    }
    Ok(ring)
}
