//! Minimal GeoJSON reading into `geo` types.
//!
//! Only what zone shapes and topology networks use: feature collections whose
//! features carry a property object and a Point, LineString, MultiLineString, Polygon or
//! MultiPolygon geometry. Extra ordinates (altitude) are dropped.

use geo::{Coord, Geometry, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ZoneFlowError;

/// A parsed feature. `geometry` is `None` for features with a null geometry or one that
/// could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFeature {
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry<f64>>,
}

#[derive(Debug, Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Position = Vec<f64>;

/// Parse a GeoJSON `FeatureCollection` document.
///
/// Only a document that is not a feature collection is an error. A feature whose geometry
/// cannot be read keeps its properties and gets `geometry: None`.
pub fn parse_feature_collection(json: &str) -> Result<Vec<GeoFeature>, ZoneFlowError> {
    let raw: RawCollection = serde_json::from_str(json)?;
    Ok(raw.features.into_iter().map(convert_feature).collect())
}

/// Read a feature collection that is already a JSON value (e.g. embedded in panel options).
pub fn feature_collection_from_value(value: Value) -> Result<Vec<GeoFeature>, ZoneFlowError> {
    let raw: RawCollection = serde_json::from_value(value)?;
    Ok(raw.features.into_iter().map(convert_feature).collect())
}

fn convert_feature(raw: RawFeature) -> GeoFeature {
    let properties = raw.properties.unwrap_or_default();
    let geometry = raw.geometry.and_then(|g| match convert_geometry(g) {
        Ok(geometry) => Some(geometry),
        Err(e) => {
            let name = properties.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
            warn!("[GeoJson] Dropping geometry of feature '{}': {}", name, e);
            None
        }
    });
    GeoFeature { properties, geometry }
}

fn convert_geometry(raw: RawGeometry) -> Result<Geometry<f64>, ZoneFlowError> {
    let geometry = match raw.kind.as_str() {
        "Point" => {
            let pos: Position = serde_json::from_value(raw.coordinates)?;
            Geometry::Point(Point::from(coord(&pos, "Point")?))
        }
        "LineString" => {
            let line: Vec<Position> = serde_json::from_value(raw.coordinates)?;
            Geometry::LineString(line_string(&line, "LineString")?)
        }
        "MultiLineString" => {
            let lines: Vec<Vec<Position>> = serde_json::from_value(raw.coordinates)?;
            let lines = lines
                .iter()
                .map(|l| line_string(l, "MultiLineString"))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiLineString(MultiLineString::new(lines))
        }
        "Polygon" => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(raw.coordinates)?;
            Geometry::Polygon(polygon(&rings, "Polygon")?)
        }
        "MultiPolygon" => {
            let polys: Vec<Vec<Vec<Position>>> = serde_json::from_value(raw.coordinates)?;
            let polys = polys
                .iter()
                .map(|rings| polygon(rings, "MultiPolygon"))
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiPolygon(MultiPolygon::new(polys))
        }
        other => return Err(ZoneFlowError::UnsupportedGeometry(other.to_string())),
    };
    Ok(geometry)
}

fn coord(pos: &[f64], context: &str) -> Result<Coord<f64>, ZoneFlowError> {
    match pos {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        _ => Err(ZoneFlowError::MalformedCoordinates { context: context.to_string() }),
    }
}

fn line_string(positions: &[Position], context: &str) -> Result<LineString<f64>, ZoneFlowError> {
    let coords = positions
        .iter()
        .map(|p| coord(p, context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn polygon(rings: &[Vec<Position>], context: &str) -> Result<Polygon<f64>, ZoneFlowError> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Err(ZoneFlowError::MalformedCoordinates { context: context.to_string() });
    };
    if exterior.len() < 3 {
        return Err(ZoneFlowError::MalformedCoordinates { context: context.to_string() });
    }

    let interiors = interiors
        .iter()
        .map(|r| line_string(r, context))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(line_string(exterior, context)?, interiors))
}
