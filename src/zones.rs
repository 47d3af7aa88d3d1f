//! Zone geometry and the name index.
//!
//! A zone (a store, a kiosk, a service area) can own several features with the same
//! `name` property, typically one per floor. The floor is told apart by the `level`
//! property, which the matcher uses to pick same-floor endpoints.

use std::collections::HashMap;

use geo::{Centroid, Coord, Geometry};
use log::{debug, info};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ZoneFlowError;
use crate::geojson::{feature_collection_from_value, parse_feature_collection, GeoFeature};
use crate::ZoneId;

/// Property holding the zone name.
pub const NAME_PROPERTY: &str = "name";

/// Property holding the floor/level key.
pub const LEVEL_PROPERTY: &str = "level";

/// Comparable level key.
///
/// Numbers and numeric strings share one canonical form, so `1`, `1.0` and `"1"` are the
/// same level. Other strings compare as written (trimmed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Level(String);

impl Level {
    pub fn new(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Self(canonical_number(n)),
            _ => Self(trimmed.to_string()),
        }
    }

    /// Read a level from a property value. `null` and structured values have no level.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(|n| Self(canonical_number(n))),
            Value::String(s) => Some(Self::new(s)),
            Value::Bool(b) => Some(Self(b.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for Level {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_number(n: f64) -> String {
    if n == 0.0 {
        // -0 and 0 are the same floor
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// A named feature in EPSG:4326.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneGeometry {
    pub name: ZoneId,
    pub level: Option<Level>,
    pub geometry: Geometry<f64>,
    #[serde(skip)]
    pub properties: Map<String, Value>,
}

impl ZoneGeometry {
    pub fn new(name: impl Into<ZoneId>, level: Option<Level>, geometry: Geometry<f64>) -> Self {
        Self {
            name: name.into(),
            level,
            geometry,
            properties: Map::new(),
        }
    }

    /// Build from a parsed feature; `None` when it has no name or no geometry.
    pub fn from_feature(feature: GeoFeature) -> Option<Self> {
        let name = feature
            .properties
            .get(NAME_PROPERTY)
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())?
            .to_string();
        let geometry = feature.geometry?;
        let level = feature.properties.get(LEVEL_PROPERTY).and_then(Level::from_value);

        Some(Self {
            name,
            level,
            geometry,
            properties: feature.properties,
        })
    }

    /// Point where the zone attaches to the topology network (its centroid).
    pub fn anchor(&self) -> Option<Coord<f64>> {
        self.geometry.centroid().map(|p| p.0)
    }
}

/// Zone name -> candidate features, each list in collection order.
#[derive(Debug, Clone, Default)]
pub struct ZoneGeometryIndex {
    by_name: HashMap<ZoneId, Vec<ZoneGeometry>>,
    names: Vec<ZoneId>,
}

impl ZoneGeometryIndex {
    /// Index features by name. Unnamed features and features without geometry are left out.
    pub fn from_features(features: impl IntoIterator<Item = GeoFeature>) -> Self {
        let mut index = Self::default();
        let mut skipped = 0usize;

        for feature in features {
            match ZoneGeometry::from_feature(feature) {
                Some(zone) => index.push(zone),
                None => skipped += 1,
            }
        }

        info!(
            "[ZoneIndex] Indexed {} features under {} names ({} skipped)",
            index.feature_count(),
            index.len(),
            skipped
        );
        index
    }

    /// Index already-built zone geometries.
    pub fn from_zones(zones: impl IntoIterator<Item = ZoneGeometry>) -> Self {
        let mut index = Self::default();
        for zone in zones {
            index.push(zone);
        }
        index
    }

    /// Parse and index a GeoJSON feature collection.
    pub fn from_geojson_str(json: &str) -> Result<Self, ZoneFlowError> {
        Ok(Self::from_features(parse_feature_collection(json)?))
    }

    /// Index a feature collection that arrives as a JSON value, such as one embedded in
    /// panel options.
    pub fn from_geojson_value(value: Value) -> Result<Self, ZoneFlowError> {
        Ok(Self::from_features(feature_collection_from_value(value)?))
    }

    fn push(&mut self, zone: ZoneGeometry) {
        if !self.by_name.contains_key(&zone.name) {
            self.names.push(zone.name.clone());
        } else {
            debug!("[ZoneIndex] Another feature for '{}' (level {:?})", zone.name, zone.level);
        }
        self.by_name.entry(zone.name.clone()).or_default().push(zone);
    }

    /// Candidates for a zone name; empty for unknown names.
    pub fn candidates(&self, name: &str) -> &[ZoneGeometry] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Zone names in order of first appearance.
    pub fn zone_names(&self) -> &[ZoneId] {
        &self.names
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of indexed features.
    pub fn feature_count(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }
}
