//! Panel options and tuning knobs.

use geo::Coord;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo_utils::to_web_mercator;

/// Options the host panel supplies. Only the view center is used by this crate; the rest
/// is carried for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    /// Extra XYZ tile source drawn above the base map. An empty string means none.
    #[serde(deserialize_with = "empty_as_none")]
    pub tile_url: Option<String>,
    /// Initial zoom level. Default: 18.0
    pub zoom_level: f64,
    /// Initial view center longitude (degrees)
    pub center_lon: f64,
    /// Initial view center latitude (degrees)
    pub center_lat: f64,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            tile_url: None,
            zoom_level: 18.0,
            center_lon: 0.0,
            center_lat: 0.0,
        }
    }
}

impl PanelOptions {
    /// View center in the display projection (EPSG:3857).
    pub fn view_center(&self) -> Coord<f64> {
        to_web_mercator(Coord { x: self.center_lon, y: self.center_lat })
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Configuration for heat colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatConfig {
    /// Hue given to every zone when all rendered zones share one log volume.
    /// Default: 60.0 (midway between red and green)
    pub neutral_hue: f64,
    /// HSL saturation in percent. Default: 100.0
    pub saturation: f64,
    /// HSL lightness in percent. Default: 50.0
    pub lightness: f64,
    /// Fill opacity. Default: 0.3
    pub alpha: f64,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            neutral_hue: 60.0,
            saturation: 100.0,
            lightness: 50.0,
            alpha: 0.3,
        }
    }
}

/// Configuration for building and searching the topology network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Grid size in degrees used to merge network vertices that should coincide.
    /// Default: 1e-7 (~1 cm)
    pub coordinate_precision: f64,

    /// Farthest a zone anchor may be from its nearest network node to still attach.
    /// Default: 100.0 meters
    pub max_snap_distance_meters: f64,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            coordinate_precision: 1e-7,
            max_snap_distance_meters: 100.0,
        }
    }
}

/// Everything the query facade needs besides data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneFlowConfig {
    pub panel: PanelOptions,
    pub heat: HeatConfig,
    pub topology: TopologyConfig,
}
