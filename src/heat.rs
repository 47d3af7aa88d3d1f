//! Heat layer: zone volumes to colors.
//!
//! Volumes span orders of magnitude (a food court vs. a key cutter), so intensity is
//! taken on a log2 scale and normalized against the zones currently rendered:
//! - `normalized = (log2(v) - min) / (max - min)`
//! - `hue = normalized * -120 + 120`, i.e. 120 (green) for the quietest zone and
//!   0 (red) for the busiest
//!
//! Zones without a usable volume are left unpainted, and a dataset where every zone has
//! the same log volume gets one neutral hue instead of a division by zero.

use std::collections::HashMap;

use geo::Geometry;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::HeatConfig;
use crate::error::FlowIssue;
use crate::frames::ZoneVolume;
use crate::geo_utils::project_geometry;
use crate::zones::{Level, ZoneGeometryIndex};
use crate::ZoneId;

/// Heat of a single zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatValue {
    pub zone: ZoneId,
    pub raw_volume: f64,
    /// log2 of the raw volume
    pub log_volume: f64,
    /// Position between the quietest (0.0) and busiest (1.0) rendered zone
    pub normalized: f64,
    /// HSL hue in [0, 120]
    pub hue: f64,
}

impl HeatValue {
    /// CSS color for this zone.
    pub fn color(&self, config: &HeatConfig) -> String {
        hsla(self.hue, config)
    }
}

/// One painted feature of the heat layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPolygon {
    pub zone: ZoneId,
    pub level: Option<Level>,
    /// Feature geometry in EPSG:3857
    pub geometry: Geometry<f64>,
    /// CSS fill color
    pub color: String,
    /// Raw volume as display text
    pub value: String,
}

/// Complete heat layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatLayer {
    /// One entry per geometry feature of each painted zone
    pub polygons: Vec<HeatPolygon>,
    /// One entry per painted zone
    pub values: Vec<HeatValue>,
    /// Zones left out or scale problems
    pub issues: Vec<FlowIssue>,
    /// log2 range used for normalization; `None` when nothing was painted
    pub min_log_volume: Option<f64>,
    pub max_log_volume: Option<f64>,
}

/// Hue for a normalized intensity: 0.0 -> 120 (green), 1.0 -> 0 (red).
#[inline]
pub fn hue_for(normalized: f64) -> f64 {
    normalized * -120.0 + 120.0
}

/// Format a hue as an `hsla(...)` CSS color.
pub fn hsla(hue: f64, config: &HeatConfig) -> String {
    format!(
        "hsla({}, {}%, {}%, {})",
        hue, config.saturation, config.lightness, config.alpha
    )
}

/// Normalize the given zone volumes against each other.
///
/// Every zone passed in takes part in the min/max; filter to the rendered zones first.
/// Zones with a non-positive or non-finite volume are skipped with
/// [`FlowIssue::InvalidVolume`].
///
/// # Example
///
/// ```rust
/// use zone_flow::{compute_heat_values, HeatConfig, ZoneVolume};
///
/// let volumes = vec![
///     ZoneVolume::new("A", 1.0),
///     ZoneVolume::new("B", 4.0),
///     ZoneVolume::new("C", 16.0),
/// ];
/// let (values, issues) = compute_heat_values(&volumes, &HeatConfig::default());
///
/// let hues: Vec<f64> = values.iter().map(|v| v.hue).collect();
/// assert_eq!(hues, vec![120.0, 60.0, 0.0]);
/// assert!(issues.is_empty());
/// ```
pub fn compute_heat_values(
    volumes: &[ZoneVolume],
    config: &HeatConfig,
) -> (Vec<HeatValue>, Vec<FlowIssue>) {
    let mut issues = Vec::new();
    let mut logs: Vec<(&ZoneVolume, f64)> = Vec::with_capacity(volumes.len());

    for volume in volumes {
        if volume.raw_volume.is_finite() && volume.raw_volume > 0.0 {
            logs.push((volume, volume.raw_volume.log2()));
        } else {
            warn!(
                "[Heat] Skipping '{}': volume {} has no logarithm",
                volume.zone, volume.raw_volume
            );
            issues.push(FlowIssue::InvalidVolume {
                zone: volume.zone.clone(),
                volume: volume.raw_volume,
            });
        }
    }

    if logs.is_empty() {
        return (Vec::new(), issues);
    }

    let min = logs.iter().map(|(_, l)| *l).fold(f64::INFINITY, f64::min);
    let max = logs.iter().map(|(_, l)| *l).fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let degenerate = range <= 0.0;

    if degenerate {
        debug!(
            "[Heat] All {} zones at log2 volume {}, using neutral hue {}",
            logs.len(),
            min,
            config.neutral_hue
        );
        issues.push(FlowIssue::DegenerateHeatRange(min));
    }

    let values = logs
        .into_iter()
        .map(|(volume, log_volume)| {
            let (normalized, hue) = if degenerate {
                (0.5, config.neutral_hue)
            } else {
                let normalized = (log_volume - min) / range;
                (normalized, hue_for(normalized))
            };
            HeatValue {
                zone: volume.zone.clone(),
                raw_volume: volume.raw_volume,
                log_volume,
                normalized,
                hue,
            }
        })
        .collect();

    (values, issues)
}

/// Build the heat layer for zones that have geometry.
///
/// Volumes for zones missing from `index` are ignored and do not influence the scale.
/// If a zone appears more than once, the later volume replaces the earlier one.
pub fn build_heat_layer(
    volumes: &[ZoneVolume],
    index: &ZoneGeometryIndex,
    config: &HeatConfig,
) -> HeatLayer {
    let start = std::time::Instant::now();

    let mut rendered: Vec<ZoneVolume> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for volume in volumes.iter().filter(|v| index.contains(&v.zone)) {
        match positions.get(volume.zone.as_str()) {
            Some(&pos) => {
                debug!("[Heat] Replacing earlier volume for '{}'", volume.zone);
                rendered[pos] = volume.clone();
            }
            None => {
                positions.insert(&volume.zone, rendered.len());
                rendered.push(volume.clone());
            }
        }
    }

    let (values, issues) = compute_heat_values(&rendered, config);

    let polygons: Vec<HeatPolygon> = values
        .iter()
        .flat_map(|value| {
            let color = value.color(config);
            index.candidates(&value.zone).iter().map(move |zone| HeatPolygon {
                zone: zone.name.clone(),
                level: zone.level.clone(),
                geometry: project_geometry(&zone.geometry),
                color: color.clone(),
                value: value.raw_volume.to_string(),
            })
        })
        .collect();

    let min_log_volume = values.iter().map(|v| v.log_volume).reduce(f64::min);
    let max_log_volume = values.iter().map(|v| v.log_volume).reduce(f64::max);

    info!(
        "[Heat] Painted {} zones ({} polygons) of {} volumes in {:?}",
        values.len(),
        polygons.len(),
        volumes.len(),
        start.elapsed()
    );

    HeatLayer {
        polygons,
        values,
        issues,
        min_log_volume,
        max_log_volume,
    }
}
