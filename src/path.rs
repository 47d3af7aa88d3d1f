//! Labeled paths for the transition layer.

use geo::{Coord, LineString};
use log::debug;
use serde::Serialize;

use crate::error::FlowIssue;
use crate::geo_utils::{polyline_length, to_web_mercator};
use crate::topology::{Pathfinder, TopologyGraph};
use crate::zones::ZoneGeometry;
use crate::ZoneId;

/// A routed path between two zones, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledPath {
    /// Zone the path starts at (the selected zone)
    pub from: ZoneId,
    /// Zone the path ends at
    pub to: ZoneId,
    /// Volume summary, e.g. `From: 120 - To: 45`
    pub label: String,
    /// Route in EPSG:3857
    pub geometry: LineString<f64>,
    /// Walking length of the route in meters
    pub length_meters: f64,
}

/// Routes zone pairs over a topology network and labels the result.
pub struct PathBuilder<'a, P: Pathfinder + ?Sized> {
    graph: &'a TopologyGraph,
    pathfinder: &'a P,
}

impl<'a, P: Pathfinder + ?Sized> PathBuilder<'a, P> {
    pub fn new(graph: &'a TopologyGraph, pathfinder: &'a P) -> Self {
        Self { graph, pathfinder }
    }

    /// Route `start` to `end` and attach `label`.
    ///
    /// Fails with [`FlowIssue::NoPathFound`] when the pathfinder has no route, or returns
    /// fewer than two coordinates.
    pub fn build(
        &self,
        start: &ZoneGeometry,
        end: &ZoneGeometry,
        label: impl Into<String>,
    ) -> Result<LabeledPath, FlowIssue> {
        let no_path = || FlowIssue::NoPathFound {
            from: start.name.clone(),
            to: end.name.clone(),
        };

        let route = self
            .pathfinder
            .find_path(self.graph, start, end)
            .filter(|route| route.len() >= 2)
            .ok_or_else(no_path)?;

        let length_meters = polyline_length(&route);
        let projected: Vec<Coord<f64>> = route.into_iter().map(to_web_mercator).collect();
        debug!(
            "[PathBuilder] '{}' -> '{}': {} points, {:.1}m",
            start.name,
            end.name,
            projected.len(),
            length_meters
        );

        Ok(LabeledPath {
            from: start.name.clone(),
            to: end.name.clone(),
            label: label.into(),
            geometry: LineString::new(projected),
            length_meters,
        })
    }
}
