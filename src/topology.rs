//! Topology network and the pathfinding capability.
//!
//! The network is read from GeoJSON line strings (corridors, walkways, escalators).
//! Vertices that land on the same grid key are merged into one node, consecutive
//! vertices become undirected edges weighted by their length. Zones attach to the network
//! at the node nearest to their anchor.
//!
//! The search itself is delegated to the `pathfinding` crate; [`Pathfinder`] keeps it
//! swappable.

use std::collections::HashMap;

use geo::{Coord, Geometry, LineString};
use log::{debug, info};
use pathfinding::prelude::astar;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::config::TopologyConfig;
use crate::error::ZoneFlowError;
use crate::geo_utils::{haversine_distance, quantize};
use crate::geojson::{feature_collection_from_value, parse_feature_collection, GeoFeature};
use crate::zones::ZoneGeometry;

type NodeIndex = u32;

/// Edge cost in whole centimeters.
type Cost = u64;

type IndexedNode = GeomWithData<[f64; 2], NodeIndex>;

/// Traversable network connecting zones.
#[derive(Debug, Clone)]
pub struct TopologyGraph {
    nodes: Vec<Coord<f64>>,
    adjacency: Vec<Vec<(NodeIndex, Cost)>>,
    tree: RTree<IndexedNode>,
    /// Longitude is scaled by cos(latitude) before indexing so R-tree distances are
    /// roughly isotropic.
    lon_scale: f64,
}

impl Default for TopologyGraph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            adjacency: Vec::new(),
            tree: RTree::new(),
            lon_scale: 1.0,
        }
    }
}

impl TopologyGraph {
    /// Build a network from line strings. Each line is a chain of edges.
    pub fn from_lines<'a>(
        lines: impl IntoIterator<Item = &'a LineString<f64>>,
        config: &TopologyConfig,
    ) -> Self {
        let start = std::time::Instant::now();
        let mut keys: HashMap<(i64, i64), NodeIndex> = HashMap::new();
        let mut nodes: Vec<Coord<f64>> = Vec::new();
        let mut adjacency: Vec<Vec<(NodeIndex, Cost)>> = Vec::new();

        let mut node_for = |c: Coord<f64>,
                            nodes: &mut Vec<Coord<f64>>,
                            adjacency: &mut Vec<Vec<(NodeIndex, Cost)>>|
         -> NodeIndex {
            *keys.entry(quantize(c, config.coordinate_precision)).or_insert_with(|| {
                nodes.push(c);
                adjacency.push(Vec::new());
                (nodes.len() - 1) as NodeIndex
            })
        };

        for line in lines {
            let mut prev: Option<NodeIndex> = None;
            for c in line.coords() {
                let current = node_for(*c, &mut nodes, &mut adjacency);
                if let Some(p) = prev.filter(|p| *p != current) {
                    let meters = haversine_distance(nodes[p as usize], nodes[current as usize]);
                    let cost = ((meters * 100.0).ceil() as Cost).max(1);
                    adjacency[p as usize].push((current, cost));
                    adjacency[current as usize].push((p, cost));
                }
                prev = Some(current);
            }
        }

        let lon_scale = if nodes.is_empty() {
            1.0
        } else {
            let mean_lat = nodes.iter().map(|c| c.y).sum::<f64>() / nodes.len() as f64;
            mean_lat.to_radians().cos().max(0.01)
        };

        let tree = RTree::bulk_load(
            nodes
                .iter()
                .enumerate()
                .map(|(i, c)| GeomWithData::new([c.x * lon_scale, c.y], i as NodeIndex))
                .collect(),
        );

        let graph = Self { nodes, adjacency, tree, lon_scale };
        info!(
            "[Topology] Built network: {} nodes, {} edges in {:?}",
            graph.node_count(),
            graph.edge_count(),
            start.elapsed()
        );
        graph
    }

    /// Build a network from features; only line geometries are used.
    pub fn from_features(features: &[GeoFeature], config: &TopologyConfig) -> Self {
        let mut lines: Vec<&LineString<f64>> = Vec::new();
        let mut ignored = 0usize;

        for geometry in features.iter().filter_map(|f| f.geometry.as_ref()) {
            match geometry {
                Geometry::LineString(line) => lines.push(line),
                Geometry::MultiLineString(multi) => lines.extend(multi.0.iter()),
                _ => ignored += 1,
            }
        }
        if ignored > 0 {
            debug!("[Topology] Ignored {} non-line features", ignored);
        }

        Self::from_lines(lines, config)
    }

    /// Parse a GeoJSON feature collection of line strings.
    pub fn from_geojson_str(json: &str, config: &TopologyConfig) -> Result<Self, ZoneFlowError> {
        Ok(Self::from_features(&parse_feature_collection(json)?, config))
    }

    /// Same as [`TopologyGraph::from_geojson_str`] for a collection already held as JSON.
    pub fn from_geojson_value(
        value: serde_json::Value,
        config: &TopologyConfig,
    ) -> Result<Self, ZoneFlowError> {
        Ok(Self::from_features(&feature_collection_from_value(value)?, config))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Coordinate of a node, as merged from the input lines.
    pub fn node(&self, index: NodeIndex) -> Option<Coord<f64>> {
        self.nodes.get(index as usize).copied()
    }

    /// Nearest node to a coordinate and its distance in meters.
    pub fn nearest_node(&self, coord: Coord<f64>) -> Option<(NodeIndex, f64)> {
        let hit = self.tree.nearest_neighbor(&[coord.x * self.lon_scale, coord.y])?;
        let index = hit.data;
        Some((index, haversine_distance(coord, self.nodes[index as usize])))
    }

    fn neighbors(&self, index: NodeIndex) -> impl Iterator<Item = (NodeIndex, Cost)> + '_ {
        self.adjacency[index as usize].iter().copied()
    }
}

/// Route search between two zone geometries.
pub trait Pathfinder {
    /// Ordered coordinates (EPSG:4326) from `start` to `end`, or `None` if the network
    /// does not connect them.
    fn find_path(
        &self,
        graph: &TopologyGraph,
        start: &ZoneGeometry,
        end: &ZoneGeometry,
    ) -> Option<Vec<Coord<f64>>>;
}

/// Default [`Pathfinder`]: snaps both anchors to the network and runs A*.
#[derive(Debug, Clone)]
pub struct ShortestPathfinder {
    pub max_snap_distance_meters: f64,
}

impl Default for ShortestPathfinder {
    fn default() -> Self {
        Self::from_config(&TopologyConfig::default())
    }
}

impl ShortestPathfinder {
    pub fn from_config(config: &TopologyConfig) -> Self {
        Self {
            max_snap_distance_meters: config.max_snap_distance_meters,
        }
    }

    fn snap(&self, graph: &TopologyGraph, zone: &ZoneGeometry) -> Option<(Coord<f64>, NodeIndex)> {
        let anchor = zone.anchor()?;
        let (node, distance) = graph.nearest_node(anchor)?;
        if distance > self.max_snap_distance_meters {
            debug!(
                "[Topology] '{}' is {:.1}m from the network (limit {:.1}m)",
                zone.name, distance, self.max_snap_distance_meters
            );
            return None;
        }
        Some((anchor, node))
    }
}

impl Pathfinder for ShortestPathfinder {
    fn find_path(
        &self,
        graph: &TopologyGraph,
        start: &ZoneGeometry,
        end: &ZoneGeometry,
    ) -> Option<Vec<Coord<f64>>> {
        let (start_anchor, start_node) = self.snap(graph, start)?;
        let (end_anchor, end_node) = self.snap(graph, end)?;
        let goal = graph.nodes[end_node as usize];

        let (indices, cost) = astar(
            &start_node,
            |&n| graph.neighbors(n),
            |&n| (haversine_distance(graph.nodes[n as usize], goal) * 100.0).floor() as Cost,
            |&n| n == end_node,
        )?;
        debug!(
            "[Topology] '{}' -> '{}': {} nodes, {:.1}m",
            start.name,
            end.name,
            indices.len(),
            cost as f64 / 100.0
        );

        let mut route = Vec::with_capacity(indices.len() + 2);
        route.push(start_anchor);
        for index in indices {
            let c = graph.nodes[index as usize];
            if route.last() != Some(&c) {
                route.push(c);
            }
        }
        if route.last() != Some(&end_anchor) {
            route.push(end_anchor);
        }
        Some(route)
    }
}
