//! # Zone Flow
//!
//! Store-to-store transition flows and zone heat for floor-plan maps.
//!
//! This library provides:
//! - Aggregation of raw transition records into a directed flow graph
//! - Zone name to geometry lookup, with same-floor endpoint matching
//! - Shortest paths between zones over a topology network, labeled with their volumes
//! - Log-scaled heat colors per zone
//!
//! Rendering is left to the host: every layer comes out as plain data in EPSG:3857.
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel aggregation with rayon
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use zone_flow::{FlowQueryFacade, SeriesFrame, TopologyConfig, TopologyGraph,
//!                 ZoneFlowConfig, ZoneGeometryIndex};
//! use serde_json::json;
//!
//! let zones = ZoneGeometryIndex::from_geojson_str(r#"{
//!     "type": "FeatureCollection",
//!     "features": [
//!         { "type": "Feature", "properties": { "name": "Bakery", "level": 0 },
//!           "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } },
//!         { "type": "Feature", "properties": { "name": "Florist", "level": 0 },
//!           "geometry": { "type": "Point", "coordinates": [0.002, 0.0] } }
//!     ]
//! }"#).unwrap();
//!
//! let corridor = TopologyGraph::from_geojson_str(r#"{
//!     "type": "FeatureCollection",
//!     "features": [
//!         { "type": "Feature", "properties": {},
//!           "geometry": { "type": "LineString",
//!                         "coordinates": [[0.0, 0.0], [0.001, 0.0], [0.002, 0.0]] } }
//!     ]
//! }"#, &TopologyConfig::default()).unwrap();
//!
//! let mut facade = FlowQueryFacade::new(ZoneFlowConfig::default());
//! facade.update_geometry(Some(zones), Some(corridor));
//! facade.update_frames(&[SeriesFrame::new(
//!     "docs",
//!     vec![json!({ "Source": "Bakery", "Florist": 12 })],
//! )]);
//!
//! let paths = facade.select_and_resolve("Bakery");
//! assert_eq!(paths.len(), 1);
//! assert_eq!(paths[0].label, "From: 12");
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod frames;
pub mod geo_utils;
pub mod geojson;
pub mod heat;
pub mod matcher;
pub mod path;
pub mod query;
pub mod topology;
pub mod zones;

/// Zone identifier: the zone name as it appears in the data and in the `name`
/// property of its features.
pub type ZoneId = String;

pub use config::{HeatConfig, PanelOptions, TopologyConfig, ZoneFlowConfig};
pub use error::{FlowIssue, ZoneFlowError};
#[cfg(feature = "parallel")]
pub use flow::aggregate_transitions_parallel;
pub use flow::{aggregate_transitions, FlowGraph, FlowMap, TransitionRow, RESERVED_FIELDS};
pub use frames::{parse_frames, split_frames, FrameData, SeriesFrame, ZoneVolume};
pub use heat::{build_heat_layer, compute_heat_values, HeatLayer, HeatPolygon, HeatValue};
pub use matcher::find_optimal_match;
pub use path::{LabeledPath, PathBuilder};
pub use query::{
    resolve_paths, FlowQueryFacade, PathResolution, PendingResolution, ResolvedSelection,
    SelectionState, SelectionToken,
};
pub use topology::{Pathfinder, ShortestPathfinder, TopologyGraph};
pub use zones::{Level, ZoneGeometry, ZoneGeometryIndex};
