//! Selection-driven path resolution.
//!
//! When the user picks a zone, every zone it exchanges volume with gets one labeled
//! path. [`resolve_paths`] does the work on immutable snapshots; [`FlowQueryFacade`] owns
//! the snapshots, tracks the selection state and makes sure only the newest resolution
//! reaches the transition layer.
//!
//! ```text
//!   Idle --select--> Resolving --commit--> Rendered
//!    ^                   |  ^                  |
//!    |                   |  +-----select-------+
//!    +-----deselect------+---------------------+
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use crate::config::ZoneFlowConfig;
use crate::error::FlowIssue;
use crate::flow::{aggregate_transitions, FlowGraph};
use crate::frames::{split_frames, SeriesFrame, ZoneVolume};
use crate::heat::{build_heat_layer, HeatLayer};
use crate::matcher::find_optimal_match;
use crate::path::{LabeledPath, PathBuilder};
use crate::topology::{Pathfinder, ShortestPathfinder, TopologyGraph};
use crate::zones::{ZoneGeometry, ZoneGeometryIndex};
use crate::ZoneId;

/// Paths built for one selected zone, plus whatever was skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathResolution {
    pub zone: ZoneId,
    pub paths: Vec<LabeledPath>,
    pub issues: Vec<FlowIssue>,
}

/// Format a volume for a label (`7`, `2.5`).
fn volume_text(volume: f64) -> String {
    volume.to_string()
}

/// Neighbors of `zone` with their labels, in drawing order.
fn plan_labels(zone: &str, flow: &FlowGraph) -> Vec<(ZoneId, String)> {
    match (flow.outbound_of(zone), flow.inbound_of(zone)) {
        (Some(outbound), None) => outbound
            .iter()
            .map(|(to, v)| (to.clone(), format!("From: {}", volume_text(*v))))
            .collect(),
        (None, Some(inbound)) => inbound
            .iter()
            .map(|(from, v)| (from.clone(), format!("To: {}", volume_text(*v))))
            .collect(),
        (Some(outbound), Some(inbound)) => {
            let mut plan: Vec<(ZoneId, String)> = outbound
                .iter()
                .map(|(neighbor, out)| {
                    let label = match inbound.get(neighbor) {
                        Some(back) => {
                            format!("From: {} - To: {}", volume_text(*out), volume_text(*back))
                        }
                        None => format!("From: {}", volume_text(*out)),
                    };
                    (neighbor.clone(), label)
                })
                .collect();
            plan.extend(
                inbound
                    .iter()
                    .filter(|(neighbor, _)| !outbound.contains_key(*neighbor))
                    .map(|(from, v)| (from.clone(), format!("To: {}", volume_text(*v)))),
            );
            plan
        }
        (None, None) => Vec::new(),
    }
}

/// Build the labeled paths for a selected zone.
///
/// Zones without geometry and zone pairs without a route are skipped and reported in
/// `issues`. If the selected zone itself has no geometry nothing can be anchored and the
/// result is empty. Transitions from a zone to itself are not drawn and are reported as
/// [`FlowIssue::SelfTransition`].
pub fn resolve_paths<P: Pathfinder + ?Sized>(
    zone: &str,
    flow: &FlowGraph,
    index: &ZoneGeometryIndex,
    graph: &TopologyGraph,
    pathfinder: &P,
) -> PathResolution {
    let mut resolution = PathResolution {
        zone: zone.to_string(),
        ..PathResolution::default()
    };

    let origin = index.candidates(zone);
    if origin.is_empty() {
        warn!("[FlowQuery] Selected zone '{}' has no geometry, nothing to draw", zone);
        resolution.issues.push(FlowIssue::MissingGeometry(zone.to_string()));
        return resolution;
    }

    let mut geometry: BTreeMap<ZoneId, &[ZoneGeometry]> = BTreeMap::new();
    for related in flow.related_zones(zone) {
        let candidates = index.candidates(&related);
        if candidates.is_empty() {
            warn!("[FlowQuery] No geometry for '{}', skipping its path", related);
            resolution.issues.push(FlowIssue::MissingGeometry(related));
        } else {
            geometry.insert(related, candidates);
        }
    }

    let builder = PathBuilder::new(graph, pathfinder);
    for (neighbor, label) in plan_labels(zone, flow) {
        if neighbor == zone {
            let volume = flow.outbound_of(zone).and_then(|m| m.get(zone)).copied().unwrap_or(0.0);
            let issue = FlowIssue::SelfTransition { zone: zone.to_string(), volume };
            warn!("[FlowQuery] {}, skipping", issue);
            resolution.issues.push(issue);
            continue;
        }
        let Some(candidates) = geometry.get(&neighbor) else {
            continue;
        };
        let Some((start, end)) = find_optimal_match(origin, candidates) else {
            continue;
        };

        match builder.build(start, end, label) {
            Ok(path) => resolution.paths.push(path),
            Err(issue) => {
                warn!("[FlowQuery] {}, skipping", issue);
                resolution.issues.push(issue);
            }
        }
    }

    info!(
        "[FlowQuery] '{}': {} paths, {} skipped",
        zone,
        resolution.paths.len(),
        resolution.issues.len()
    );
    resolution
}

/// Monotonic id of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SelectionToken(u64);

/// Where the facade is in the selection cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// No zone selected
    Idle,
    /// A zone is selected and its paths are being computed
    Resolving { zone: ZoneId, token: SelectionToken },
    /// The zone's paths are in the transition layer
    Rendered { zone: ZoneId, token: SelectionToken },
}

/// Snapshot of everything a resolution needs. Owns its data, so it can be resolved on
/// another thread while the facade keeps handling events.
#[derive(Debug, Clone)]
pub struct PendingResolution {
    zone: ZoneId,
    token: SelectionToken,
    data_version: u64,
    geometry_version: u64,
    flow: Arc<FlowGraph>,
    index: Option<Arc<ZoneGeometryIndex>>,
    topology: Option<Arc<TopologyGraph>>,
}

impl PendingResolution {
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn token(&self) -> SelectionToken {
        self.token
    }

    /// Compute the paths.
    pub fn resolve<P: Pathfinder + ?Sized>(self, pathfinder: &P) -> ResolvedSelection {
        let resolution = match (&self.index, &self.topology) {
            (Some(index), Some(topology)) => {
                resolve_paths(&self.zone, &self.flow, index, topology, pathfinder)
            }
            _ => {
                info!(
                    "[FlowQuery] Zone shapes or topology not configured, no paths for '{}'",
                    self.zone
                );
                PathResolution {
                    zone: self.zone.clone(),
                    ..PathResolution::default()
                }
            }
        };

        ResolvedSelection {
            token: self.token,
            data_version: self.data_version,
            geometry_version: self.geometry_version,
            resolution,
        }
    }
}

/// Output of [`PendingResolution::resolve`], waiting to be committed.
#[derive(Debug, Clone)]
pub struct ResolvedSelection {
    token: SelectionToken,
    data_version: u64,
    geometry_version: u64,
    pub resolution: PathResolution,
}

/// Owns the derived structures and the selection state.
///
/// - `update_frames` rebuilds the flow graph and heat layer from new data
/// - `update_geometry` rebuilds the zone index, topology and heat layer
/// - `select` / `prepare` / `commit` drive one path resolution; a commit is accepted only
///   if no newer selection, data or geometry arrived since `prepare`
/// - `deselect` clears the transition layer
pub struct FlowQueryFacade<P: Pathfinder = ShortestPathfinder> {
    config: ZoneFlowConfig,
    pathfinder: Arc<P>,
    flow: Arc<FlowGraph>,
    zone_volumes: Vec<ZoneVolume>,
    index: Option<Arc<ZoneGeometryIndex>>,
    topology: Option<Arc<TopologyGraph>>,
    heat_layer: HeatLayer,
    paths: Vec<LabeledPath>,
    issues: Vec<FlowIssue>,
    state: SelectionState,
    last_token: u64,
    data_version: u64,
    geometry_version: u64,
}

impl FlowQueryFacade<ShortestPathfinder> {
    /// Facade using the A* pathfinder configured from `config.topology`.
    pub fn new(config: ZoneFlowConfig) -> Self {
        let pathfinder = ShortestPathfinder::from_config(&config.topology);
        Self::with_pathfinder(config, pathfinder)
    }
}

impl<P: Pathfinder> FlowQueryFacade<P> {
    pub fn with_pathfinder(config: ZoneFlowConfig, pathfinder: P) -> Self {
        Self {
            config,
            pathfinder: Arc::new(pathfinder),
            flow: Arc::new(FlowGraph::default()),
            zone_volumes: Vec::new(),
            index: None,
            topology: None,
            heat_layer: HeatLayer::default(),
            paths: Vec::new(),
            issues: Vec::new(),
            state: SelectionState::Idle,
            last_token: 0,
            data_version: 0,
            geometry_version: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Rebuild triggers
    // ------------------------------------------------------------------------

    /// New time-series data: rebuild the flow graph and the heat layer.
    pub fn update_frames(&mut self, frames: &[SeriesFrame]) {
        let data = split_frames(frames);
        self.flow = Arc::new(aggregate_transitions(&data.transitions));
        self.zone_volumes = data.zone_volumes;
        self.data_version += 1;
        self.rebuild_heat();
    }

    /// New zone shapes and/or topology. `None` disables the features that need them.
    pub fn update_geometry(
        &mut self,
        zones: Option<ZoneGeometryIndex>,
        topology: Option<TopologyGraph>,
    ) {
        self.index = zones.map(Arc::new);
        self.topology = topology.map(Arc::new);
        self.geometry_version += 1;
        self.rebuild_heat();
    }

    fn rebuild_heat(&mut self) {
        self.heat_layer = match &self.index {
            Some(index) => build_heat_layer(&self.zone_volumes, index, &self.config.heat),
            None => HeatLayer::default(),
        };
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Select a zone. Any resolution prepared before this call becomes stale.
    pub fn select(&mut self, zone: &str) -> SelectionToken {
        self.last_token += 1;
        let token = SelectionToken(self.last_token);
        debug!("[FlowQuery] Selected '{}' ({:?})", zone, token);
        self.state = SelectionState::Resolving {
            zone: zone.to_string(),
            token,
        };
        token
    }

    /// Snapshot the current selection for resolving. `None` unless a selection is
    /// waiting for its paths.
    pub fn prepare(&self) -> Option<PendingResolution> {
        let SelectionState::Resolving { zone, token } = &self.state else {
            return None;
        };
        Some(PendingResolution {
            zone: zone.clone(),
            token: *token,
            data_version: self.data_version,
            geometry_version: self.geometry_version,
            flow: Arc::clone(&self.flow),
            index: self.index.clone(),
            topology: self.topology.clone(),
        })
    }

    /// Install resolved paths, replacing the current transition layer in one step.
    ///
    /// Returns `false` (and drops the paths) when the result is stale.
    pub fn commit(&mut self, resolved: ResolvedSelection) -> bool {
        let current = match &self.state {
            SelectionState::Resolving { zone, token } if *token == resolved.token => zone.clone(),
            _ => {
                debug!("[FlowQuery] Discarding resolution {:?}: selection changed", resolved.token);
                return false;
            }
        };
        if resolved.data_version != self.data_version
            || resolved.geometry_version != self.geometry_version
        {
            debug!("[FlowQuery] Discarding resolution {:?}: inputs were rebuilt", resolved.token);
            return false;
        }

        self.paths = resolved.resolution.paths;
        self.issues = resolved.resolution.issues;
        self.state = SelectionState::Rendered {
            zone: current,
            token: resolved.token,
        };
        true
    }

    /// Select, resolve and commit in one go.
    pub fn select_and_resolve(&mut self, zone: &str) -> &[LabeledPath] {
        self.select(zone);
        if let Some(pending) = self.prepare() {
            let resolved = pending.resolve(self.pathfinder.as_ref());
            self.commit(resolved);
        }
        &self.paths
    }

    /// Drop the selection and its paths.
    pub fn deselect(&mut self) {
        debug!("[FlowQuery] Deselected");
        self.paths.clear();
        self.issues.clear();
        self.state = SelectionState::Idle;
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Paths of the rendered selection (empty unless `Rendered`).
    pub fn transition_layer(&self) -> &[LabeledPath] {
        &self.paths
    }

    /// Issues met while resolving the rendered selection.
    pub fn path_issues(&self) -> &[FlowIssue] {
        &self.issues
    }

    pub fn heat_layer(&self) -> &HeatLayer {
        &self.heat_layer
    }

    pub fn flow(&self) -> &FlowGraph {
        &self.flow
    }

    pub fn zone_index(&self) -> Option<&ZoneGeometryIndex> {
        self.index.as_deref()
    }

    pub fn config(&self) -> &ZoneFlowConfig {
        &self.config
    }

    /// Shared handle to the pathfinder, for resolving a [`PendingResolution`] elsewhere.
    pub fn pathfinder(&self) -> Arc<P> {
        Arc::clone(&self.pathfinder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::TransitionRow;
    use geo::{Coord, Geometry, Point};
    use serde_json::json;

    /// Connects any two anchors directly.
    struct StraightLine;

    impl Pathfinder for StraightLine {
        fn find_path(
            &self,
            _: &TopologyGraph,
            start: &ZoneGeometry,
            end: &ZoneGeometry,
        ) -> Option<Vec<Coord<f64>>> {
            Some(vec![start.anchor()?, end.anchor()?])
        }
    }

    /// Refuses to route to one zone.
    struct Blocked(&'static str);

    impl Pathfinder for Blocked {
        fn find_path(
            &self,
            _: &TopologyGraph,
            start: &ZoneGeometry,
            end: &ZoneGeometry,
        ) -> Option<Vec<Coord<f64>>> {
            if end.name == self.0 {
                return None;
            }
            Some(vec![start.anchor()?, end.anchor()?])
        }
    }

    fn index_of(names: &[&str]) -> ZoneGeometryIndex {
        ZoneGeometryIndex::from_zones(names.iter().enumerate().map(|(i, name)| {
            ZoneGeometry::new(*name, None, Geometry::Point(Point::new(i as f64 * 0.001, 0.0)))
        }))
    }

    fn flow_of(rows: &[TransitionRow]) -> FlowGraph {
        aggregate_transitions(rows)
    }

    fn labels(resolution: &PathResolution) -> Vec<(&str, &str)> {
        resolution
            .paths
            .iter()
            .map(|p| (p.to.as_str(), p.label.as_str()))
            .collect()
    }

    fn resolve(zone: &str, rows: &[TransitionRow], names: &[&str]) -> PathResolution {
        let graph = TopologyGraph::default();
        resolve_paths(zone, &flow_of(rows), &index_of(names), &graph, &StraightLine)
    }

    #[test]
    fn test_outbound_only() {
        let rows = vec![TransitionRow::new("A", &[("B", 7.0)])];
        let resolution = resolve("A", &rows, &["A", "B"]);

        assert_eq!(labels(&resolution), vec![("B", "From: 7")]);
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_inbound_only() {
        let rows = vec![
            TransitionRow::new("B", &[("A", 3.0)]),
            TransitionRow::new("C", &[("A", 2.5)]),
        ];
        let resolution = resolve("A", &rows, &["A", "B", "C"]);

        assert_eq!(labels(&resolution), vec![("B", "To: 3"), ("C", "To: 2.5")]);
    }

    #[test]
    fn test_both_directions_merge() {
        let rows = vec![
            TransitionRow::new("A", &[("B", 7.0)]),
            TransitionRow::new("B", &[("A", 2.0)]),
        ];
        let resolution = resolve("A", &rows, &["A", "B"]);

        assert_eq!(labels(&resolution), vec![("B", "From: 7 - To: 2")]);
    }

    #[test]
    fn test_both_directions_mixed_neighbors() {
        let rows = vec![
            TransitionRow::new("A", &[("B", 7.0), ("D", 5.0)]),
            TransitionRow::new("B", &[("A", 2.0)]),
            TransitionRow::new("C", &[("A", 4.0)]),
        ];
        let resolution = resolve("A", &rows, &["A", "B", "C", "D"]);

        assert_eq!(
            labels(&resolution),
            vec![("B", "From: 7 - To: 2"), ("D", "From: 5"), ("C", "To: 4")]
        );
        assert!(resolution.paths.iter().all(|p| p.from == "A"));
    }

    #[test]
    fn test_missing_neighbor_geometry_is_skipped() {
        let rows = vec![TransitionRow::new("A", &[("B", 7.0), ("Offsite", 1.0)])];
        let resolution = resolve("A", &rows, &["A", "B"]);

        assert_eq!(labels(&resolution), vec![("B", "From: 7")]);
        assert_eq!(resolution.issues, vec![FlowIssue::MissingGeometry("Offsite".into())]);
    }

    #[test]
    fn test_missing_selected_geometry_aborts() {
        let rows = vec![TransitionRow::new("A", &[("B", 7.0)])];
        let resolution = resolve("A", &rows, &["B"]);

        assert!(resolution.paths.is_empty());
        assert_eq!(resolution.issues, vec![FlowIssue::MissingGeometry("A".into())]);
    }

    #[test]
    fn test_unroutable_pair_is_skipped() {
        let rows = vec![TransitionRow::new("A", &[("B", 7.0), ("C", 1.0)])];
        let flow = flow_of(&rows);
        let resolution = resolve_paths(
            "A",
            &flow,
            &index_of(&["A", "B", "C"]),
            &TopologyGraph::default(),
            &Blocked("B"),
        );

        assert_eq!(labels(&resolution), vec![("C", "From: 1")]);
        assert_eq!(
            resolution.issues,
            vec![FlowIssue::NoPathFound { from: "A".into(), to: "B".into() }]
        );
    }

    #[test]
    fn test_self_transition_not_drawn() {
        let rows = vec![TransitionRow::new("A", &[("A", 3.0), ("B", 1.0)])];
        let resolution = resolve("A", &rows, &["A", "B"]);
        assert_eq!(labels(&resolution), vec![("B", "From: 1")]);
        assert_eq!(
            resolution.issues,
            vec![FlowIssue::SelfTransition { zone: "A".into(), volume: 3.0 }]
        );

        let only_self = vec![TransitionRow::new("A", &[("A", 3.0)])];
        let resolution = resolve("A", &only_self, &["A"]);
        assert!(resolution.paths.is_empty());
        assert_eq!(resolution.issues.len(), 1);
    }

    #[test]
    fn test_zone_without_flow() {
        let resolution = resolve("A", &[], &["A"]);
        assert!(resolution.paths.is_empty());
        assert!(resolution.issues.is_empty());
    }

    #[test]
    fn test_same_level_endpoints_are_used() {
        use crate::zones::Level;

        let at = |name: &str, level: i64, x: f64| {
            ZoneGeometry::new(name, Some(Level::from(level)), Geometry::Point(Point::new(x, 0.0)))
        };
        let index = ZoneGeometryIndex::from_zones(vec![
            at("A", 0, 0.0),
            at("A", 1, 0.0005),
            at("B", 1, 0.002),
        ]);
        let flow = flow_of(&[TransitionRow::new("A", &[("B", 1.0)])]);

        let graph = TopologyGraph::default();
        let resolution = resolve_paths("A", &flow, &index, &graph, &StraightLine);
        let path = &resolution.paths[0];
        let expected_start = crate::geo_utils::to_web_mercator(Coord { x: 0.0005, y: 0.0 });
        assert!((path.geometry.0[0].x - expected_start.x).abs() < 1e-6);
    }

    // ------------------------------------------------------------------------
    // Facade
    // ------------------------------------------------------------------------

    fn frames() -> Vec<SeriesFrame> {
        vec![
            SeriesFrame::new(
                "docs",
                vec![
                    json!({ "_id": "1", "Source": "A", "B": 7, "timestamp": 0 }),
                    json!({ "_id": "2", "Source": "B", "A": 2, "C": 1 }),
                ],
            ),
            SeriesFrame::new("A", vec![json!(1), json!(1)]),
            SeriesFrame::new("B", vec![json!(8)]),
        ]
    }

    fn facade() -> FlowQueryFacade<StraightLine> {
        let mut facade = FlowQueryFacade::with_pathfinder(ZoneFlowConfig::default(), StraightLine);
        facade.update_geometry(Some(index_of(&["A", "B", "C"])), Some(TopologyGraph::default()));
        facade.update_frames(&frames());
        facade
    }

    #[test]
    fn test_select_and_resolve() {
        let mut facade = facade();

        let paths = facade.select_and_resolve("A");
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].label, "From: 7 - To: 2");
        assert!(matches!(facade.state(), SelectionState::Rendered { zone, .. } if zone == "A"));

        let paths = facade.select_and_resolve("B");
        let labels: Vec<&str> = paths.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["From: 2 - To: 7", "From: 1"]);
    }

    #[test]
    fn test_deselect_clears_layer() {
        let mut facade = facade();
        facade.select_and_resolve("A");
        facade.deselect();

        assert!(facade.transition_layer().is_empty());
        assert_eq!(facade.state(), &SelectionState::Idle);
        assert!(facade.prepare().is_none());
    }

    #[test]
    fn test_newer_selection_wins() {
        let mut facade = facade();

        facade.select("A");
        let stale = facade.prepare().unwrap();
        let fresh_token = facade.select("B");
        let fresh = facade.prepare().unwrap();
        assert_eq!(fresh.token(), fresh_token);
        assert!(stale.token() < fresh_token);

        let pathfinder = facade.pathfinder();
        let fresh = fresh.resolve(pathfinder.as_ref());
        let stale = stale.resolve(pathfinder.as_ref());

        assert!(!facade.commit(stale));
        assert!(facade.transition_layer().is_empty());
        assert!(facade.commit(fresh));
        assert!(facade.transition_layer().iter().all(|p| p.from == "B"));
    }

    #[test]
    fn test_data_refresh_invalidates_pending() {
        let mut facade = facade();
        facade.select("A");
        let pending = facade.prepare().unwrap();

        facade.update_frames(&frames());
        let resolved = pending.resolve(facade.pathfinder().as_ref());
        assert!(!facade.commit(resolved));

        // Same selection, fresh snapshot
        let resolved = facade.prepare().unwrap().resolve(facade.pathfinder().as_ref());
        assert!(facade.commit(resolved));
        assert_eq!(facade.transition_layer().len(), 1);
    }

    #[test]
    fn test_geometry_refresh_invalidates_pending() {
        let mut facade = facade();
        facade.select("A");
        let pending = facade.prepare().unwrap();

        facade.update_geometry(Some(index_of(&["A", "B"])), Some(TopologyGraph::default()));
        let resolved = pending.resolve(facade.pathfinder().as_ref());
        assert!(!facade.commit(resolved));
    }

    #[test]
    fn test_commit_after_deselect_is_rejected() {
        let mut facade = facade();
        facade.select("A");
        let pending = facade.prepare().unwrap();
        facade.deselect();

        let resolved = pending.resolve(facade.pathfinder().as_ref());
        assert!(!facade.commit(resolved));
        assert!(facade.transition_layer().is_empty());
    }

    #[test]
    fn test_pending_resolves_on_other_thread() {
        let mut facade = facade();
        facade.select("A");
        let pending = facade.prepare().unwrap();

        let resolved = std::thread::spawn(move || pending.resolve(&StraightLine))
            .join()
            .unwrap();
        assert!(facade.commit(resolved));
        assert_eq!(facade.transition_layer().len(), 1);
    }

    #[test]
    fn test_missing_topology_disables_paths_only() {
        let mut facade = FlowQueryFacade::with_pathfinder(ZoneFlowConfig::default(), StraightLine);
        facade.update_geometry(Some(index_of(&["A", "B"])), None);
        facade.update_frames(&frames());

        assert!(facade.select_and_resolve("A").is_empty());
        assert_eq!(facade.heat_layer().values.len(), 2);
    }

    #[test]
    fn test_missing_zones_disable_heat_and_paths() {
        let mut facade = FlowQueryFacade::with_pathfinder(ZoneFlowConfig::default(), StraightLine);
        facade.update_frames(&frames());

        assert!(facade.heat_layer().polygons.is_empty());
        assert!(facade.select_and_resolve("A").is_empty());
        assert_eq!(facade.flow().outbound["A"]["B"], 7.0);
    }

    #[test]
    fn test_heat_layer_follows_data() {
        let facade = facade();
        let heat = facade.heat_layer();

        // A: 2 -> log2 = 1, B: 8 -> log2 = 3
        let a = heat.values.iter().find(|v| v.zone == "A").unwrap();
        let b = heat.values.iter().find(|v| v.zone == "B").unwrap();
        assert_eq!(a.hue, 120.0);
        assert_eq!(b.hue, 0.0);
    }
}
