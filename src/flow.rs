//! Transition aggregation.
//!
//! Turns raw transition rows (one source zone plus destination/volume fields) into a
//! directed [`FlowGraph`] holding both directions:
//! - `outbound[a][b]`: total volume that left `a` for `b`
//! - `inbound[b][a]`: the same total, keyed from the receiving side
//!
//! Aggregation is a pure fold, so row order and row splitting never change the result.

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ZoneId;

/// Row fields that are never destinations. Matched case-sensitively.
pub const RESERVED_FIELDS: [&str; 5] = ["_id", "_index", "_type", "Source", "timestamp"];

/// Field holding the source zone of a row.
pub const SOURCE_FIELD: &str = "Source";

/// Adjacency map: zone -> (neighbor -> volume).
pub type FlowMap = BTreeMap<ZoneId, BTreeMap<ZoneId, f64>>;

/// One raw transition record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionRow {
    /// Source zone, `None` when the record has no usable `Source`
    pub source: Option<ZoneId>,
    /// Destination zone and volume pairs, in record order
    pub volumes: Vec<(ZoneId, f64)>,
}

impl TransitionRow {
    /// Create a row from a source and destination volumes.
    pub fn new(source: impl Into<ZoneId>, volumes: &[(&str, f64)]) -> Self {
        Self {
            source: Some(source.into()),
            volumes: volumes.iter().map(|(z, v)| (z.to_string(), *v)).collect(),
        }
    }

    /// Read a row from a JSON record.
    ///
    /// Reserved fields are dropped, as is any field whose value is not a number.
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let source = record
            .get(SOURCE_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);

        let volumes = record
            .iter()
            .filter(|(field, _)| !RESERVED_FIELDS.contains(&field.as_str()))
            .filter_map(|(field, value)| value.as_f64().map(|v| (field.clone(), v)))
            .collect();

        Self { source, volumes }
    }

    /// Destination volumes that form edges (strictly positive and finite).
    fn edges(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.volumes
            .iter()
            .filter(|(_, v)| v.is_finite() && *v > 0.0)
            .map(|(z, v)| (z.as_str(), *v))
    }
}

/// Directed flow between zones, built from a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub outbound: FlowMap,
    pub inbound: FlowMap,
}

impl FlowGraph {
    /// True if no edge was recorded.
    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty()
    }

    /// Number of distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.outbound.values().map(BTreeMap::len).sum()
    }

    /// Destinations fed by `zone` and their volumes.
    pub fn outbound_of(&self, zone: &str) -> Option<&BTreeMap<ZoneId, f64>> {
        self.outbound.get(zone)
    }

    /// Sources feeding `zone` and their volumes.
    pub fn inbound_of(&self, zone: &str) -> Option<&BTreeMap<ZoneId, f64>> {
        self.inbound.get(zone)
    }

    /// `zone` itself plus every zone it sends to or receives from.
    pub fn related_zones(&self, zone: &str) -> BTreeSet<ZoneId> {
        let mut related = BTreeSet::new();
        related.insert(zone.to_string());
        for neighbors in [self.outbound_of(zone), self.inbound_of(zone)].into_iter().flatten() {
            related.extend(neighbors.keys().cloned());
        }
        related
    }

    /// Total volume leaving `zone`.
    pub fn total_outbound(&self, zone: &str) -> f64 {
        self.outbound_of(zone).map_or(0.0, |m| m.values().sum())
    }

    /// Total volume arriving at `zone`.
    pub fn total_inbound(&self, zone: &str) -> f64 {
        self.inbound_of(zone).map_or(0.0, |m| m.values().sum())
    }

    /// Every zone that appears on either end of an edge.
    pub fn zones(&self) -> BTreeSet<ZoneId> {
        self.outbound.keys().chain(self.inbound.keys()).cloned().collect()
    }

    fn add_row(mut self, row: &TransitionRow) -> Self {
        let Some(source) = row.source.as_deref() else {
            return self;
        };

        for (destination, volume) in row.edges() {
            *self
                .outbound
                .entry(source.to_string())
                .or_default()
                .entry(destination.to_string())
                .or_insert(0.0) += volume;
            *self
                .inbound
                .entry(destination.to_string())
                .or_default()
                .entry(source.to_string())
                .or_insert(0.0) += volume;
        }
        self
    }

    /// Fold another graph into this one, summing shared edges.
    pub fn merge(mut self, other: FlowGraph) -> Self {
        let pairs = [(&mut self.outbound, other.outbound), (&mut self.inbound, other.inbound)];
        for (target, other_map) in pairs {
            for (zone, neighbors) in other_map {
                let entry = target.entry(zone).or_default();
                for (neighbor, volume) in neighbors {
                    *entry.entry(neighbor).or_insert(0.0) += volume;
                }
            }
        }
        self
    }

    fn pruned(mut self) -> Self {
        self.outbound.retain(|_, neighbors| !neighbors.is_empty());
        self.inbound.retain(|_, neighbors| !neighbors.is_empty());
        self
    }
}

/// Aggregate transition rows into a [`FlowGraph`].
///
/// # Example
///
/// ```rust
/// use zone_flow::{aggregate_transitions, TransitionRow};
///
/// let rows = vec![
///     TransitionRow::new("A", &[("B", 5.0), ("C", 3.0)]),
///     TransitionRow::new("A", &[("B", 2.0)]),
/// ];
/// let flow = aggregate_transitions(&rows);
///
/// assert_eq!(flow.outbound["A"]["B"], 7.0);
/// assert_eq!(flow.inbound["C"]["A"], 3.0);
/// ```
pub fn aggregate_transitions(rows: &[TransitionRow]) -> FlowGraph {
    let start = std::time::Instant::now();
    let flow = rows
        .iter()
        .fold(FlowGraph::default(), FlowGraph::add_row)
        .pruned();

    info!(
        "[FlowAggregator] {} rows -> {} zones, {} edges in {:?}",
        rows.len(),
        flow.zones().len(),
        flow.edge_count(),
        start.elapsed()
    );
    flow
}

/// Parallel version of [`aggregate_transitions`].
///
/// Volumes are summed in a different order than the sequential fold, so totals can
/// differ in the last bits for fractional inputs.
#[cfg(feature = "parallel")]
pub fn aggregate_transitions_parallel(rows: &[TransitionRow]) -> FlowGraph {
    use rayon::prelude::*;

    let start = std::time::Instant::now();
    let flow = rows
        .par_iter()
        .fold(FlowGraph::default, FlowGraph::add_row)
        .reduce(FlowGraph::default, FlowGraph::merge)
        .pruned();

    info!(
        "[FlowAggregator] {} rows -> {} edges in {:?} (parallel)",
        rows.len(),
        flow.edge_count(),
        start.elapsed()
    );
    flow
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_rows() -> Vec<TransitionRow> {
        vec![
            TransitionRow::new("A", &[("B", 5.0), ("C", 3.0)]),
            TransitionRow::new("A", &[("B", 2.0)]),
            TransitionRow::new("B", &[("A", 4.0), ("C", 1.0)]),
            TransitionRow::new("C", &[("A", 0.0)]),
        ]
    }

    #[test]
    fn test_example_aggregation() {
        let rows = vec![
            TransitionRow::new("A", &[("B", 5.0), ("C", 3.0)]),
            TransitionRow::new("A", &[("B", 2.0)]),
        ];
        let flow = aggregate_transitions(&rows);

        assert_eq!(flow.outbound.len(), 1);
        assert_eq!(flow.outbound["A"]["B"], 7.0);
        assert_eq!(flow.outbound["A"]["C"], 3.0);
        assert_eq!(flow.inbound.len(), 2);
        assert_eq!(flow.inbound["B"]["A"], 7.0);
        assert_eq!(flow.inbound["C"]["A"], 3.0);
    }

    #[test]
    fn test_row_from_record_skips_reserved_and_non_numeric() {
        let record = json!({
            "_id": "x1",
            "_index": "transitions-2024",
            "_type": "_doc",
            "Source": "Bakery",
            "timestamp": 1_700_000_000_000_i64,
            "Florist": 12,
            "Pharmacy": 0,
            "note": "weekday"
        });
        let row = TransitionRow::from_record(record.as_object().unwrap());

        assert_eq!(row.source.as_deref(), Some("Bakery"));
        assert_eq!(row.volumes, vec![("Florist".to_string(), 12.0), ("Pharmacy".to_string(), 0.0)]);
    }

    #[test]
    fn test_reserved_fields_are_case_sensitive() {
        let record = json!({ "Source": "A", "source": 3, "Timestamp": 2 });
        let row = TransitionRow::from_record(record.as_object().unwrap());
        let flow = aggregate_transitions(&[row]);

        assert_eq!(flow.outbound["A"]["source"], 3.0);
        assert_eq!(flow.outbound["A"]["Timestamp"], 2.0);
    }

    #[test]
    fn test_malformed_rows_contribute_nothing() {
        let no_source = TransitionRow::from_record(json!({ "B": 4 }).as_object().unwrap());
        let numeric_source =
            TransitionRow::from_record(json!({ "Source": 7, "B": 4 }).as_object().unwrap());
        let no_edges = TransitionRow::new("A", &[("B", 0.0), ("C", -2.0), ("D", f64::NAN)]);

        let flow = aggregate_transitions(&[no_source, numeric_source, no_edges]);
        assert!(flow.is_empty());
        assert!(flow.inbound.is_empty());
    }

    #[test]
    fn test_zero_volume_is_not_an_edge() {
        let flow = aggregate_transitions(&sample_rows());
        // C only sent a zero volume
        assert!(flow.outbound_of("C").is_none());
        assert!(!flow.inbound["A"].contains_key("C"));
    }

    #[test]
    fn test_pruning_invariant() {
        let flow = aggregate_transitions(&sample_rows());
        assert!(flow.outbound.values().all(|m| !m.is_empty()));
        assert!(flow.inbound.values().all(|m| !m.is_empty()));
    }

    #[test]
    fn test_inbound_outbound_symmetry() {
        let flow = aggregate_transitions(&sample_rows());
        for (a, neighbors) in &flow.outbound {
            for (b, v) in neighbors {
                assert_eq!(flow.inbound[b][a], *v);
            }
        }
        for (b, neighbors) in &flow.inbound {
            for (a, v) in neighbors {
                assert_eq!(flow.outbound[a][b], *v);
            }
        }
    }

    #[test]
    fn test_order_independence() {
        let rows = sample_rows();
        let mut reversed = rows.clone();
        reversed.reverse();
        let mut rotated = rows.clone();
        rotated.rotate_left(2);

        let expected = aggregate_transitions(&rows);
        assert_eq!(aggregate_transitions(&reversed), expected);
        assert_eq!(aggregate_transitions(&rotated), expected);
    }

    #[test]
    fn test_split_rows_are_additive() {
        let whole = vec![TransitionRow::new("A", &[("B", 5.0), ("C", 3.0)])];
        let split = vec![
            TransitionRow::new("A", &[("B", 5.0)]),
            TransitionRow::new("A", &[("C", 3.0)]),
        ];
        assert_eq!(aggregate_transitions(&whole), aggregate_transitions(&split));
    }

    #[test]
    fn test_repeated_rows_accumulate() {
        let row = TransitionRow::new("A", &[("B", 2.0)]);
        let flow = aggregate_transitions(&[row.clone(), row.clone(), row]);
        assert_eq!(flow.outbound["A"]["B"], 6.0);
    }

    #[test]
    fn test_graph_queries() {
        let flow = aggregate_transitions(&sample_rows());

        let related: Vec<_> = flow.related_zones("A").into_iter().collect();
        assert_eq!(related, vec!["A", "B", "C"]);
        assert_eq!(flow.total_outbound("A"), 10.0);
        assert_eq!(flow.total_inbound("A"), 4.0);
        assert_eq!(flow.edge_count(), 4);

        let unknown: Vec<_> = flow.related_zones("Z").into_iter().collect();
        assert_eq!(unknown, vec!["Z"]);
        assert_eq!(flow.total_outbound("Z"), 0.0);
    }

    #[test]
    fn test_merge_matches_single_fold() {
        let rows = sample_rows();
        let (left, right) = rows.split_at(2);
        let merged = aggregate_transitions(left).merge(aggregate_transitions(right));
        assert_eq!(merged, aggregate_transitions(&rows));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<TransitionRow> = (0..500)
            .map(|i| {
                let source = format!("Z{}", i % 7);
                let dest = format!("Z{}", (i * 3) % 11);
                TransitionRow::new(source, &[(dest.as_str(), (i % 5) as f64)])
            })
            .collect();

        assert_eq!(aggregate_transitions_parallel(&rows), aggregate_transitions(&rows));
    }
}
