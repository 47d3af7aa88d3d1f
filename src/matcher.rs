//! Endpoint selection for duplicate-named zones.

use crate::zones::ZoneGeometry;

/// Pick one start and one end feature for a path.
///
/// Walks the end candidates in order and, for each, the start candidates in order; the
/// first pair on the same level wins and the scan stops there. With no same-level pair
/// the first candidate of each list is used. This favors same-floor routes but is a
/// heuristic: it does not look at distance between candidates.
///
/// The end-major order is chosen so the example below yields `(start[1], end[0])`; a
/// start-major scan would yield `(start[0], end[1])`.
///
/// Returns `None` only if either list is empty.
///
/// # Example
///
/// ```rust
/// use geo::{Geometry, Point};
/// use zone_flow::{find_optimal_match, Level, ZoneGeometry};
///
/// let at = |level: i64| {
///     ZoneGeometry::new("Z", Some(Level::from(level)), Geometry::Point(Point::new(0.0, 0.0)))
/// };
/// let start = vec![at(1), at(2)];
/// let end = vec![at(2), at(1)];
///
/// let (s, e) = find_optimal_match(&start, &end).unwrap();
/// assert!(std::ptr::eq(s, &start[1]));
/// assert!(std::ptr::eq(e, &end[0]));
/// ```
pub fn find_optimal_match<'a>(
    start_candidates: &'a [ZoneGeometry],
    end_candidates: &'a [ZoneGeometry],
) -> Option<(&'a ZoneGeometry, &'a ZoneGeometry)> {
    let same_level = end_candidates.iter().find_map(|end| {
        start_candidates
            .iter()
            .find(|start| start.level == end.level)
            .map(|start| (start, end))
    });

    same_level.or_else(|| Some((start_candidates.first()?, end_candidates.first()?)))
}
