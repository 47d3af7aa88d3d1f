//! # Geographic Utilities
//!
//! Coordinate helpers shared by the topology, path and heat modules.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two lon/lat coordinates |
//! | [`polyline_length`] | Total length of a coordinate sequence in meters |
//! | [`to_web_mercator`] | Project one EPSG:4326 coordinate to EPSG:3857 |
//! | [`project_geometry`] | Project a whole geometry to EPSG:3857 |
//! | [`quantize`] | Snap a coordinate onto an integer grid key |
//!
//! ## Example
//!
//! ```rust
//! use geo::Coord;
//! use zone_flow::geo_utils;
//!
//! let entrance = Coord { x: 4.8952, y: 52.3702 };
//! let food_court = Coord { x: 4.8960, y: 52.3705 };
//!
//! let dist = geo_utils::haversine_distance(entrance, food_court);
//! assert!(dist > 50.0 && dist < 70.0);
//!
//! let projected = geo_utils::to_web_mercator(entrance);
//! assert!(projected.x > 544_000.0 && projected.x < 546_000.0);
//! ```
//!
//! ## Coordinate System
//!
//! Inputs are WGS84 (EPSG:4326) with `x` = longitude and `y` = latitude, which is the
//! GeoJSON axis order. Rendered output is spherical web mercator (EPSG:3857) in meters,
//! the projection used by slippy-map tile layers.

use geo::{Coord, Distance, Geometry, Haversine, MapCoords, Point};

/// Earth radius used by EPSG:3857, in meters.
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of EPSG:3857 (where the square world map ends).
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance between two lon/lat coordinates, in meters.
///
/// # Example
///
/// ```rust
/// use geo::Coord;
/// use zone_flow::geo_utils;
///
/// let london = Coord { x: -0.1278, y: 51.5074 };
/// let paris = Coord { x: 2.3522, y: 48.8566 };
///
/// let distance = geo_utils::haversine_distance(london, paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}

/// Total length of a coordinate sequence in meters.
///
/// Empty or single-point sequences return 0.0.
pub fn polyline_length(coords: &[Coord<f64>]) -> f64 {
    if coords.len() < 2 {
        return 0.0;
    }

    coords
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

// =============================================================================
// Projection
// =============================================================================

/// Project an EPSG:4326 coordinate (lon/lat degrees) to EPSG:3857 (meters).
///
/// Latitudes beyond ±85.0511° are clamped to the projection's limit.
///
/// ```rust
/// use geo::Coord;
/// use zone_flow::geo_utils::to_web_mercator;
///
/// let origin = to_web_mercator(Coord { x: 0.0, y: 0.0 });
/// assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);
/// ```
#[inline]
pub fn to_web_mercator(coord: Coord<f64>) -> Coord<f64> {
    let lat = coord.y.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    let x = WEB_MERCATOR_RADIUS * coord.x.to_radians();
    let y = WEB_MERCATOR_RADIUS
        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    Coord { x, y }
}

/// Project every coordinate of a geometry to EPSG:3857.
pub fn project_geometry(geometry: &Geometry<f64>) -> Geometry<f64> {
    geometry.map_coords(to_web_mercator)
}

// =============================================================================
// Grid keys
// =============================================================================

/// Snap a coordinate onto an integer grid with cells of `precision` degrees.
///
/// Two coordinates closer than the grid size (on both axes) usually share a key, which
/// is how network vertices that were digitized separately get joined.
#[inline]
pub fn quantize(coord: Coord<f64>, precision: f64) -> (i64, i64) {
    (
        (coord.x / precision).round() as i64,
        (coord.y / precision).round() as i64,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let c = Coord { x: 4.8952, y: 52.3702 };
        assert_eq!(haversine_distance(c, c), 0.0);
    }

    #[test]
    fn test_polyline_length_short_inputs() {
        assert_eq!(polyline_length(&[]), 0.0);
        assert_eq!(polyline_length(&[Coord { x: 1.0, y: 1.0 }]), 0.0);
    }

    #[test]
    fn test_polyline_length_sums_segments() {
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.001, y: 0.0 };
        let c = Coord { x: 0.002, y: 0.0 };
        let total = polyline_length(&[a, b, c]);
        assert!(approx_eq(total, haversine_distance(a, c), 1e-6));
        assert!(approx_eq(total, 222.39, 0.5));
    }

    #[test]
    fn test_web_mercator_known_values() {
        let east = to_web_mercator(Coord { x: 180.0, y: 0.0 });
        assert!(approx_eq(east.x, 20_037_508.342_789_244, 1e-3));
        assert!(approx_eq(east.y, 0.0, 1e-6));

        // Poles are clamped instead of going to infinity
        let north = to_web_mercator(Coord { x: 0.0, y: 90.0 });
        assert!(north.y.is_finite());
        assert!(approx_eq(north.y, 20_037_508.342_789_244, 1.0));
    }

    #[test]
    fn test_project_geometry_keeps_shape_type() {
        let poly: Polygon<f64> = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.001, y: 0.0),
            (x: 0.001, y: 0.001),
        ];
        let projected = project_geometry(&Geometry::Polygon(poly));
        match projected {
            Geometry::Polygon(p) => {
                let second = p.exterior().0[1];
                assert!(approx_eq(second.x, 111.319_49, 1e-3));
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_quantize_joins_near_vertices() {
        let a = Coord { x: 4.123_456_71, y: 52.0 };
        let b = Coord { x: 4.123_456_74, y: 52.0 };
        assert_eq!(quantize(a, 1e-7), quantize(b, 1e-7));
        assert_ne!(quantize(a, 1e-9), quantize(b, 1e-9));
    }
}
