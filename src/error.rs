//! Error types.
//!
//! Two families live here:
//! - [`ZoneFlowError`] for input that cannot be parsed at all (fatal for that input)
//! - [`FlowIssue`] for the recoverable conditions met while building layers; these are
//!   logged where they happen and handed back to the caller alongside the result

use serde::Serialize;

use crate::ZoneId;

/// Fatal errors raised while parsing host input.
#[derive(Debug, thiserror::Error)]
pub enum ZoneFlowError {
    /// The document is not valid JSON or does not have the expected shape
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A GeoJSON geometry type this crate does not read
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// A position with fewer than two ordinates, or a ring that cannot form a polygon
    #[error("malformed coordinates in {context}")]
    MalformedCoordinates { context: String },
}

/// Recoverable conditions. None of these stop processing; the affected zone, path or
/// color is simply absent from the output.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum FlowIssue {
    /// A zone name has no matching geometry feature
    #[error("no geometry for zone '{0}'")]
    MissingGeometry(ZoneId),

    /// The pathfinder could not connect two resolved endpoints
    #[error("no path from '{from}' to '{to}'")]
    NoPathFound { from: ZoneId, to: ZoneId },

    /// A zone's transitions to itself; a route from a zone to itself has no extent
    #[error("self transition of '{zone}' ({volume}) is not drawn")]
    SelfTransition { zone: ZoneId, volume: f64 },

    /// Every rendered zone has the same log volume, so the heat scale has no range
    #[error("degenerate heat range: all zones at log2 volume {0}")]
    DegenerateHeatRange(f64),

    /// A zone volume that is zero, negative or not finite, so log2 is undefined
    #[error("zone '{zone}' has invalid volume {volume}")]
    InvalidVolume { zone: ZoneId, volume: f64 },
}

impl FlowIssue {
    /// The zone this issue is about, if it concerns a single zone.
    pub fn zone(&self) -> Option<&str> {
        match self {
            FlowIssue::MissingGeometry(zone) => Some(zone.as_str()),
            FlowIssue::NoPathFound { to, .. } => Some(to.as_str()),
            FlowIssue::InvalidVolume { zone, .. } => Some(zone.as_str()),
            FlowIssue::SelfTransition { zone, .. } => Some(zone.as_str()),
            FlowIssue::DegenerateHeatRange(_) => None,
        }
    }
}
