//! Time-series frames supplied by the host.
//!
//! Each frame is a named series with a single value column. Frames named `docs` carry
//! transition records; every other named frame is one zone's volume series.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ZoneFlowError;
use crate::flow::TransitionRow;
use crate::ZoneId;

/// Name of the frames that hold transition records.
pub const TRANSITION_FRAME: &str = "docs";

/// One named series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesFrame {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl SeriesFrame {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self { name: Some(name.into()), values }
    }

    /// Sum of the numeric values, ignoring nulls and anything else.
    pub fn sum(&self) -> f64 {
        self.values.iter().filter_map(Value::as_f64).sum()
    }

    fn is_transitions(&self) -> bool {
        self.name.as_deref() == Some(TRANSITION_FRAME)
    }
}

/// Aggregate volume of one zone over the queried period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneVolume {
    pub zone: ZoneId,
    pub raw_volume: f64,
}

impl ZoneVolume {
    pub fn new(zone: impl Into<ZoneId>, raw_volume: f64) -> Self {
        Self { zone: zone.into(), raw_volume }
    }
}

/// Frames split by purpose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameData {
    /// Records from every `docs` frame, in frame then row order
    pub transitions: Vec<TransitionRow>,
    /// One entry per named non-`docs` frame, in frame order
    pub zone_volumes: Vec<ZoneVolume>,
}

/// Split frames into transition rows and zone volumes.
pub fn split_frames(frames: &[SeriesFrame]) -> FrameData {
    let mut data = FrameData::default();

    for frame in frames {
        if frame.is_transitions() {
            let before = data.transitions.len();
            data.transitions.extend(
                frame
                    .values
                    .iter()
                    .filter_map(Value::as_object)
                    .map(TransitionRow::from_record),
            );
            debug!(
                "[Frames] {} transition records ({} values)",
                data.transitions.len() - before,
                frame.values.len()
            );
        } else if let Some(name) = &frame.name {
            data.zone_volumes.push(ZoneVolume::new(name.clone(), frame.sum()));
        }
    }

    data
}

/// Parse a JSON array of frames.
pub fn parse_frames(json: &str) -> Result<Vec<SeriesFrame>, ZoneFlowError> {
    Ok(serde_json::from_str(json)?)
}
