//! Column layout configuration for historical observation files.
//!
//! The layout changed between revisions of the logging script, so the
//! positions are injected into the parser and aggregator rather than
//! hard-coded. The default matches the most recent file layout.

use serde::Deserialize;

/// At most this many vehicle-kind columns are ever consulted.
pub const MAX_VEHICLE_KINDS: usize = 5;

/// Maps each logical field to its column position in a raw row.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecordSchema {
    /// Field separator used when splitting a raw line.
    pub delimiter: char,
    /// Segment/queue descriptor label.
    pub segment_label: usize,
    /// Queue-length metric in meters (float).
    pub queue_length: usize,
    /// Day-of-week label.
    pub day: usize,
    /// Weather label.
    pub weather: usize,
    /// Hour the observation was logged.
    pub observed_hour: usize,
    /// Minute the observation was logged.
    pub observed_minute: usize,
    /// Predicted board hour.
    pub board_hour: usize,
    /// Predicted board minute.
    pub board_minute: usize,
    /// Number of vehicles in the departure.
    pub vehicle_count: usize,
    /// Vehicle-kind label columns, in canonical order.
    pub vehicle_kinds: Vec<usize>,
}

impl Default for RecordSchema {
    fn default() -> Self {
        RecordSchema {
            delimiter: ',',
            segment_label: 0,
            queue_length: 1,
            day: 2,
            weather: 3,
            observed_hour: 5,
            observed_minute: 6,
            board_hour: 12,
            board_minute: 13,
            vehicle_count: 14,
            vehicle_kinds: vec![15, 16, 17, 18, 19],
        }
    }
}

impl RecordSchema {
    /// Loads a layout override from a JSON document. Omitted fields keep
    /// their default positions.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
