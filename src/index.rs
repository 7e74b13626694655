//! The schedule index: a three-level lookup over historical records.
//!
//! Records are keyed by normalized day-of-week, weather, and observed
//! time slot. The index is built in one pass from the full historical
//! collection and never mutated afterwards; reloading historical data
//! builds a fresh index that replaces the old one wholesale.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::parser::Record;
use crate::schema::RecordSchema;

/// Trims surrounding whitespace and case-folds a day or weather label.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Formats an hour/minute pair as a zero-padded `HH:MM` slot key.
pub fn time_key(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

fn parse_component(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// The (day, weather, time-slot) triple a record files under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedKey {
    pub day: String,
    pub weather: String,
    pub time: String,
}

/// Computes a record's index key, or `None` when a required field is
/// missing, empty, or unparseable.
pub fn normalized_key(record: &Record, schema: &RecordSchema) -> Option<NormalizedKey> {
    let day = normalize_label(record.field(schema.day)?);
    let weather = normalize_label(record.field(schema.weather)?);
    if day.is_empty() || weather.is_empty() {
        return None;
    }
    let hour = parse_component(record.field(schema.observed_hour)?)?;
    let minute = parse_component(record.field(schema.observed_minute)?)?;
    Some(NormalizedKey {
        day,
        weather,
        time: time_key(hour, minute),
    })
}

/// Per day/weather coverage line for reporting.
#[derive(Debug, PartialEq, Eq)]
pub struct CoverageEntry {
    pub day: String,
    pub weather: String,
    pub slots: usize,
    pub records: usize,
}

/// dayKey → weatherKey → timeKey → records observed under that condition,
/// in insertion order, duplicates retained.
#[derive(Debug, Default)]
pub struct ScheduleIndex {
    slots: HashMap<String, HashMap<String, HashMap<String, Vec<Record>>>>,
}

impl ScheduleIndex {
    /// Builds the index in a single pass over `records`.
    ///
    /// Records without a usable key are dropped, never fatal: a bad row
    /// in a day's file must not poison the rest of the history. An
    /// empty input collection yields an empty index.
    pub fn build(records: Vec<Record>, schema: &RecordSchema) -> Self {
        let total = records.len();
        let mut slots: HashMap<String, HashMap<String, HashMap<String, Vec<Record>>>> =
            HashMap::new();
        let mut kept = 0usize;

        for record in records {
            let Some(key) = normalized_key(&record, schema) else {
                debug!(fields = record.field_count(), "Dropping malformed record");
                continue;
            };
            slots
                .entry(key.day)
                .or_default()
                .entry(key.weather)
                .or_default()
                .entry(key.time)
                .or_default()
                .push(record);
            kept += 1;
        }

        info!(
            total,
            kept,
            dropped = total - kept,
            days = slots.len(),
            "Schedule index built"
        );

        ScheduleIndex { slots }
    }

    /// Looks up the records filed under an already-normalized key
    /// triple. An absent level at any depth is the ordinary no-match
    /// outcome and returns an empty slice.
    pub fn records_at(&self, day: &str, weather: &str, time: &str) -> &[Record] {
        self.slots
            .get(day)
            .and_then(|by_weather| by_weather.get(weather))
            .and_then(|by_time| by_time.get(time))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total records retained across all slots.
    pub fn record_count(&self) -> usize {
        self.slots
            .values()
            .flat_map(|by_weather| by_weather.values())
            .flat_map(|by_time| by_time.values())
            .map(Vec::len)
            .sum()
    }

    /// Coverage per (day, weather) pair, sorted for stable reporting.
    pub fn coverage(&self) -> Vec<CoverageEntry> {
        let mut entries: Vec<CoverageEntry> = self
            .slots
            .iter()
            .flat_map(|(day, by_weather)| {
                by_weather.iter().map(|(weather, by_time)| CoverageEntry {
                    day: day.clone(),
                    weather: weather.clone(),
                    slots: by_time.len(),
                    records: by_time.values().map(Vec::len).sum(),
                })
            })
            .collect();
        entries.sort_by(|a, b| (&a.day, &a.weather).cmp(&(&b.day, &b.weather)));
        entries
    }
}
