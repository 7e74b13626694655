//! Reduces a matched record list to a single predicted departure.
//!
//! The prediction is the statistical mode of the board times carried by
//! the matches; everything else in the result derives from the earliest
//! record carrying that time. Aggregation is a pure function of its
//! inputs and keeps no state between calls.

use serde::Serialize;
use tracing::debug;

use crate::error::PredictionError;
use crate::index::time_key;
use crate::parser::Record;
use crate::schema::{MAX_VEHICLE_KINDS, RecordSchema};

/// Placeholder for source values that are absent or unparseable. The
/// result never fabricates a number in their place.
pub const NOT_AVAILABLE: &str = "not available";

const MINUTES_PER_DAY: i64 = 24 * 60;

/// The predicted outcome handed to the presentation side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResult {
    /// Most frequent board time among the matches, `HH:MM`.
    pub predicted_time: String,
    /// Minutes from the query time to the predicted departure, wrapping
    /// past midnight when the departure falls on the next day.
    pub wait_minutes: u32,
    /// Queue length formatted to two decimals with its unit, or
    /// [`NOT_AVAILABLE`].
    pub queue_length: String,
    /// Up to five vehicle-kind labels in canonical order; `None` when
    /// the record carries no usable vehicle count.
    pub vehicle_kinds: Option<Vec<String>>,
}

fn board_time(record: &Record, schema: &RecordSchema) -> Option<String> {
    let hour: u32 = record.field(schema.board_hour)?.trim().parse().ok()?;
    let minute: u32 = record.field(schema.board_minute)?.trim().parse().ok()?;
    Some(time_key(hour, minute))
}

fn minutes_since_midnight(key: &str) -> Option<i64> {
    let (hour, minute) = key.split_once(':')?;
    let hour: i64 = hour.parse().ok()?;
    let minute: i64 = minute.parse().ok()?;
    Some(hour * 60 + minute)
}

/// Picks the most frequent board time. Counts accumulate in
/// first-occurrence order and the scan only replaces the running
/// maximum on a strict increase, so ties go to the time that appeared
/// earliest in `matches`.
fn select_mode(matches: &[Record], schema: &RecordSchema) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in matches {
        let Some(time) = board_time(record, schema) else {
            continue;
        };
        match counts.iter().position(|(t, _)| *t == time) {
            Some(i) => counts[i].1 += 1,
            None => counts.push((time, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (time, n) in &counts {
        if best.map(|(_, m)| *n > m).unwrap_or(true) {
            best = Some((time.as_str(), *n));
        }
    }
    best.map(|(time, _)| time.to_string())
}

fn format_queue_length(record: &Record, schema: &RecordSchema) -> String {
    record
        .field(schema.queue_length)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .map(|meters| format!("{meters:.2} m"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn vehicle_kinds(record: &Record, schema: &RecordSchema) -> Option<Vec<String>> {
    let count: i64 = record.field(schema.vehicle_count)?.trim().parse().ok()?;
    if count <= 0 {
        return None;
    }
    let take = (count as usize).min(MAX_VEHICLE_KINDS);
    let kinds = schema
        .vehicle_kinds
        .iter()
        .take(take)
        .map(|&pos| {
            let label = record.field(pos).map(str::trim).unwrap_or("");
            if label.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                label.to_string()
            }
        })
        .collect();
    Some(kinds)
}

/// Aggregates a non-empty match list into a [`PredictionResult`].
///
/// `query_time` must be a normalized `HH:MM` key. Fails with
/// [`PredictionError::AggregationImpossible`] when no match carries a
/// parseable board time, which signals malformed historical data rather
/// than absence of data.
pub fn aggregate(
    matches: &[Record],
    query_time: &str,
    schema: &RecordSchema,
) -> Result<PredictionResult, PredictionError> {
    let predicted_time =
        select_mode(matches, schema).ok_or(PredictionError::AggregationImpossible)?;

    // earliest match carrying the mode time
    let representative = matches
        .iter()
        .find(|r| board_time(r, schema).as_deref() == Some(&predicted_time))
        .ok_or(PredictionError::AggregationImpossible)?;

    let query_minutes = minutes_since_midnight(query_time).ok_or_else(|| {
        PredictionError::InvalidQuery(format!("time must be HH:MM, got {query_time:?}"))
    })?;
    let board_minutes = minutes_since_midnight(&predicted_time)
        .ok_or(PredictionError::AggregationImpossible)?;

    let wait = if board_minutes < query_minutes {
        // departure is tomorrow
        board_minutes + MINUTES_PER_DAY - query_minutes
    } else {
        board_minutes - query_minutes
    };
    let wait_minutes = wait.max(0) as u32;

    debug!(
        matched = matches.len(),
        %predicted_time,
        wait_minutes,
        "Aggregated prediction"
    );

    Ok(PredictionResult {
        predicted_time,
        wait_minutes,
        queue_length: format_queue_length(representative, schema),
        vehicle_kinds: vehicle_kinds(representative, schema),
    })
}
