//! Output formatting and persistence for predictions.
//!
//! Supports pretty-printing, JSON serialization, and CSV append.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, info};

use crate::predict::{NOT_AVAILABLE, PredictionResult};
use crate::query::Query;

/// One prediction flattened to a CSV-friendly row.
#[derive(Debug, Serialize)]
pub struct PredictionRow {
    pub queried_at: DateTime<Utc>,
    pub query_time: String,
    pub query_day: String,
    pub query_weather: String,
    pub predicted_time: String,
    pub wait_minutes: u32,
    pub queue_length: String,
    /// Kind labels joined with `|`, or [`NOT_AVAILABLE`].
    pub vehicle_kinds: String,
}

impl PredictionRow {
    pub fn new(query: &Query, result: &PredictionResult) -> Self {
        let vehicle_kinds = match &result.vehicle_kinds {
            Some(kinds) => kinds.join("|"),
            None => NOT_AVAILABLE.to_string(),
        };
        PredictionRow {
            queried_at: Utc::now(),
            query_time: query.time.clone(),
            query_day: query.day.clone(),
            query_weather: query.weather.clone(),
            predicted_time: result.predicted_time.clone(),
            wait_minutes: result.wait_minutes,
            queue_length: result.queue_length.clone(),
            vehicle_kinds,
        }
    }
}

/// Logs a prediction using Rust's debug pretty-print format.
pub fn print_pretty(result: &PredictionResult) {
    debug!("{:#?}", result);
}

/// Logs a prediction as pretty-printed JSON.
pub fn print_json(result: &PredictionResult) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Appends a [`PredictionRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_row(path: &str, row: &PredictionRow) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}
