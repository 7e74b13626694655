//! The prediction service: owns the schema and the built index.
//!
//! All state lives in this one value; there is no ambient cache. The
//! index is immutable between loads, so a `Predictor` can be shared
//! freely across concurrent readers.

use tracing::info;

use crate::error::PredictionError;
use crate::index::ScheduleIndex;
use crate::parser::{Record, parse_blob};
use crate::predict::{PredictionResult, aggregate};
use crate::query::{Query, resolve};
use crate::schema::RecordSchema;

pub struct Predictor {
    schema: RecordSchema,
    index: ScheduleIndex,
}

impl Predictor {
    /// Builds a predictor from per-day raw text blobs. A missing day
    /// and an empty day both contribute zero records.
    pub fn from_blobs<I>(blobs: I, schema: RecordSchema) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let records = collect_records(blobs, &schema);
        info!(records = records.len(), "Historical records parsed");
        let index = ScheduleIndex::build(records, &schema);
        Predictor { schema, index }
    }

    /// Rebuilds the index from a fresh set of blobs. The new index is
    /// constructed completely before it replaces the old one, so a
    /// reader never observes a partially updated structure.
    pub fn reload<I>(&mut self, blobs: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let records = collect_records(blobs, &self.schema);
        self.index = ScheduleIndex::build(records, &self.schema);
    }

    /// Answers one query. `Ok(None)` means the history holds no record
    /// for that condition triple, which is a normal outcome.
    pub fn predict(&self, query: &Query) -> Result<Option<PredictionResult>, PredictionError> {
        let resolved = resolve(&self.index, query)?;
        if resolved.matches.is_empty() {
            return Ok(None);
        }
        aggregate(resolved.matches, &resolved.time_key, &self.schema).map(Some)
    }

    pub fn index(&self) -> &ScheduleIndex {
        &self.index
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }
}

fn collect_records<I>(blobs: I, schema: &RecordSchema) -> Vec<Record>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    blobs
        .into_iter()
        .flat_map(|blob| parse_blob(blob.as_ref(), schema))
        .collect()
}
