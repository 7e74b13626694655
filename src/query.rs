//! Query validation, normalization, and index lookup.

use crate::error::PredictionError;
use crate::index::{ScheduleIndex, normalize_label, time_key};
use crate::parser::Record;

/// A caller-supplied question: "departures at this time, on this kind
/// of day, under this weather".
#[derive(Debug, Clone)]
pub struct Query {
    /// `HH:MM`; padding and surrounding whitespace are tolerated.
    pub time: String,
    pub day: String,
    pub weather: String,
}

/// A query after validation and normalization, with the records that
/// match it. An empty `matches` slice is the ordinary no-match outcome,
/// not an error.
#[derive(Debug)]
pub struct ResolvedQuery<'a> {
    pub matches: &'a [Record],
    pub day_key: String,
    pub weather_key: String,
    pub time_key: String,
}

fn parse_time(raw: &str) -> Result<String, PredictionError> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 2 || parts.iter().any(|p| p.trim().is_empty()) {
        return Err(PredictionError::InvalidQuery(format!(
            "time must be HH:MM, got {raw:?}"
        )));
    }
    let hour: u32 = parts[0]
        .trim()
        .parse()
        .map_err(|_| PredictionError::InvalidQuery(format!("non-numeric hour in {raw:?}")))?;
    let minute: u32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| PredictionError::InvalidQuery(format!("non-numeric minute in {raw:?}")))?;
    Ok(time_key(hour, minute))
}

/// Resolves a query against the index.
///
/// Inputs are normalized exactly as during index construction, so two
/// spellings that index identically also query identically. Malformed
/// input is [`PredictionError::InvalidQuery`], distinct from a
/// well-formed query that simply matches nothing.
pub fn resolve<'a>(
    index: &'a ScheduleIndex,
    query: &Query,
) -> Result<ResolvedQuery<'a>, PredictionError> {
    if query.time.trim().is_empty() {
        return Err(PredictionError::InvalidQuery("time is empty".to_string()));
    }
    let day_key = normalize_label(&query.day);
    if day_key.is_empty() {
        return Err(PredictionError::InvalidQuery("day is empty".to_string()));
    }
    let weather_key = normalize_label(&query.weather);
    if weather_key.is_empty() {
        return Err(PredictionError::InvalidQuery(
            "weather is empty".to_string(),
        ));
    }
    let time_key = parse_time(&query.time)?;

    let matches = index.records_at(&day_key, &weather_key, &time_key);
    Ok(ResolvedQuery {
        matches,
        day_key,
        weather_key,
        time_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_blob;
    use crate::schema::RecordSchema;

    fn sample_index() -> ScheduleIndex {
        let schema = RecordSchema::default();
        let blob = ",,Monday,Sunny,,8,5,,,,,,9,10,1,local,,,,\n\
                    ,,Monday,Sunny,,8,5,,,,,,9,15,1,local,,,,";
        ScheduleIndex::build(parse_blob(blob, &schema), &schema)
    }

    fn query(time: &str, day: &str, weather: &str) -> Query {
        Query {
            time: time.to_string(),
            day: day.to_string(),
            weather: weather.to_string(),
        }
    }

    #[test]
    fn test_resolve_normalizes_like_the_index() {
        let index = sample_index();
        let resolved = resolve(&index, &query("8:5", " MONDAY ", "sunny ")).unwrap();
        assert_eq!(resolved.matches.len(), 2);
        assert_eq!(resolved.time_key, "08:05");
        assert_eq!(resolved.day_key, "monday");
    }

    #[test]
    fn test_resolve_preserves_insertion_order() {
        let index = sample_index();
        let resolved = resolve(&index, &query("08:05", "monday", "sunny")).unwrap();
        assert_eq!(resolved.matches[0].field(13), Some("10"));
        assert_eq!(resolved.matches[1].field(13), Some("15"));
    }

    #[test]
    fn test_resolve_no_match_is_empty_not_error() {
        let index = sample_index();
        let resolved = resolve(&index, &query("08:05", "friday", "sunny")).unwrap();
        assert!(resolved.matches.is_empty());
    }

    #[test]
    fn test_resolve_empty_time_is_invalid_query() {
        let index = sample_index();
        let err = resolve(&index, &query("", "monday", "sunny")).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidQuery(_)));
    }

    #[test]
    fn test_resolve_malformed_time_is_invalid_query() {
        let index = sample_index();
        for bad in ["0805", "08:", ":05", "08:05:00", "ab:cd"] {
            let err = resolve(&index, &query(bad, "monday", "sunny")).unwrap_err();
            assert!(matches!(err, PredictionError::InvalidQuery(_)), "{bad}");
        }
    }

    #[test]
    fn test_resolve_blank_labels_are_invalid_query() {
        let index = sample_index();
        assert!(resolve(&index, &query("08:05", "  ", "sunny")).is_err());
        assert!(resolve(&index, &query("08:05", "monday", "")).is_err());
    }
}
