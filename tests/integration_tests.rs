use departure_predictor::error::PredictionError;
use departure_predictor::query::Query;
use departure_predictor::schema::RecordSchema;
use departure_predictor::service::Predictor;

/// Builds one 20-column row in the current file layout.
fn row(queue: &str, day: &str, weather: &str, observed: (&str, &str), board: (&str, &str)) -> String {
    let mut fields = vec![""; 20];
    fields[0] = "gate a";
    fields[1] = queue;
    fields[2] = day;
    fields[3] = weather;
    fields[5] = observed.0;
    fields[6] = observed.1;
    fields[12] = board.0;
    fields[13] = board.1;
    fields[14] = "2";
    fields[15] = "express";
    fields[16] = "local";
    fields.join(",")
}

fn query(time: &str, day: &str, weather: &str) -> Query {
    Query {
        time: time.to_string(),
        day: day.to_string(),
        weather: weather.to_string(),
    }
}

#[test]
fn test_full_pipeline_two_days() {
    // Day one: three records at the queried slot share board time 09:10,
    // one departs at 09:15. Day two covers a different slot entirely.
    let day_one = [
        row("12.345", "Monday", "Sunny", ("09", "00"), ("09", "10")),
        row("8.0", "Monday", "Sunny", ("09", "00"), ("09", "15")),
        row("9.5", "Monday", "Sunny", ("09", "00"), ("09", "10")),
        row("7.25", "Monday", "Sunny", ("09", "00"), ("09", "10")),
    ]
    .join("\n");
    let day_two = [
        row("3.0", "Tuesday", "Rain", ("09", "00"), ("09", "40")),
        row("4.0", "Tuesday", "Rain", ("18", "30"), ("18", "45")),
    ]
    .join("\n");

    let predictor = Predictor::from_blobs([day_one, day_two], RecordSchema::default());

    let result = predictor
        .predict(&query("09:00", "Monday", "Sunny"))
        .unwrap()
        .expect("slot is covered by day one");

    assert_eq!(result.predicted_time, "09:10");
    assert_eq!(result.wait_minutes, 10);
    // derived values come from the first 09:10 record
    assert_eq!(result.queue_length, "12.35 m");
    assert_eq!(
        result.vehicle_kinds,
        Some(vec!["express".to_string(), "local".to_string()])
    );
}

#[test]
fn test_query_normalization_matches_index_normalization() {
    let blob = row("5.0", " Monday ", "SUNNY", ("08", "05"), ("08", "20"));
    let predictor = Predictor::from_blobs([blob], RecordSchema::default());

    let result = predictor
        .predict(&query("8:5", "monday", " Sunny"))
        .unwrap()
        .expect("normalized spellings hit the same slot");
    assert_eq!(result.predicted_time, "08:20");
}

#[test]
fn test_no_match_and_invalid_query_are_distinct() {
    let blob = row("5.0", "Monday", "Sunny", ("08", "05"), ("08", "20"));
    let predictor = Predictor::from_blobs([blob], RecordSchema::default());

    assert_eq!(predictor.predict(&query("08:05", "Friday", "Sunny")), Ok(None));
    assert!(matches!(
        predictor.predict(&query("", "Monday", "Sunny")),
        Err(PredictionError::InvalidQuery(_))
    ));
}

#[test]
fn test_malformed_rows_never_poison_the_build() {
    let blob = [
        "garbage line with no delimiter".to_string(),
        String::new(),
        row("5.0", "", "Sunny", ("08", "05"), ("08", "20")),
        row("5.0", "Monday", "Sunny", ("0x8", "05"), ("08", "20")),
        row("5.0", "Monday", "Sunny", ("08", "05"), ("08", "20")),
    ]
    .join("\n");
    let predictor = Predictor::from_blobs([blob], RecordSchema::default());

    // only the last row survives, and it is enough to answer
    assert_eq!(predictor.index().record_count(), 1);
    let result = predictor
        .predict(&query("08:05", "Monday", "Sunny"))
        .unwrap()
        .expect("the well-formed row answers the query");
    assert_eq!(result.predicted_time, "08:20");
}

#[test]
fn test_injected_schema_reads_older_layout() {
    // an older revision logged day/weather/time in the first columns
    let schema = RecordSchema::from_json(
        r#"{
            "queue_length": 6,
            "day": 0,
            "weather": 1,
            "observed_hour": 2,
            "observed_minute": 3,
            "board_hour": 4,
            "board_minute": 5,
            "vehicle_count": 7,
            "vehicle_kinds": [8, 9, 10, 11, 12]
        }"#,
    )
    .unwrap();

    let blob = "Monday,Sunny,08,05,08,20,4.5,1,local,,,,";
    let predictor = Predictor::from_blobs([blob], schema);

    let result = predictor
        .predict(&query("08:05", "Monday", "Sunny"))
        .unwrap()
        .expect("older layout indexes under the same keys");
    assert_eq!(result.predicted_time, "08:20");
    assert_eq!(result.queue_length, "4.50 m");
    assert_eq!(result.vehicle_kinds, Some(vec!["local".to_string()]));
}
