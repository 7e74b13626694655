/// Errors the prediction core reports to its caller.
///
/// A query that matches nothing is not an error; resolvers return an
/// empty match list and the service returns `Ok(None)` for that case.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("matched records carry no parseable board time")]
    AggregationImpossible,
}
