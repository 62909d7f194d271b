use chrono::NaiveDate;
use thiserror::Error;

/// Failure modes of the generation and monitoring pipeline.
///
/// Validation errors are raised once, at the start of a run, and are never
/// retried. Missing optional data (no losses, no KRI, empty profile) is not
/// an error anywhere in the pipeline; it degrades to zero/empty/`N/A`
/// outputs instead.
#[derive(Debug, Error)]
pub enum Error {
    /// A date supplied as text does not name a valid calendar date.
    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    InvalidDate { input: String },

    /// The simulation window is inverted.
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A distribution parameter that would make sampling impossible.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A JSON value has the wrong shape for the structure being read.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    /// A required column is absent from a record stream row.
    #[error("missing field {name:?}")]
    MissingField { name: &'static str },
}

/// Name of a JSON value's type, for `TypeMismatch` messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_names_both_dates() {
        let err = Error::InvalidRange {
            start: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "start date 2023-01-10 is after end date 2023-01-01"
        );
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
        assert_eq!(json_type_name(&serde_json::json!([1, 2])), "an array");
        assert_eq!(json_type_name(&serde_json::json!({"a": 1})), "an object");
        assert_eq!(json_type_name(&serde_json::json!(3.5)), "a number");
    }
}
