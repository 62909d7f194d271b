use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, json_type_name};

/// One simulated business day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationsRecord {
    pub date: NaiveDate,
    /// Grows geometrically from the opening volume, floored to whole units
    /// each day.
    pub business_volume: u64,
    /// Derived: a fixed fraction of business volume.
    pub revenue: f64,
    /// Key Risk Indicator, drawn independently per day.
    pub kri: f64,
}

/// One operational loss. Days with no losses contribute no rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossEvent {
    pub date: NaiveDate,
    /// Always non-negative.
    pub amount: f64,
}

/// Per-day risk profile row.
///
/// `expected_loss` and `unexpected_loss` are whole-run scalars repeated on
/// every row; they are not windowed statistics. Downstream consumers rely on
/// the broadcast, so the repetition is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfileRecord {
    pub date: NaiveDate,
    pub expected_loss: f64,
    pub unexpected_loss: f64,
    /// Sum of the day's loss amounts. Zero on loss-free days.
    #[serde(default)]
    pub day_loss_total: f64,
    /// Count of severe losses for the day, when a caller supplies one.
    /// The calculator itself never fills this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severe_loss_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kri: Option<f64>,
    /// Day KRI strictly above the configured limit. `false` when either the
    /// KRI or the limit is absent.
    #[serde(default)]
    pub kri_exceeded: bool,
}

/// Outcome of a single loss-metric threshold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreachStatus {
    #[serde(rename = "Breached")]
    Breached,
    #[serde(rename = "Within Appetite")]
    WithinAppetite,
}

impl fmt::Display for BreachStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachStatus::Breached => write!(f, "Breached"),
            BreachStatus::WithinAppetite => write!(f, "Within Appetite"),
        }
    }
}

/// Daily KRI standing relative to its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KriStatus {
    #[serde(rename = "Above Limit")]
    AboveLimit,
    #[serde(rename = "Within Limit")]
    WithinLimit,
    /// The profile row carries no KRI, or no limit was configured.
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl fmt::Display for KriStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KriStatus::AboveLimit => write!(f, "Above Limit"),
            KriStatus::WithinLimit => write!(f, "Within Limit"),
            KriStatus::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Per-day appetite verdicts. A `None` check was skipped because the profile
/// field or its threshold was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachRecord {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_loss: Option<BreachStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unexpected_loss: Option<BreachStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severe_loss_events: Option<BreachStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KriStatusRecord {
    pub date: NaiveDate,
    pub status: KriStatus,
}

/// Decode one risk-profile row from an untyped JSON value, as read from an
/// NDJSON stream. The core columns must be present; optional columns fall
/// back to their defaults.
pub fn profile_row_from_json(value: &serde_json::Value) -> Result<RiskProfileRecord, Error> {
    let obj = value.as_object().ok_or_else(|| Error::TypeMismatch {
        expected: "a JSON object per profile row",
        found: json_type_name(value).to_string(),
    })?;
    for name in ["date", "expected_loss", "unexpected_loss"] {
        if !obj.contains_key(name) {
            return Err(Error::MissingField { name });
        }
    }
    serde_json::from_value(value.clone()).map_err(|e| Error::TypeMismatch {
        expected: "a risk profile row",
        found: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn loss_event_json_shape() {
        let ev = LossEvent { date: d("2023-01-05"), amount: 850.25 };
        let json = serde_json::to_string(&ev).unwrap();
        assert_eq!(json, r#"{"date":"2023-01-05","amount":850.25}"#);
    }

    #[test]
    fn breach_status_uses_display_spellings() {
        assert_eq!(
            serde_json::to_string(&BreachStatus::WithinAppetite).unwrap(),
            r#""Within Appetite""#
        );
        assert_eq!(
            serde_json::to_string(&KriStatus::NotAvailable).unwrap(),
            r#""N/A""#
        );
        assert_eq!(KriStatus::AboveLimit.to_string(), "Above Limit");
    }

    #[test]
    fn breach_record_omits_skipped_checks() {
        let rec = BreachRecord {
            date: d("2023-01-05"),
            expected_loss: Some(BreachStatus::Breached),
            unexpected_loss: None,
            severe_loss_events: None,
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"date":"2023-01-05","expected_loss":"Breached"}"#);
    }

    #[test]
    fn profile_row_ndjson_round_trip() {
        let row = RiskProfileRecord {
            date: d("2023-02-01"),
            expected_loss: 1180.5,
            unexpected_loss: 291.2,
            day_loss_total: 2400.0,
            severe_loss_count: None,
            kri: Some(52.3),
            kri_exceeded: false,
        };
        let json = serde_json::to_string(&row).unwrap();
        let back: RiskProfileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn profile_row_from_json_accepts_minimal_row() {
        let value = serde_json::json!({
            "date": "2023-02-01",
            "expected_loss": 100.0,
            "unexpected_loss": 20.0,
        });
        let row = profile_row_from_json(&value).unwrap();
        assert_eq!(row.day_loss_total, 0.0);
        assert_eq!(row.kri, None);
        assert!(!row.kri_exceeded);
    }

    #[test]
    fn profile_row_from_json_reports_missing_core_column() {
        let value = serde_json::json!({
            "date": "2023-02-01",
            "expected_loss": 100.0,
        });
        match profile_row_from_json(&value) {
            Err(Error::MissingField { name }) => assert_eq!(name, "unexpected_loss"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn profile_row_from_json_rejects_non_object() {
        match profile_row_from_json(&serde_json::json!([1, 2, 3])) {
            Err(Error::TypeMismatch { found, .. }) => assert_eq!(found, "an array"),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }
}
